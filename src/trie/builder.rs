//! Recursive trie construction over sorted pattern ranges.

use std::cmp::Ordering;

use super::sets::{RoleIndex, RoleSets, SetIndex};
use super::Node;

/// Ordering used to sort patterns before construction.
///
/// Byte-wise lexicographic, except that `*` sorts before every other
/// byte and before end-of-string. A prefix pattern (`try*`) therefore
/// lands immediately before the contiguous block of patterns sharing
/// its prefix (`try`, `try-more`), which lets [`Builder::build`] carve
/// the pattern list into index ranges.
pub(super) fn pattern_compare(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let shared = a.len().min(b.len());
    for i in 0..shared {
        if a[i] == b[i] {
            continue;
        }
        if a[i] == b'*' {
            return Ordering::Less;
        }
        if b[i] == b'*' {
            return Ordering::Greater;
        }
        return a[i].cmp(&b[i]);
    }
    match a.len().cmp(&b.len()) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Less => {
            if b[shared] == b'*' {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        Ordering::Greater => {
            if a[shared] == b'*' {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

pub(super) struct Builder<'a> {
    /// Patterns sorted by [`pattern_compare`], paired with the index of
    /// the role each pattern recognizes.
    pub patterns: &'a [(&'a [u8], RoleIndex)],
    pub nodes: Vec<Node>,
    pub sets: RoleSets,
}

impl<'a> Builder<'a> {
    /// Node for an empty pattern range: recognizes nothing beyond what
    /// the path already implies. Its `*` child is itself, so inputs
    /// with any wildcard tail resolve to `implied` as well.
    fn leaf(&mut self, implied: SetIndex) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            children: Vec::new(),
            star: index,
            end: implied,
            default: implied,
        });
        index
    }

    /// Build the node for `patterns[lo..hi]`, all of which agree on
    /// their first `depth` bytes. `implied` indexes the set of prefix
    /// roles already matched along the path from the root.
    pub fn build(&mut self, lo: usize, hi: usize, depth: usize, implied: SetIndex) -> usize {
        if lo >= hi {
            return self.leaf(implied);
        }
        let mut lo = lo;
        let mut implied = implied;

        // A pattern whose '*' sits at this depth as its final byte is a
        // prefix pattern: it matches everything below this node, so it
        // joins the implied set for the whole subtree.
        while lo < hi {
            let (bytes, role) = self.patterns[lo];
            if bytes.len() == depth + 1 && bytes[depth] == b'*' {
                implied = self.sets.link(role, implied);
                lo += 1;
            } else {
                break;
            }
        }

        // The '*' coverage range: every remaining pattern in [lo, hi)
        // shares the path prefix, so a wildcard input ending here
        // matches all of them.
        let begin = lo;

        // Patterns with a literal (non-final) '*' at this depth sort
        // directly after the prefix pattern; they form the subtree
        // reachable through the '*' child.
        let star_lo = lo;
        while lo < hi {
            let (bytes, _) = self.patterns[lo];
            if bytes.len() > depth && bytes[depth] == b'*' {
                lo += 1;
            } else {
                break;
            }
        }
        let star_hi = lo;

        // Patterns terminating exactly at this depth.
        let mut end = None;
        while lo < hi {
            let (bytes, role) = self.patterns[lo];
            if bytes.len() == depth {
                end = Some(self.sets.link(role, end.unwrap_or(implied)));
                lo += 1;
            } else {
                break;
            }
        }
        let has_terminal = end.is_some();

        // Remaining patterns partition into contiguous runs per byte.
        let mut children: Vec<(u8, usize)> = Vec::new();
        let mut run_lo = lo;
        while run_lo < hi {
            let byte = self.patterns[run_lo].0[depth];
            let mut run_hi = run_lo + 1;
            while run_hi < hi && self.patterns[run_hi].0[depth] == byte {
                run_hi += 1;
            }
            let child = self.build(run_lo, run_hi, depth + 1, implied);
            children.push((byte, child));
            run_lo = run_hi;
        }

        // The '*' child answers wildcard inputs ending here with the
        // set of every pattern in [begin, hi). When the node is a pure
        // pass-through (single child, nothing consumed here) that set
        // already exists as the child's own '*' end; reuse it instead
        // of materializing a second chain.
        let star_end = if !has_terminal && star_lo == star_hi && children.len() == 1 {
            let only_child = children[0].1;
            self.nodes[self.nodes[only_child].star].end
        } else {
            let mut set = end.unwrap_or(implied);
            for index in begin..hi {
                // Terminal patterns are already chained into `end`.
                if self.patterns[index].0.len() == depth {
                    continue;
                }
                set = self.sets.link(self.patterns[index].1, set);
            }
            set
        };

        let star = if star_lo < star_hi {
            let node = self.build(star_lo, star_hi, depth + 1, implied);
            self.nodes[node].end = star_end;
            node
        } else {
            // No literal-star subtree: inputs with a second '*' (or any
            // bytes after the wildcard) fall back to the implied set.
            let tail = self.leaf(implied);
            let index = self.nodes.len();
            self.nodes.push(Node {
                children: Vec::new(),
                star: tail,
                end: star_end,
                default: implied,
            });
            index
        };

        let index = self.nodes.len();
        self.nodes.push(Node {
            children,
            star,
            end: end.unwrap_or(implied),
            default: implied,
        });
        index
    }
}
