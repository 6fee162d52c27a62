//! Trie-structured role recognizer
//!
//! Compiles the full pattern list (`assume:<roleId>` for every role)
//! into an immutable, DFA-like tree. A single walk over an input scope
//! yields the interned set of every role the scope matches, with `*`
//! honored in both the patterns and the input:
//!
//! - a pattern ending in `*` matches every input sharing its prefix,
//! - an input ending in `*` matches every pattern sharing its prefix,
//!   including patterns that themselves end in `*`.
//!
//! Matched sets are interned with structural sharing (see
//! [`RoleSets`]); the common non-branching chain reuses its
//! descendant's set by reference, which is what keeps the recognizer
//! compact at tens of thousands of roles.
//!
//! # Examples
//!
//! ```
//! use authtrie::trie::RoleTrie;
//!
//! let trie = RoleTrie::build(&["assume:try", "assume:try*", "assume:release"]);
//! assert_eq!(trie.matching_roles("assume:try"), vec![0, 1]);
//! assert_eq!(trie.matching_roles("assume:try-level-1"), vec![1]);
//! assert_eq!(trie.matching_roles("assume:*"), vec![0, 1, 2]);
//! assert_eq!(trie.matching_roles("docker:run"), Vec::<usize>::new());
//! ```

mod builder;
mod sets;

pub use sets::{RoleIndex, RoleSets, SetEntry, SetIndex};

use builder::{pattern_compare, Builder};

/// A single trie node.
///
/// `children` maps a byte to a child and never contains `*`; the `*`
/// child is held separately and always exists (leaves point it at
/// themselves). `end` answers "input stops here", `default` answers
/// "input diverges here"; both index interned sets in [`RoleSets`].
#[derive(Debug, Clone)]
pub(crate) struct Node {
    children: Vec<(u8, usize)>,
    star: usize,
    end: SetIndex,
    default: SetIndex,
}

impl Node {
    fn child(&self, byte: u8) -> Option<usize> {
        self.children
            .binary_search_by_key(&byte, |&(b, _)| b)
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// Immutable recognizer built from a pattern per role.
///
/// The pattern at position `i` recognizes role index `i`; role indexes
/// are whatever the caller's role list uses.
#[derive(Debug, Clone)]
pub struct RoleTrie {
    nodes: Vec<Node>,
    root: usize,
    sets: RoleSets,
}

impl RoleTrie {
    /// Compile a recognizer from one pattern per role.
    ///
    /// Patterns may end in `*` (prefix patterns) and may contain `*`
    /// in literal positions; both are handled.
    pub fn build<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut order: Vec<usize> = (0..patterns.len()).collect();
        order.sort_by(|&a, &b| pattern_compare(patterns[a].as_ref(), patterns[b].as_ref()));
        let ordered: Vec<(&[u8], RoleIndex)> = order
            .iter()
            .map(|&i| (patterns[i].as_ref().as_bytes(), i))
            .collect();

        let mut builder = Builder {
            patterns: &ordered,
            nodes: Vec::new(),
            sets: RoleSets::new(),
        };
        let root = builder.build(0, ordered.len(), 0, RoleSets::EMPTY);
        Self {
            nodes: builder.nodes,
            root,
            sets: builder.sets,
        }
    }

    /// Walk `input` through the trie and return the interned index of
    /// the matched role set.
    pub fn execute(&self, input: &str) -> SetIndex {
        let mut node = &self.nodes[self.root];
        for &byte in input.as_bytes() {
            let next = if byte == b'*' {
                Some(node.star)
            } else {
                node.child(byte)
            };
            match next {
                Some(index) => node = &self.nodes[index],
                None => return node.default,
            }
        }
        node.end
    }

    /// Convenience: execute and flatten in one step.
    pub fn matching_roles(&self, input: &str) -> Vec<RoleIndex> {
        self.sets.flatten(self.execute(input))
    }

    /// The interned set table
    pub fn sets(&self) -> &RoleSets {
        &self.sets
    }

    /// Number of nodes in the recognizer
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
