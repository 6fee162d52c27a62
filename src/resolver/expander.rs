//! Fixed-point expansion of role scope sets.
//!
//! A role's scopes may contain `assume:<roleId>` scopes, granting the
//! scopes of other roles; expansion computes, for every role, the
//! transitive closure of that relation. The implication graph is
//! finite and [`ScopeSet::merge`] is monotone and idempotent, so the
//! fixed point exists and is unique; cycles are handled by a per-role
//! generation counter instead of a per-traversal visited set.

use rand::seq::SliceRandom;

use crate::scope::ScopeSet;
use crate::trie::{RoleTrie, SetEntry};
use crate::types::{Role, RoleRecord};

use super::may_assume;

/// Everything derived from one role snapshot.
pub(super) struct Expansion {
    pub roles: Vec<Role>,
    pub trie: RoleTrie,
    /// Expanded scope set per interned trie set, aligned with
    /// `trie.sets().entries()`.
    pub scope_sets: Vec<ScopeSet>,
}

struct ExpandState {
    expanded: Option<ScopeSet>,
    seen: u64,
}

/// Expand a role snapshot to its fixed point.
pub(super) fn expand(records: Vec<RoleRecord>) -> Expansion {
    let roles: Vec<(String, ScopeSet)> = records
        .into_iter()
        .map(|r| (r.role_id, ScopeSet::from_scopes(r.scopes)))
        .collect();

    let patterns: Vec<String> = roles
        .iter()
        .map(|(role_id, _)| format!("assume:{role_id}"))
        .collect();
    let trie = RoleTrie::build(&patterns);

    // Which roles does each role imply directly? One trie walk per
    // scope that could possibly reach the assume: namespace.
    let implied: Vec<Vec<usize>> = roles
        .iter()
        .enumerate()
        .map(|(index, (_, scopes))| {
            let mut targets: Vec<usize> = scopes
                .iter()
                .filter(|scope| may_assume(scope))
                .flat_map(|scope| trie.matching_roles(scope))
                .filter(|&target| target != index)
                .collect();
            targets.sort_unstable();
            targets.dedup();
            targets
        })
        .collect();

    let mut states: Vec<ExpandState> = roles
        .iter()
        .map(|_| ExpandState {
            expanded: None,
            seen: 0,
        })
        .collect();

    // Saturate in a random permutation so adjacent dependency chains
    // in the input ordering do not degrade to quadratic re-traversal.
    let mut order: Vec<usize> = (0..roles.len()).collect();
    order.shuffle(&mut rand::thread_rng());

    let mut generation = 0u64;
    for index in order {
        if states[index].expanded.is_none() {
            generation += 1;
            let expanded = traverse(index, generation, &roles, &implied, &mut states);
            states[index].expanded = Some(expanded);
        }
    }

    let roles: Vec<Role> = roles
        .into_iter()
        .zip(states)
        .map(|((role_id, scopes), state)| Role {
            role_id,
            scopes,
            expanded_scopes: state.expanded.unwrap_or_default(),
        })
        .collect();

    // Lift the interned role sets to scope sets. Links only reference
    // earlier entries, so a single forward pass suffices.
    let mut scope_sets: Vec<ScopeSet> = Vec::with_capacity(trie.sets().len());
    for entry in trie.sets().entries() {
        let set = match entry {
            SetEntry::Roles(list) => list.iter().fold(ScopeSet::new(), |acc, &role| {
                acc.merge(&roles[role].expanded_scopes)
            }),
            SetEntry::Link { role, rest } => {
                roles[*role].expanded_scopes.merge(&scope_sets[*rest])
            }
        };
        scope_sets.push(set);
    }

    Expansion {
        roles,
        trie,
        scope_sets,
    }
}

/// Depth-first merge of everything reachable from `index`.
///
/// Roles whose expansion is already computed short-circuit; roles
/// already visited in this traversal (same generation) are skipped,
/// which is what makes cycles converge. Only the traversal root may
/// store the returned set: for a mid-cycle role the result would be
/// missing scopes only reachable through the root.
fn traverse(
    index: usize,
    generation: u64,
    roles: &[(String, ScopeSet)],
    implied: &[Vec<usize>],
    states: &mut [ExpandState],
) -> ScopeSet {
    states[index].seen = generation;
    let mut scopes = roles[index].1.clone();
    for &target in &implied[index] {
        if let Some(expanded) = &states[target].expanded {
            scopes = scopes.merge(expanded);
            continue;
        }
        if states[target].seen < generation {
            let reached = traverse(target, generation, roles, implied, states);
            scopes = scopes.merge(&reached);
        }
    }
    scopes
}
