//! Scope resolution façade
//!
//! [`ScopeResolver`] compiles a role snapshot into an immutable
//! recognizer (trie + saturated scope sets) and answers
//! [`resolve`](ScopeResolver::resolve) queries against it. Resolution
//! is pure and lock-free; a resolver is built once per catalog
//! snapshot and shared read-only across threads.
//!
//! # Examples
//!
//! ```
//! use authtrie::resolver::ScopeResolver;
//! use authtrie::types::RoleRecord;
//!
//! let resolver = ScopeResolver::build(vec![
//!     RoleRecord::new("data-reader", vec!["storage:read:*".to_string()]),
//! ]);
//!
//! let resolved = resolver.resolve(&["assume:data-reader".to_string()]);
//! assert_eq!(resolved.as_slice(), ["assume:data-reader", "storage:read:*"]);
//! ```

mod expander;

use std::collections::HashMap;

use crate::scope::ScopeSet;
use crate::trie::RoleTrie;
use crate::types::{Role, RoleRecord};

/// Could this scope's satisfaction set intersect the `assume:`
/// namespace? Admits `assume:...` itself plus any prefix scope whose
/// prefix is a prefix of `assume:` (`*`, `ass*`, `assume*`, ...).
/// Everything else cannot match a role and skips the trie walk.
pub(crate) fn may_assume(scope: &str) -> bool {
    scope.starts_with("assume:")
        || (scope.ends_with('*') && "assume:".starts_with(&scope[..scope.len() - 1]))
}

/// Immutable scope resolver over one role snapshot.
pub struct ScopeResolver {
    roles: Vec<Role>,
    by_id: HashMap<String, usize>,
    trie: RoleTrie,
    scope_sets: Vec<ScopeSet>,
}

impl ScopeResolver {
    /// Build the recognizer and saturate all role expansions.
    ///
    /// CPU-only; must not be called where yielding is required.
    pub fn build(records: Vec<RoleRecord>) -> Self {
        let expansion = expander::expand(records);
        let by_id = expansion
            .roles
            .iter()
            .enumerate()
            .map(|(index, role)| (role.role_id.clone(), index))
            .collect();
        Self {
            roles: expansion.roles,
            by_id,
            trie: expansion.trie,
            scope_sets: expansion.scope_sets,
        }
    }

    /// Resolve a scope set to the full set it is authorized to exercise.
    ///
    /// Input may be unsorted and unnormalized. The result always
    /// satisfies the input (inputs are kept, never dropped), is
    /// normalized, and is a fixed point: `resolve(resolve(s)) ==
    /// resolve(s)`.
    pub fn resolve(&self, scopes: &[String]) -> ScopeSet {
        let mut work: Vec<String> = scopes.to_vec();
        let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
        let mut cursor = 0;
        while cursor < work.len() {
            let scope = work[cursor].clone();
            cursor += 1;
            if !may_assume(&scope) {
                continue;
            }
            if !seen.insert(scope.clone()) {
                continue;
            }
            let granted = &self.scope_sets[self.trie.execute(&scope)];
            work.extend(granted.iter().cloned());
        }
        ScopeSet::from_scopes(work)
    }

    /// All roles in the snapshot, with expansions
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Look up a role by its exact ID
    pub fn role(&self, role_id: &str) -> Option<&Role> {
        self.by_id.get(role_id).map(|&index| &self.roles[index])
    }

    /// The roles a single scope matches, with `*` honored on both sides
    pub fn matching_roles(&self, scope: &str) -> Vec<&Role> {
        if !may_assume(scope) {
            return Vec::new();
        }
        self.trie
            .matching_roles(scope)
            .into_iter()
            .map(|index| &self.roles[index])
            .collect()
    }

    /// Number of roles in the snapshot
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Number of interned role sets in the recognizer
    pub fn set_count(&self) -> usize {
        self.trie.sets().len()
    }
}

impl std::fmt::Debug for ScopeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeResolver")
            .field("roles", &self.roles.len())
            .field("sets", &self.trie.sets().len())
            .field("nodes", &self.trie.node_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role_id: &str, scopes: &[&str]) -> RoleRecord {
        RoleRecord::new(role_id, scopes.iter().map(|s| s.to_string()).collect())
    }

    fn resolve(resolver: &ScopeResolver, scopes: &[&str]) -> Vec<String> {
        resolver
            .resolve(&scopes.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .into_vec()
    }

    #[test]
    fn test_may_assume_filter() {
        assert!(may_assume("assume:worker"));
        assert!(may_assume("assume:worker*"));
        assert!(may_assume("assume:"));
        assert!(may_assume("*"));
        assert!(may_assume("ass*"));
        assert!(may_assume("assume*"));
        assert!(!may_assume("assume"));
        assert!(!may_assume("queue:create"));
        assert!(!may_assume("assumption"));
        assert!(!may_assume("b*"));
    }

    #[test]
    fn test_resolve_keeps_inputs() {
        let resolver = ScopeResolver::build(vec![record("a", &["x"])]);
        assert_eq!(resolve(&resolver, &["assume:a"]), ["assume:a", "x"]);
    }

    #[test]
    fn test_resolve_ignores_plain_scopes() {
        let resolver = ScopeResolver::build(vec![record("a", &["x"])]);
        assert_eq!(resolve(&resolver, &["queue:create", "b"]), ["b", "queue:create"]);
    }

    #[test]
    fn test_resolve_wildcard_role() {
        let resolver = ScopeResolver::build(vec![record("a*", &["p*"])]);
        assert_eq!(resolve(&resolver, &["assume:abc"]), ["assume:abc", "p*"]);
    }

    #[test]
    fn test_resolve_wildcard_input() {
        let resolver = ScopeResolver::build(vec![
            record("a", &["x"]),
            record("b", &["y"]),
            record("c", &["z"]),
        ]);
        assert_eq!(
            resolve(&resolver, &["assume:*"]),
            ["assume:*", "x", "y", "z"]
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = ScopeResolver::build(vec![
            record("a", &["assume:b", "p"]),
            record("b", &["q*"]),
        ]);
        let once = resolver.resolve(&["assume:a".to_string(), "extra".to_string()]);
        let twice = resolver.resolve(once.as_slice());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resolve_star_absorbs_everything() {
        let resolver = ScopeResolver::build(vec![record("client-id:root", &["*"])]);
        assert_eq!(resolve(&resolver, &["assume:client-id:*"]), ["*"]);
    }

    #[test]
    fn test_role_lookup() {
        let resolver = ScopeResolver::build(vec![record("a", &["x"]), record("b*", &["y"])]);
        assert_eq!(resolver.role("a").unwrap().role_id, "a");
        assert!(resolver.role("missing").is_none());
        assert_eq!(resolver.role_count(), 2);

        let matched = resolver.matching_roles("assume:borrow");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].role_id, "b*");
        assert!(resolver.matching_roles("queue:create").is_empty());
    }
}
