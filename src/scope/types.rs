//! The canonical scope set type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::algebra::{merge_scope_sets, normalize_scope_set, satisfies, scope_compare};

/// A set of scopes in canonical normalized form.
///
/// Invariants: sorted by [`scope_compare`](super::scope_compare), no
/// duplicates, and no member satisfied by a distinct other member.
/// Construction always normalizes, so every `ScopeSet` in the engine
/// upholds the invariant by type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ScopeSet {
    scopes: Vec<String>,
}

impl ScopeSet {
    /// The empty scope set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a normalized set from arbitrary scopes.
    ///
    /// Input may be unsorted, contain duplicates, or contain scopes
    /// satisfied by other members; all of that is collapsed here.
    pub fn from_scopes(scopes: Vec<String>) -> Self {
        Self {
            scopes: normalize_scope_set(scopes),
        }
    }

    /// Merge two normalized sets into a new normalized set. O(n + m).
    pub fn merge(&self, other: &ScopeSet) -> ScopeSet {
        ScopeSet {
            scopes: merge_scope_sets(&self.scopes, &other.scopes),
        }
    }

    /// Check whether some member of this set satisfies `scope`.
    pub fn satisfies(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| satisfies(s, scope))
    }

    /// Check whether this set satisfies every member of `other`.
    pub fn satisfies_all(&self, other: &ScopeSet) -> bool {
        other.scopes.iter().all(|s| self.satisfies(s))
    }

    /// Exact membership test (satisfaction not considered)
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes
            .binary_search_by(|s| scope_compare(s, scope))
            .is_ok()
    }

    /// Iterate the scopes in canonical order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.scopes.iter()
    }

    /// The scopes as a sorted slice
    pub fn as_slice(&self) -> &[String] {
        &self.scopes
    }

    /// Number of scopes in the set
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Consume the set, yielding the sorted scope list
    pub fn into_vec(self) -> Vec<String> {
        self.scopes
    }
}

impl From<Vec<String>> for ScopeSet {
    fn from(scopes: Vec<String>) -> Self {
        Self::from_scopes(scopes)
    }
}

impl FromIterator<String> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::from_scopes(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ScopeSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.scopes.iter()
    }
}

impl IntoIterator for ScopeSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.scopes.into_iter()
    }
}

// Deserialization must re-normalize: external data makes no promises.
impl<'de> Deserialize<'de> for ScopeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let scopes = Vec::<String>::deserialize(deserializer)?;
        Ok(ScopeSet::from_scopes(scopes))
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.scopes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scopes_normalizes() {
        let set = ScopeSet::from_scopes(vec!["b".into(), "a*".into(), "ab".into()]);
        assert_eq!(set.as_slice(), ["a*", "b"]);
    }

    #[test]
    fn test_satisfies_queries() {
        let set = ScopeSet::from_scopes(vec!["queue:*".into(), "index:insert".into()]);
        assert!(set.satisfies("queue:create-task"));
        assert!(set.satisfies("index:insert"));
        assert!(!set.satisfies("index:delete"));

        let needed = ScopeSet::from_scopes(vec!["queue:claim".into(), "index:insert".into()]);
        assert!(set.satisfies_all(&needed));
        assert!(!needed.satisfies_all(&set));
    }

    #[test]
    fn test_contains_is_exact() {
        let set = ScopeSet::from_scopes(vec!["queue:*".into()]);
        assert!(set.contains("queue:*"));
        assert!(!set.contains("queue:create-task"));
    }

    #[test]
    fn test_deserialize_normalizes() {
        let set: ScopeSet = serde_json::from_str(r#"["b", "a*", "ab", "b"]"#).unwrap();
        assert_eq!(set.as_slice(), ["a*", "b"]);
    }
}
