//! End-to-end scenarios for the scope resolver
//!
//! Exercises the full pipeline (trie construction, fixed-point
//! expansion, iterative resolution) against realistic role graphs:
//! wildcard roles, wildcard inputs, cycles, deep chains, and the
//! interaction with scope-set normalization.

use authtrie::resolver::ScopeResolver;
use authtrie::scope::{satisfies, ScopeSet};
use authtrie::types::RoleRecord;

fn record(role_id: &str, scopes: &[&str]) -> RoleRecord {
    RoleRecord::new(role_id, scopes.iter().map(|s| s.to_string()).collect())
}

fn resolve(resolver: &ScopeResolver, scopes: &[&str]) -> Vec<String> {
    resolver
        .resolve(&scopes.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .into_vec()
}

// ============================================================================
// Basic expansion
// ============================================================================

#[test]
fn test_simple_assume() {
    let resolver = ScopeResolver::build(vec![record("a", &["x"])]);
    assert_eq!(resolve(&resolver, &["assume:a"]), ["assume:a", "x"]);
}

#[test]
fn test_wildcard_role_matches_concrete_assume() {
    let resolver = ScopeResolver::build(vec![record("a*", &["p*"])]);
    assert_eq!(resolve(&resolver, &["assume:abc"]), ["assume:abc", "p*"]);
}

#[test]
fn test_wildcard_input_collects_all_roles() {
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
fn test_unrelated_scopes_pass_through() {
    let resolver = ScopeResolver::build(vec![record("a", &["x"])]);
    assert_eq!(
        resolve(&resolver, &["docker:run", "assume:a", "hooks:fire"]),
        ["assume:a", "docker:run", "hooks:fire", "x"]
    );
}

// ============================================================================
// Cycles and chains
// ============================================================================

#[test]
fn test_cycle_terminates_and_grants_both_sides() {
    let resolver = ScopeResolver::build(vec![
        record("A", &["assume:B", "scope-a"]),
        record("B", &["assume:A", "scope-b"]),
    ]);
    let resolved = resolve(&resolver, &["assume:A"]);
    assert_eq!(resolved, ["assume:A", "assume:B", "scope-a", "scope-b"]);
}

#[test]
fn test_deep_chain_of_500_roles() {
    let mut records: Vec<RoleRecord> = (0..500)
        .map(|i| record(&format!("tr-{i}"), &[&format!("assume:tr-{}", i + 1)]))
        .collect();
    records.push(record("tr-500", &["special"]));

    let resolver = ScopeResolver::build(records);
    let resolved = resolver.resolve(&["assume:tr-0".to_string()]);

    assert!(resolved.contains("special"));
    for i in 0..=500 {
        assert!(
            resolved.contains(&format!("assume:tr-{i}")),
            "missing assume:tr-{i}"
        );
    }
    assert_eq!(resolved.len(), 502);
}

#[test]
fn test_diamond_expansion_merges_branches() {
    let resolver = ScopeResolver::build(vec![
        record("top", &["assume:left", "assume:right"]),
        record("left", &["l:*"]),
        record("right", &["r:*", "l:extra"]),
    ]);
    let resolved = resolve(&resolver, &["assume:top"]);
    // "l:extra" is satisfied by "l:*" and must not survive.
    assert_eq!(
        resolved,
        ["assume:left", "assume:right", "assume:top", "l:*", "r:*"]
    );
}

// ============================================================================
// Wildcards interacting with roles
// ============================================================================

#[test]
fn test_star_scope_covers_root_role() {
    let resolver = ScopeResolver::build(vec![record("client-id:root", &["*"])]);
    assert_eq!(resolve(&resolver, &["assume:client-id:*"]), ["*"]);
}

#[test]
fn test_wildcard_input_also_matches_wildcard_roles() {
    let resolver = ScopeResolver::build(vec![
        record("build:*", &["artifact:create"]),
        record("build:linux", &["docker:run"]),
        record("deploy", &["ship:it"]),
    ]);
    let resolved = resolver.resolve(&["assume:build:*".to_string()]);
    assert!(resolved.contains("artifact:create"));
    assert!(resolved.contains("docker:run"));
    assert!(!resolved.contains("ship:it"));
}

#[test]
fn test_assume_prefix_shorthand_inputs() {
    let resolver = ScopeResolver::build(vec![record("a", &["x"]), record("b", &["y"])]);
    // "assu*" satisfies every assume: scope, so it matches every role.
    let resolved = resolver.resolve(&["assu*".to_string()]);
    assert!(resolved.contains("x"));
    assert!(resolved.contains("y"));
    assert!(resolved.contains("assu*"));
}

// ============================================================================
// Resolver properties
// ============================================================================

#[test]
fn test_resolve_is_a_closure_operator() {
    let resolver = ScopeResolver::build(vec![
        record("a", &["assume:b", "p"]),
        record("b", &["assume:c"]),
        record("c", &["q:*"]),
        record("d*", &["wide:grant"]),
    ]);
    let inputs = [
        vec!["assume:a".to_string()],
        vec!["assume:d-anything".to_string(), "other".to_string()],
        vec!["assume:*".to_string()],
        vec!["*".to_string()],
    ];
    for input in inputs {
        let once = resolver.resolve(&input);
        let twice = resolver.resolve(once.as_slice());
        assert_eq!(once, twice, "resolve not idempotent for {input:?}");
    }
}

#[test]
fn test_resolve_is_monotone() {
    let resolver = ScopeResolver::build(vec![
        record("a", &["assume:b", "p"]),
        record("b", &["q:*"]),
        record("x*", &["wide"]),
    ]);
    let small = vec!["assume:a".to_string()];
    let large = vec![
        "assume:a".to_string(),
        "assume:xyz".to_string(),
        "extra".to_string(),
    ];
    let resolved_small = resolver.resolve(&small);
    let resolved_large = resolver.resolve(&large);
    for scope in &resolved_small {
        assert!(
            resolved_large.satisfies(scope),
            "monotonicity violated for {scope}"
        );
    }
}

#[test]
fn test_resolution_result_is_normalized() {
    let resolver = ScopeResolver::build(vec![
        record("a", &["cover:*"]),
        record("b", &["cover:one", "cover:two"]),
    ]);
    let resolved = resolve(&resolver, &["assume:a", "assume:b"]);
    let renormalized = ScopeSet::from_scopes(resolved.clone());
    assert_eq!(resolved, renormalized.into_vec());
    assert!(!resolved.contains(&"cover:one".to_string()));
}

#[test]
fn test_satisfaction_of_input_is_preserved() {
    let resolver = ScopeResolver::build(vec![record("a", &["x"])]);
    let input = vec![
        "assume:a".to_string(),
        "unrelated:scope".to_string(),
        "b*".to_string(),
    ];
    let resolved = resolver.resolve(&input);
    for scope in &input {
        assert!(resolved.satisfies(scope));
    }
}

// ============================================================================
// Normalization scenario from the wire
// ============================================================================

#[test]
fn test_scope_set_normalization_reference() {
    let set = ScopeSet::from_scopes(
        ["a*", "ab", "aa", "b*", "c", "ca", "da*", "abc", "ab*", "daa"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    assert_eq!(set.as_slice(), ["a*", "b*", "c", "ca", "da*"]);
    for scope in ["a*", "ab", "aa", "b*", "c", "ca", "da*", "abc", "ab*", "daa"] {
        assert!(set.satisfies(scope));
    }
    assert!(satisfies("a*", "ab"));
    assert!(!satisfies("ab", "a*"));
}
