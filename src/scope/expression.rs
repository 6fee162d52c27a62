//! Scope requirement expressions.
//!
//! Callers describe what a request needs as a boolean tree over
//! scopes: a bare scope string, `AllOf: [...]`, or `AnyOf: [...]`.
//! Checking an expression against a [`ScopeSet`] uses the satisfaction
//! relation, so held prefix scopes cover required concrete scopes.
//!
//! The JSON form mirrors the wire format used by API declarations:
//!
//! ```json
//! { "AllOf": [ "queue:create-task", { "AnyOf": ["queue:route:a", "queue:route:*"] } ] }
//! ```

use serde::{Deserialize, Serialize};

use super::types::ScopeSet;

/// A requirement tree over scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeExpression {
    /// A single required scope
    Required(String),

    /// All sub-expressions must be satisfied
    AllOf {
        #[serde(rename = "AllOf")]
        all_of: Vec<ScopeExpression>,
    },

    /// At least one sub-expression must be satisfied
    AnyOf {
        #[serde(rename = "AnyOf")]
        any_of: Vec<ScopeExpression>,
    },
}

impl ScopeExpression {
    /// Check the expression against a held scope set.
    ///
    /// `AllOf([])` is satisfied by anything; `AnyOf([])` by nothing.
    pub fn satisfied_by(&self, scopes: &ScopeSet) -> bool {
        match self {
            Self::Required(scope) => scopes.satisfies(scope),
            Self::AllOf { all_of } => all_of.iter().all(|expr| expr.satisfied_by(scopes)),
            Self::AnyOf { any_of } => any_of.iter().any(|expr| expr.satisfied_by(scopes)),
        }
    }

    /// The scopes an unsatisfied expression is missing, for error
    /// reporting. Empty when the expression is satisfied. For an
    /// unsatisfied `AnyOf`, every alternative's missing scopes are
    /// reported.
    pub fn missing(&self, scopes: &ScopeSet) -> Vec<String> {
        match self {
            Self::Required(scope) => {
                if scopes.satisfies(scope) {
                    Vec::new()
                } else {
                    vec![scope.clone()]
                }
            }
            Self::AllOf { all_of } => all_of
                .iter()
                .flat_map(|expr| expr.missing(scopes))
                .collect(),
            Self::AnyOf { any_of } => {
                if self.satisfied_by(scopes) {
                    Vec::new()
                } else {
                    any_of
                        .iter()
                        .flat_map(|expr| expr.missing(scopes))
                        .collect()
                }
            }
        }
    }

    /// Every scope mentioned anywhere in the expression.
    pub fn referenced_scopes(&self) -> Vec<String> {
        match self {
            Self::Required(scope) => vec![scope.clone()],
            Self::AllOf { all_of } => all_of
                .iter()
                .flat_map(ScopeExpression::referenced_scopes)
                .collect(),
            Self::AnyOf { any_of } => any_of
                .iter()
                .flat_map(ScopeExpression::referenced_scopes)
                .collect(),
        }
    }
}
