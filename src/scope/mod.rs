//! Wildcard scope algebra
//!
//! Scopes are plain strings; a trailing `*` makes a scope a *prefix
//! scope* that satisfies every scope beginning with its prefix. This
//! module provides the satisfaction relation, the merge-friendly total
//! order, set normalization, and the [`ScopeSet`] type that maintains
//! the canonical form.
//!
//! # Examples
//!
//! ```
//! use authtrie::scope::{satisfies, ScopeSet};
//!
//! assert!(satisfies("queue:*", "queue:create-task"));
//!
//! let set = ScopeSet::from_scopes(vec![
//!     "queue:*".to_string(),
//!     "queue:create-task".to_string(),
//!     "index:insert".to_string(),
//! ]);
//! assert_eq!(set.as_slice(), ["index:insert", "queue:*"]);
//! ```

mod algebra;
mod expression;
mod types;


pub use algebra::{merge_scope_sets, normalize_scope_set, satisfies, scope_compare};
pub use expression::ScopeExpression;
pub use types::ScopeSet;
