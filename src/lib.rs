//! # Authtrie
//!
//! Scope resolution engine for a cluster-wide authentication service.
//! Given the scopes a caller holds and the global set of roles, it
//! answers, at high request rates, the full set of scopes the caller
//! is authorized to exercise.
//!
//! ## Features
//!
//! - **Wildcard scope algebra** with canonical normalization and
//!   linear-time scope-set merging
//! - **Trie recognizer** compiled from all role IDs, honoring `*` in
//!   both roles and inputs, with structurally shared match sets
//! - **Fixed-point expansion** of `assume:<roleId>` grants, cycles
//!   included
//! - **Reloadable catalog cache** with serialized rebuilds, atomic
//!   snapshot swaps, and event-driven invalidation
//! - **Async-first plumbing** on the Tokio runtime; resolution itself
//!   is pure, lock-free, and callable from any thread
//!
//! ## Example
//!
//! ```rust
//! use authtrie::resolver::ScopeResolver;
//! use authtrie::types::RoleRecord;
//!
//! let resolver = ScopeResolver::build(vec![
//!     RoleRecord::new("ci-runner", vec![
//!         "queue:create-task:ci/*".to_string(),
//!         "assume:log-uploader".to_string(),
//!     ]),
//!     RoleRecord::new("log-uploader", vec!["storage:write:logs/*".to_string()]),
//! ]);
//!
//! let granted = resolver.resolve(&["assume:ci-runner".to_string()]);
//! assert!(granted.satisfies("queue:create-task:ci/linux"));
//! assert!(granted.satisfies("storage:write:logs/build.txt"));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod resolver;
pub mod scope;
pub mod testing;
pub mod trie;
pub mod types;

// Re-export commonly used types
pub use cache::{Catalog, CatalogEvent, CatalogHandle, ClientSource, Incident, RoleSource};
pub use config::CacheConfig;
pub use error::{AuthError, Result, SourceError};
pub use resolver::ScopeResolver;
pub use scope::{satisfies, ScopeExpression, ScopeSet};
pub use types::{Client, ClientRecord, Role, RoleRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
