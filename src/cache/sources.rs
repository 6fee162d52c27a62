//! External catalog collaborators.
//!
//! The engine never owns role or client storage; it consumes two
//! scannable sources and an invalidation event stream provided by the
//! surrounding service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SourceError;
use crate::types::{ClientRecord, RoleRecord};

/// Source of role definitions.
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// Deliver every role currently defined.
    async fn scan(&self) -> Result<Vec<RoleRecord>, SourceError>;

    /// Load a single role; `None` means the role does not exist.
    async fn load(&self, role_id: &str) -> Result<Option<RoleRecord>, SourceError>;
}

/// Source of client definitions.
#[async_trait]
pub trait ClientSource: Send + Sync {
    /// Deliver every client currently defined.
    async fn scan(&self) -> Result<Vec<ClientRecord>, SourceError>;

    /// Load a single client; `None` means the client does not exist.
    async fn load(&self, client_id: &str) -> Result<Option<ClientRecord>, SourceError>;

    /// Record that the client authenticated around `when`. Best-effort;
    /// the catalog reports failures on its incident channel and moves on.
    async fn touch_last_used(
        &self,
        client_id: &str,
        when: DateTime<Utc>,
    ) -> Result<(), SourceError>;
}

/// Cache-invalidation message for a single catalog entity.
///
/// Delivery is at-least-once and may be out of order; every event maps
/// to a load-or-delete of the named entity, so replays and reordering
/// converge on the source's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    ClientCreated { client_id: String },
    ClientUpdated { client_id: String },
    ClientDeleted { client_id: String },
    RoleCreated { role_id: String },
    RoleUpdated { role_id: String },
    RoleDeleted { role_id: String },
}
