//! Core catalog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scope::ScopeSet;

/// Unique role identifier; may end in `*` to match a family of roles
pub type RoleId = String;

/// Unique client identifier
pub type ClientId = String;

/// Role as delivered by a [`RoleSource`](crate::cache::RoleSource) scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Role identifier (e.g., "hook-admin", "repo:ci/*")
    #[serde(rename = "roleId")]
    pub role_id: RoleId,

    /// Scopes granted directly by this role
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl RoleRecord {
    /// Create a new role record
    pub fn new(role_id: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            role_id: role_id.into(),
            scopes,
        }
    }
}

/// Role with its computed fixed-point expansion.
///
/// `expanded_scopes` is the transitive closure of `scopes` through
/// `assume:<roleId>` edges; it is derived at build time, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Role identifier
    pub role_id: RoleId,

    /// Scopes granted directly by this role, normalized
    pub scopes: ScopeSet,

    /// Fixed-point closure of `scopes` over the role graph
    pub expanded_scopes: ScopeSet,
}

/// Client as delivered by a [`ClientSource`](crate::cache::ClientSource) scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Client identifier
    #[serde(rename = "clientId")]
    pub client_id: ClientId,

    /// Bearer token for the client
    #[serde(rename = "accessToken")]
    pub access_token: String,

    /// Point in time after which the client must be rejected
    pub expires: DateTime<Utc>,

    /// Whether the client has been administratively disabled
    #[serde(default)]
    pub disabled: bool,

    /// Scopes granted directly to the client
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Last time the client was observed authenticating
    #[serde(rename = "lastDateUsed")]
    pub last_date_used: DateTime<Utc>,
}

/// Client record carried by the catalog cache.
///
/// Every client implicitly holds the role `client-id:<clientId>`;
/// `expanded_scopes` is the resolution of its direct scopes plus
/// `assume:client-id:<clientId>` against the current role snapshot.
#[derive(Debug, Clone)]
pub struct Client {
    /// Client identifier
    pub client_id: ClientId,

    /// Bearer token for the client
    pub access_token: String,

    /// Point in time after which the client must be rejected
    pub expires: DateTime<Utc>,

    /// Whether the client has been administratively disabled
    pub disabled: bool,

    /// Direct scopes as stored, normalized but not expanded
    pub unexpanded_scopes: ScopeSet,

    /// Full resolved scope set for the client
    pub expanded_scopes: ScopeSet,

    /// Last time the client was observed authenticating
    pub last_date_used: DateTime<Utc>,

    /// Set when `last_date_used` is stale enough that the next lookup
    /// should fire an asynchronous update against the client source
    pub update_last_used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_role_record_json_round_trip() {
        let role = RoleRecord::new("repo:ci/*", vec!["queue:create-task:*".to_string()]);
        let json = serde_json::to_string(&role).unwrap();
        assert!(json.contains("\"roleId\":\"repo:ci/*\""));
        let back: RoleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, role);
    }

    #[test]
    fn test_role_record_scopes_default_to_empty() {
        let role: RoleRecord = serde_json::from_str(r#"{"roleId":"empty"}"#).unwrap();
        assert_eq!(role.role_id, "empty");
        assert!(role.scopes.is_empty());
    }

    #[test]
    fn test_client_record_json_field_names() {
        let client = ClientRecord {
            client_id: "worker".to_string(),
            access_token: "token".to_string(),
            expires: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            disabled: false,
            scopes: vec!["queue:*".to_string()],
            last_date_used: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&client).unwrap();
        assert!(json.contains("\"clientId\""));
        assert!(json.contains("\"accessToken\""));
        assert!(json.contains("\"lastDateUsed\""));
    }
}
