//! Test utilities for the catalog cache.
//!
//! In-memory [`RoleSource`]/[`ClientSource`] implementations backed by
//! `tokio::sync::RwLock` maps. They double as reference
//! implementations of the source contract: mutate the maps, push a
//! [`CatalogEvent`](crate::cache::CatalogEvent), and the catalog
//! converges on the new state.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::cache::{ClientSource, RoleSource};
use crate::error::SourceError;
use crate::types::{ClientRecord, RoleRecord};

/// In-memory role source.
#[derive(Clone, Default)]
pub struct StaticRoleSource {
    roles: Arc<RwLock<HashMap<String, RoleRecord>>>,
    /// When set, every operation fails with this message.
    failure: Arc<RwLock<Option<String>>>,
}

impl StaticRoleSource {
    pub fn new(roles: Vec<RoleRecord>) -> Self {
        let roles = roles
            .into_iter()
            .map(|role| (role.role_id.clone(), role))
            .collect();
        Self {
            roles: Arc::new(RwLock::new(roles)),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Insert or replace a role.
    pub async fn put(&self, role: RoleRecord) {
        self.roles.write().await.insert(role.role_id.clone(), role);
    }

    /// Remove a role.
    pub async fn delete(&self, role_id: &str) {
        self.roles.write().await.remove(role_id);
    }

    /// Make every subsequent operation fail, or clear with `None`.
    pub async fn fail_with(&self, message: Option<&str>) {
        *self.failure.write().await = message.map(|m| m.to_string());
    }

    async fn check_failure(&self) -> Result<(), SourceError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(SourceError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RoleSource for StaticRoleSource {
    async fn scan(&self) -> Result<Vec<RoleRecord>, SourceError> {
        self.check_failure().await?;
        Ok(self.roles.read().await.values().cloned().collect())
    }

    async fn load(&self, role_id: &str) -> Result<Option<RoleRecord>, SourceError> {
        self.check_failure().await?;
        Ok(self.roles.read().await.get(role_id).cloned())
    }
}

/// In-memory client source.
#[derive(Clone, Default)]
pub struct StaticClientSource {
    clients: Arc<RwLock<HashMap<String, ClientRecord>>>,
    failure: Arc<RwLock<Option<String>>>,
    touch_count: Arc<AtomicUsize>,
    fail_touches: Arc<RwLock<Option<String>>>,
}

impl StaticClientSource {
    pub fn new(clients: Vec<ClientRecord>) -> Self {
        let clients = clients
            .into_iter()
            .map(|client| (client.client_id.clone(), client))
            .collect();
        Self {
            clients: Arc::new(RwLock::new(clients)),
            failure: Arc::new(RwLock::new(None)),
            touch_count: Arc::new(AtomicUsize::new(0)),
            fail_touches: Arc::new(RwLock::new(None)),
        }
    }

    /// Insert or replace a client.
    pub async fn put(&self, client: ClientRecord) {
        self.clients
            .write()
            .await
            .insert(client.client_id.clone(), client);
    }

    /// Remove a client.
    pub async fn delete(&self, client_id: &str) {
        self.clients.write().await.remove(client_id);
    }

    /// Make every subsequent scan/load fail, or clear with `None`.
    pub async fn fail_with(&self, message: Option<&str>) {
        *self.failure.write().await = message.map(|m| m.to_string());
    }

    /// Make every subsequent last-used update fail, or clear with `None`.
    pub async fn fail_touches_with(&self, message: Option<&str>) {
        *self.fail_touches.write().await = message.map(|m| m.to_string());
    }

    /// How many last-used updates have been applied.
    pub fn touch_count(&self) -> usize {
        self.touch_count.load(Ordering::SeqCst)
    }

    /// The currently stored `last_date_used` for a client, if any.
    pub async fn last_date_used(&self, client_id: &str) -> Option<DateTime<Utc>> {
        self.clients
            .read()
            .await
            .get(client_id)
            .map(|client| client.last_date_used)
    }

    async fn check_failure(&self) -> Result<(), SourceError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(SourceError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClientSource for StaticClientSource {
    async fn scan(&self) -> Result<Vec<ClientRecord>, SourceError> {
        self.check_failure().await?;
        Ok(self.clients.read().await.values().cloned().collect())
    }

    async fn load(&self, client_id: &str) -> Result<Option<ClientRecord>, SourceError> {
        self.check_failure().await?;
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn touch_last_used(
        &self,
        client_id: &str,
        when: DateTime<Utc>,
    ) -> Result<(), SourceError> {
        if let Some(message) = self.fail_touches.read().await.as_ref() {
            return Err(SourceError::Backend(message.clone()));
        }
        let mut clients = self.clients.write().await;
        match clients.get_mut(client_id) {
            Some(client) => {
                client.last_date_used = when;
                self.touch_count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(SourceError::Backend(format!(
                "no such client: {client_id}"
            ))),
        }
    }
}
