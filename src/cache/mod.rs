//! Catalog cache
//!
//! Holds the current role and client snapshots and the recognizer
//! derived from them, and keeps them fresh from two directions: a
//! periodic bulk reload (the eventual-consistency floor) and an
//! event-driven per-entity reload (the low-latency path). Both feed a
//! single serialized rebuild queue.
//!
//! # Concurrency contract
//!
//! Single-writer / many-reader. Reload operations are serialized
//! through one async mutex; a failed reload leaves the previous
//! snapshot authoritative and does not block its successors. Readers
//! ([`Catalog::resolve`], [`Catalog::load_client`]) clone the current
//! snapshot `Arc` and never wait on a reload; the swap is a single
//! reference publish. Snapshots are immutable once published.

mod sources;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::error::{AuthError, Result, SourceError};
use crate::resolver::ScopeResolver;
use crate::scope::ScopeSet;
use crate::types::{Client, ClientRecord, RoleRecord};

pub use sources::{CatalogEvent, ClientSource, RoleSource};

/// Background failure reported on the incident channel. Never fatal.
#[derive(Debug, Error)]
pub enum Incident {
    /// A periodic or event-driven reload failed; the previous snapshot
    /// remains authoritative.
    #[error("reload failed: {error}")]
    ReloadFailed { error: AuthError },

    /// A best-effort `last_date_used` update failed.
    #[error("last-used update for client {client_id} failed: {error}")]
    LastUsedUpdateFailed {
        client_id: String,
        error: SourceError,
    },
}

/// One immutable view of the catalog: source records plus everything
/// derived from them.
pub struct Snapshot {
    role_records: Vec<RoleRecord>,
    client_records: Vec<ClientRecord>,
    resolver: ScopeResolver,
    clients: HashMap<String, Arc<Client>>,
}

impl Snapshot {
    /// Build a snapshot from raw records. CPU-only.
    fn build(
        role_records: Vec<RoleRecord>,
        client_records: Vec<ClientRecord>,
        last_used_window: chrono::Duration,
    ) -> Self {
        let started = Instant::now();
        let resolver = ScopeResolver::build(role_records.clone());
        let stale_before = Utc::now() - last_used_window;

        let clients: HashMap<String, Arc<Client>> = client_records
            .iter()
            .map(|record| {
                // Every client holds its synthetic client-id role, so
                // roles like `client-id:*` apply to client families.
                let mut input = record.scopes.clone();
                input.push(format!("assume:client-id:{}", record.client_id));
                let expanded_scopes = resolver.resolve(&input);
                let client = Client {
                    client_id: record.client_id.clone(),
                    access_token: record.access_token.clone(),
                    expires: record.expires,
                    disabled: record.disabled,
                    unexpanded_scopes: ScopeSet::from_scopes(record.scopes.clone()),
                    expanded_scopes,
                    last_date_used: record.last_date_used,
                    update_last_used: record.last_date_used < stale_before,
                };
                (record.client_id.clone(), Arc::new(client))
            })
            .collect();

        info!(
            roles = role_records.len(),
            clients = client_records.len(),
            sets = resolver.set_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog snapshot built"
        );

        Self {
            role_records,
            client_records,
            resolver,
            clients,
        }
    }

    /// The resolver compiled from this snapshot's roles
    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Number of clients in this snapshot
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

struct Inner {
    role_source: Arc<dyn RoleSource>,
    client_source: Arc<dyn ClientSource>,
    snapshot: RwLock<Arc<Snapshot>>,
    /// Serializes every rebuild; a failure does not poison the queue.
    reload_gate: tokio::sync::Mutex<()>,
    incidents: mpsc::UnboundedSender<Incident>,
    last_used_window: chrono::Duration,
    /// When each client last had a `last_date_used` update fired, so a
    /// client fires at most once per window across snapshot swaps.
    touch_gate: DashMap<String, DateTime<Utc>>,
}

/// Handle owning the catalog's background tasks. Dropping it stops the
/// periodic reload and the event consumer; in-flight reloads run to
/// completion.
pub struct CatalogHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl CatalogHandle {
    /// Stop the background tasks.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for CatalogHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// The catalog cache.
///
/// Cheap to clone; all clones share the same snapshot and reload queue.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<Inner>,
}

impl Catalog {
    /// Populate the catalog and start its background activities.
    ///
    /// Performs an initial bulk reload (a failure here is fatal), then
    /// spawns the periodic reload at `config.cache_expiry` and a
    /// consumer for `events`. Returns the catalog, the handle owning
    /// the background tasks, and the incident channel.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidConfig`] if the configuration is invalid,
    /// [`AuthError::Source`] if the initial scans fail.
    pub async fn setup(
        role_source: Arc<dyn RoleSource>,
        client_source: Arc<dyn ClientSource>,
        mut events: mpsc::UnboundedReceiver<CatalogEvent>,
        config: CacheConfig,
    ) -> Result<(Self, CatalogHandle, mpsc::UnboundedReceiver<Incident>)> {
        let last_used_window = config.last_used_window()?;
        if config.cache_expiry.is_zero() {
            return Err(AuthError::InvalidConfig(
                "cache_expiry must be non-zero".to_string(),
            ));
        }

        let (incident_tx, incident_rx) = mpsc::unbounded_channel();
        let empty = Snapshot::build(Vec::new(), Vec::new(), last_used_window);
        let catalog = Self {
            inner: Arc::new(Inner {
                role_source,
                client_source,
                snapshot: RwLock::new(Arc::new(empty)),
                reload_gate: tokio::sync::Mutex::new(()),
                incidents: incident_tx,
                last_used_window,
                touch_gate: DashMap::new(),
            }),
        };

        catalog.reload().await?;

        let periodic = tokio::spawn({
            let catalog = catalog.clone();
            let interval = config.cache_expiry;
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                // The first tick completes immediately; setup already
                // populated the catalog.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    if let Err(error) = catalog.reload().await {
                        warn!(%error, "periodic reload failed");
                        catalog.report(Incident::ReloadFailed { error });
                    }
                }
            }
        });

        let consumer = tokio::spawn({
            let catalog = catalog.clone();
            async move {
                while let Some(event) = events.recv().await {
                    debug!(?event, "catalog event received");
                    let outcome = match &event {
                        CatalogEvent::ClientCreated { client_id }
                        | CatalogEvent::ClientUpdated { client_id }
                        | CatalogEvent::ClientDeleted { client_id } => {
                            catalog.reload_client(client_id).await
                        }
                        CatalogEvent::RoleCreated { role_id }
                        | CatalogEvent::RoleUpdated { role_id }
                        | CatalogEvent::RoleDeleted { role_id } => {
                            catalog.reload_role(role_id).await
                        }
                    };
                    if let Err(error) = outcome {
                        warn!(%error, ?event, "event-driven reload failed");
                        catalog.report(Incident::ReloadFailed { error });
                    }
                }
            }
        });

        let handle = CatalogHandle {
            tasks: vec![periodic, consumer],
        };
        Ok((catalog, handle, incident_rx))
    }

    /// Bulk rescan of both sources, then an atomic snapshot swap.
    ///
    /// Serialized with every other reload; on failure the previous
    /// snapshot stays in place.
    pub async fn reload(&self) -> Result<()> {
        let _guard = self.inner.reload_gate.lock().await;
        let (roles, clients) = tokio::join!(
            self.inner.role_source.scan(),
            self.inner.client_source.scan(),
        );
        let snapshot = Snapshot::build(roles?, clients?, self.inner.last_used_window);
        self.publish(snapshot);
        Ok(())
    }

    /// Reload a single client and rebuild the derived structures.
    ///
    /// A client the source no longer knows is removed.
    pub async fn reload_client(&self, client_id: &str) -> Result<()> {
        let _guard = self.inner.reload_gate.lock().await;
        let loaded = self.inner.client_source.load(client_id).await?;
        let current = self.snapshot();
        let mut client_records = current.client_records.clone();
        client_records.retain(|record| record.client_id != client_id);
        if let Some(record) = loaded {
            client_records.push(record);
        }
        let snapshot = Snapshot::build(
            current.role_records.clone(),
            client_records,
            self.inner.last_used_window,
        );
        self.publish(snapshot);
        Ok(())
    }

    /// Reload a single role and rebuild the derived structures.
    ///
    /// A role the source no longer knows is removed.
    pub async fn reload_role(&self, role_id: &str) -> Result<()> {
        let _guard = self.inner.reload_gate.lock().await;
        let loaded = self.inner.role_source.load(role_id).await?;
        let current = self.snapshot();
        let mut role_records = current.role_records.clone();
        role_records.retain(|record| record.role_id != role_id);
        if let Some(record) = loaded {
            role_records.push(record);
        }
        let snapshot = Snapshot::build(
            role_records,
            current.client_records.clone(),
            self.inner.last_used_window,
        );
        self.publish(snapshot);
        Ok(())
    }

    /// Resolve a scope set against the current snapshot.
    ///
    /// Pure with respect to the catalog; safe to call from any number
    /// of threads while reloads proceed.
    pub fn resolve(&self, scopes: &[String]) -> ScopeSet {
        self.snapshot().resolver.resolve(scopes)
    }

    /// Look up a client by ID in the current snapshot.
    ///
    /// When the client's `last_date_used` is stale, fires a gated,
    /// best-effort asynchronous update against the client source.
    ///
    /// # Errors
    ///
    /// [`AuthError::ClientNotFound`], [`AuthError::ClientDisabled`] or
    /// [`AuthError::ClientExpired`].
    pub fn load_client(&self, client_id: &str) -> Result<Arc<Client>> {
        let snapshot = self.snapshot();
        let client = snapshot
            .clients
            .get(client_id)
            .ok_or_else(|| AuthError::ClientNotFound(client_id.to_string()))?;
        if client.disabled {
            return Err(AuthError::ClientDisabled(client_id.to_string()));
        }
        if client.expires < Utc::now() {
            return Err(AuthError::ClientExpired(client_id.to_string()));
        }
        if client.update_last_used {
            self.touch_last_used(client);
        }
        Ok(Arc::clone(client))
    }

    /// The current snapshot. The returned `Arc` stays valid (and
    /// unchanged) for as long as the caller holds it.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.snapshot.read())
    }

    fn publish(&self, snapshot: Snapshot) {
        *self.inner.snapshot.write() = Arc::new(snapshot);
    }

    fn report(&self, incident: Incident) {
        let _ = self.inner.incidents.send(incident);
    }

    /// Fire the asynchronous last-used update unless one already fired
    /// for this client within the window.
    fn touch_last_used(&self, client: &Arc<Client>) {
        let now = Utc::now();
        let window = self.inner.last_used_window;
        let fire = match self.inner.touch_gate.entry(client.client_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                if now - *occupied.get() >= window {
                    occupied.insert(now);
                    true
                } else {
                    false
                }
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(now);
                true
            }
        };
        if !fire {
            return;
        }

        let source = Arc::clone(&self.inner.client_source);
        let incidents = self.inner.incidents.clone();
        let client_id = client.client_id.clone();
        tokio::spawn(async move {
            debug!(%client_id, "updating last-used timestamp");
            if let Err(error) = source.touch_last_used(&client_id, now).await {
                warn!(%client_id, %error, "last-used update failed");
                let _ = incidents.send(Incident::LastUsedUpdateFailed { client_id, error });
            }
        });
    }
}
