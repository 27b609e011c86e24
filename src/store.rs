//! Entitlement store
//!
//! Durable mapping from context token to entitlement record. The in-memory
//! map is the single source of truth while the process runs; every mutation
//! is mirrored to a snapshot backend, and the map is rehydrated from the
//! backend at startup. A missing or unreadable snapshot never fails startup:
//! the store begins empty and immediately writes a fresh empty snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{GateError, Result};
use crate::types::EntitlementRecord;

/// The full token-to-record mapping handled by a snapshot backend
pub type EntitlementMap = HashMap<String, EntitlementRecord>;

/// Durable mirror of the entitlement map
///
/// Backends persist the whole map on every mutation; there is no incremental
/// write path.
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Load the persisted map; `Ok(None)` when no snapshot exists yet
    async fn load(&self) -> Result<Option<EntitlementMap>>;

    /// Replace the persisted snapshot with the given map
    async fn persist(&self, records: &EntitlementMap) -> Result<()>;
}

/// Snapshot backend writing the map as pretty-printed JSON to a single file
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend storing snapshots at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotBackend for JsonFileBackend {
    async fn load(&self) -> Result<Option<EntitlementMap>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let records = serde_json::from_slice(&bytes).map_err(|e| {
                    GateError::persistence(format!(
                        "unreadable snapshot {}: {}",
                        self.path.display(),
                        e
                    ))
                })?;
                Ok(Some(records))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GateError::persistence(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn persist(&self, records: &EntitlementMap) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            GateError::persistence(format!("failed to write {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

/// Backend that persists nothing; for tests and ephemeral demos
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

#[async_trait]
impl SnapshotBackend for NullBackend {
    async fn load(&self) -> Result<Option<EntitlementMap>> {
        Ok(None)
    }

    async fn persist(&self, _records: &EntitlementMap) -> Result<()> {
        Ok(())
    }
}

/// Store of confirmed entitlements keyed by context token
///
/// A token appears here only after a confirmed payment, and its presence is
/// the authorization proof. Records are never expired or deleted.
#[derive(Clone)]
pub struct EntitlementStore {
    records: Arc<RwLock<EntitlementMap>>,
    backend: Arc<dyn SnapshotBackend>,
}

impl std::fmt::Debug for EntitlementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementStore")
            .field("backend", &"<dyn SnapshotBackend>")
            .finish()
    }
}

impl EntitlementStore {
    /// Open the store, rehydrating records from the backend
    ///
    /// Never fails: a missing or unreadable snapshot is logged, the store
    /// starts empty, and an empty snapshot is written in its place.
    pub async fn open(backend: impl SnapshotBackend + 'static) -> Self {
        let backend: Arc<dyn SnapshotBackend> = Arc::new(backend);

        let records = match backend.load().await {
            Ok(Some(records)) => {
                tracing::info!("loaded {} entitlement record(s) from snapshot", records.len());
                records
            }
            Ok(None) => {
                tracing::info!("no entitlement snapshot found, starting empty");
                Self::reset_snapshot(&backend).await
            }
            Err(e) => {
                tracing::warn!("could not load entitlement snapshot ({}), starting empty", e);
                Self::reset_snapshot(&backend).await
            }
        };

        Self {
            records: Arc::new(RwLock::new(records)),
            backend,
        }
    }

    /// Create a store with no durable backend
    pub fn in_memory() -> Self {
        Self {
            records: Arc::new(RwLock::new(EntitlementMap::new())),
            backend: Arc::new(NullBackend),
        }
    }

    async fn reset_snapshot(backend: &Arc<dyn SnapshotBackend>) -> EntitlementMap {
        let records = EntitlementMap::new();
        if let Err(e) = backend.persist(&records).await {
            tracing::error!("failed to write empty entitlement snapshot: {}", e);
        }
        records
    }

    /// Look up the record for a token
    pub async fn get(&self, token: &str) -> Option<EntitlementRecord> {
        self.records.read().await.get(token).cloned()
    }

    /// Check whether a token has a confirmed entitlement
    pub async fn contains(&self, token: &str) -> bool {
        self.records.read().await.contains_key(token)
    }

    /// Insert or replace the record for a token and flush a snapshot
    ///
    /// The write lock is held across the flush, so snapshots reach the
    /// backend in mutation order and racing confirmations for the same token
    /// serialize here; last writer wins with equivalent data. A failed flush
    /// is logged and the in-memory state stays authoritative.
    pub async fn put(&self, token: impl Into<String>, record: EntitlementRecord) {
        let token = token.into();
        let mut records = self.records.write().await;
        records.insert(token.clone(), record);
        if let Err(e) = self.backend.persist(&records).await {
            tracing::error!(
                "failed to persist entitlement snapshot after writing {}: {}",
                token,
                e
            );
        }
    }

    /// Number of stored entitlements
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no entitlements
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Copy of the full map, mainly for inspection in tests
    pub async fn snapshot(&self) -> EntitlementMap {
        self.records.read().await.clone()
    }
}
