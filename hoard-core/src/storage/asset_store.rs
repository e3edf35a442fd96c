//! Asset persistence over a single key-value entry
//!
//! The whole asset list is one JSON array stored under one key. Every
//! mutation reads the array, changes it in memory and writes it back in a
//! single `set`.
//!
//! Storage failures never reach the caller as errors. They are logged and
//! turned into sentinel values:
//!
//! | operation  | on failure |
//! |------------|------------|
//! | `load_all` | empty list |
//! | `save_all` | `false`    |
//! | `add`      | `None`     |
//! | `update`   | `None`     |
//! | `remove`   | `false`    |
//!
//! An empty `load_all` therefore means either "no assets" or "could not read".

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::storage::helper::{DEFAULT_STORAGE_KEY, now};
use crate::storage::ids::AssetId;
use crate::storage::traits::KeyValueStore;
use crate::storage::types::{Asset, AssetInput, AssetPatch};

/// CRUD over the asset list held by a [`KeyValueStore`]
///
/// Mutations through one `AssetStore` are serialized by an internal lock, so
/// two concurrent `add` calls both land. Two stores (or two processes) that
/// share a backend key are not coordinated and can still overwrite each
/// other's changes.
pub struct AssetStore<K: KeyValueStore + ?Sized = dyn KeyValueStore> {
    backend: Arc<K>,
    key: String,
    /// Held across load-mutate-save
    write_lock: Mutex<()>,
}

impl<K: KeyValueStore + ?Sized> AssetStore<K> {
    /// Create a store that keeps its list under [`DEFAULT_STORAGE_KEY`]
    pub fn new(backend: Arc<K>) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: Arc<K>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &Arc<K> {
        &self.backend
    }

    /// Read every stored asset, in insertion order
    ///
    /// A missing key, a backend error and a malformed blob all yield an
    /// empty list.
    pub async fn load_all(&self) -> Vec<Asset> {
        match self.read().await {
            Ok(assets) => assets,
            Err(e) => {
                error!(key = %self.key, "Error loading assets: {e:#}");
                Vec::new()
            }
        }
    }

    /// Replace the stored list with `assets`
    pub async fn save_all(&self, assets: &[Asset]) -> bool {
        let _guard = self.write_lock.lock().await;
        self.persist(assets).await
    }

    /// Create a new asset with a fresh id and `created_at`
    ///
    /// Returns None if the input is invalid or the list could not be read
    /// or written.
    pub async fn add(&self, input: AssetInput) -> Option<Asset> {
        if let Err(e) = input.validate() {
            warn!("Rejected new asset: {e}");
            return None;
        }

        let _guard = self.write_lock.lock().await;
        let mut assets = match self.read().await {
            Ok(assets) => assets,
            Err(e) => {
                error!(key = %self.key, "Error adding asset: {e:#}");
                return None;
            }
        };

        let asset = Asset::new(AssetId::new(), input, now());
        assets.push(asset.clone());

        if !self.persist(&assets).await {
            return None;
        }
        debug!(id = %asset.id, metal = %asset.metal, "Asset added");
        Some(asset)
    }

    /// Merge `patch` into the asset with the given id and stamp `updated_at`
    ///
    /// Returns None without writing if no asset has that id.
    pub async fn update(&self, id: &AssetId, patch: AssetPatch) -> Option<Asset> {
        if let Err(e) = patch.validate() {
            warn!(id = %id, "Rejected asset update: {e}");
            return None;
        }

        let _guard = self.write_lock.lock().await;
        let mut assets = match self.read().await {
            Ok(assets) => assets,
            Err(e) => {
                error!(key = %self.key, id = %id, "Error updating asset: {e:#}");
                return None;
            }
        };

        let Some(index) = assets.iter().position(|a| &a.id == id) else {
            debug!(id = %id, "Asset not found for update");
            return None;
        };

        let asset = &mut assets[index];
        patch.apply_to(&mut asset.details);
        asset.updated_at = Some(now());
        let updated = asset.clone();

        if !self.persist(&assets).await {
            return None;
        }
        debug!(id = %id, "Asset updated");
        Some(updated)
    }

    /// Delete the asset with the given id
    ///
    /// Deleting an id that is not stored still rewrites the list and reports
    /// success.
    pub async fn remove(&self, id: &AssetId) -> bool {
        let _guard = self.write_lock.lock().await;
        let assets = match self.read().await {
            Ok(assets) => assets,
            Err(e) => {
                error!(key = %self.key, id = %id, "Error deleting asset: {e:#}");
                return false;
            }
        };

        let before = assets.len();
        let remaining: Vec<Asset> = assets.into_iter().filter(|a| &a.id != id).collect();

        if !self.persist(&remaining).await {
            return false;
        }
        debug!(id = %id, removed = before - remaining.len(), "Asset deleted");
        true
    }

    async fn read(&self) -> Result<Vec<Asset>> {
        let Some(raw) = self
            .backend
            .get(&self.key)
            .await
            .context("backend read failed")?
        else {
            return Ok(Vec::new());
        };
        let assets = serde_json::from_str(&raw).context("stored asset list is not valid JSON")?;
        Ok(assets)
    }

    async fn persist(&self, assets: &[Asset]) -> bool {
        let json = match serde_json::to_string(assets) {
            Ok(json) => json,
            Err(e) => {
                error!(key = %self.key, "Error serializing assets: {e}");
                return false;
            }
        };

        match self.backend.set(&self.key, &json).await {
            Ok(()) => true,
            Err(e) => {
                error!(key = %self.key, "Error saving assets: {e:#}");
                false
            }
        }
    }
}
