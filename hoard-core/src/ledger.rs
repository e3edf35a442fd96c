//! Presentation-side view of the asset list
//!
//! Ledger provides:
//! - A local copy of the asset list, loaded with `refresh`
//! - CRUD calls that go through the `AssetStore` and, on success, merge the
//!   result into the local copy without reloading
//! - Errors that name the attempted action, for showing to the user
//!
//! The local copy can go stale if something else writes to the same backend;
//! call `refresh` to re-read it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::storage::AssetStore;
use crate::storage::ids::AssetId;
use crate::storage::traits::KeyValueStore;
use crate::storage::types::{Asset, AssetInput, AssetPatch};
use crate::summary::{MetalTotals, WeightBasis, totals_by_metal_with};

/// User-facing action a ledger call performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger operation did not go through
///
/// Deliberately does not say why: a missing record, rejected input and a
/// storage failure all look the same to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Failed to {0} asset")]
    Failed(Action),
}

impl LedgerError {
    pub fn action(&self) -> Action {
        match self {
            LedgerError::Failed(action) => *action,
        }
    }
}

/// Local asset list kept in step with an [`AssetStore`]
pub struct Ledger<K: KeyValueStore + ?Sized = dyn KeyValueStore> {
    store: Arc<AssetStore<K>>,
    assets: Vec<Asset>,
    basis: WeightBasis,
}

impl<K: KeyValueStore + ?Sized> Ledger<K> {
    /// Create an empty ledger; call `refresh` to load the stored list
    pub fn new(store: Arc<AssetStore<K>>) -> Self {
        Self {
            store,
            assets: Vec::new(),
            basis: WeightBasis::default(),
        }
    }

    /// Create a ledger and load the stored list into it
    pub async fn open(store: Arc<AssetStore<K>>) -> Self {
        let mut ledger = Self::new(store);
        ledger.refresh().await;
        ledger
    }

    /// Choose how `totals` treats record weights
    pub fn with_weight_basis(mut self, basis: WeightBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn set_weight_basis(&mut self, basis: WeightBasis) {
        self.basis = basis;
    }

    pub fn store(&self) -> &Arc<AssetStore<K>> {
        &self.store
    }

    /// The local copy, in insertion order
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| &a.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Replace the local copy with what the store holds now
    ///
    /// An unreadable store shows up as an empty list.
    pub async fn refresh(&mut self) -> &[Asset] {
        self.assets = self.store.load_all().await;
        &self.assets
    }

    pub async fn add(&mut self, input: AssetInput) -> Result<&Asset, LedgerError> {
        let asset = self
            .store
            .add(input)
            .await
            .ok_or(LedgerError::Failed(Action::Add))?;
        self.assets.push(asset);
        let index = self.assets.len() - 1;
        Ok(&self.assets[index])
    }

    /// Update a stored asset and replace its local copy
    ///
    /// If the local copy never had the asset (stale list), the updated record
    /// is appended.
    pub async fn update(&mut self, id: &AssetId, patch: AssetPatch) -> Result<&Asset, LedgerError> {
        let updated = self
            .store
            .update(id, patch)
            .await
            .ok_or(LedgerError::Failed(Action::Update))?;

        let index = match self.assets.iter().position(|a| &a.id == id) {
            Some(index) => {
                self.assets[index] = updated;
                index
            }
            None => {
                self.assets.push(updated);
                self.assets.len() - 1
            }
        };
        Ok(&self.assets[index])
    }

    pub async fn remove(&mut self, id: &AssetId) -> Result<(), LedgerError> {
        if !self.store.remove(id).await {
            return Err(LedgerError::Failed(Action::Delete));
        }
        self.assets.retain(|a| &a.id != id);
        Ok(())
    }

    /// Per-metal totals of the local copy
    pub fn totals(&self) -> MetalTotals {
        totals_by_metal_with(&self.assets, self.basis)
    }
}
