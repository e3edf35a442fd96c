//! Core of the hoard precious-metal inventory tracker
//!
//! This crate provides:
//! - **Storage**: `KeyValueStore` trait with memory, filesystem, SQLite and mock backends
//! - **Asset store**: `AssetStore`, CRUD over the asset list kept under one key
//! - **Summary**: `totals_by_metal`, per-metal item counts and weights
//! - **Ledger**: `Ledger`, a local copy of the list kept in step with the store
//!
//! # Example
//!
//! ```ignore
//! use hoard_core::{AssetInput, AssetStore, Metal, MemoryKeyValueStore, OrnamentType};
//!
//! let store = AssetStore::new(Arc::new(MemoryKeyValueStore::new()));
//! let ring = store.add(AssetInput::new(Metal::Gold, OrnamentType::Ring, 2)).await;
//! let totals = hoard_core::totals_by_metal(&store.load_all().await);
//! ```
pub mod ledger;
pub mod storage;
pub mod summary;

pub use ledger::{Action, Ledger, LedgerError};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
pub use storage::{
    Asset, AssetId, AssetInput, AssetPatch, AssetStore, DEFAULT_STORAGE_KEY, FsKeyValueStore,
    InvalidAsset, KeyValueStore, MemoryKeyValueStore, Metal, MockKeyValueStore, OrnamentType,
    WeightType,
};
pub use summary::{MetalTotal, MetalTotals, WeightBasis, totals_by_metal, totals_by_metal_with};
