//! Storage abstractions for asset persistence
//!
//! The asset list is kept as one JSON blob in a key-value backend. Backends:
//!
//! - `MemoryKeyValueStore` - In-memory storage (no persistence)
//! - `FsKeyValueStore` - One file per key on disk
//! - `SqliteStore` - SQLite-backed storage (requires `sqlite` feature)
//! - `MockKeyValueStore` - Failure injection for tests
//!
//! All implement the same `KeyValueStore` trait, making them interchangeable
//! under `AssetStore`.

mod asset_store;
pub mod helper;
pub mod ids;
pub mod implementations;
pub mod traits;
pub mod types;

pub use asset_store::AssetStore;
pub use helper::DEFAULT_STORAGE_KEY;
pub use ids::AssetId;
pub use implementations::fs::FsKeyValueStore;
pub use implementations::memory::MemoryKeyValueStore;
pub use implementations::mock::MockKeyValueStore;
#[cfg(feature = "sqlite")]
pub use implementations::sqlite::SqliteStore;
pub use traits::KeyValueStore;
pub use types::{Asset, AssetInput, AssetPatch, InvalidAsset, Metal, OrnamentType, WeightType};
