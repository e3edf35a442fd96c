//! In-memory storage implementations for testing
//!
//! These implementations store data in memory and are useful for unit tests
//! or dry runs where nothing should touch the disk.

mod kv;

pub use kv::MemoryKeyValueStore;
