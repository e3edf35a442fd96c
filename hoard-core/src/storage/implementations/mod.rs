//! Storage implementations
//!
//! This module contains concrete implementations of the storage traits.
//!
//! ## Available Implementations
//!
//! - `sqlite/` - SQLite-based storage (requires `sqlite` feature)
//! - `memory/` - In-memory storage for testing
//! - `fs/` - One file per key on the local filesystem
//! - `mock/` - Scriptable store for failure-path tests

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod fs;
pub mod memory;
pub mod mock;
