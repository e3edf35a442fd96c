//! Mock storage implementations for testing
//!
//! A key-value store whose failures can be switched on, for exercising the
//! error paths of the asset store.

mod kv;

pub use kv::MockKeyValueStore;
