//! Filesystem-backed storage

mod kv;

pub use kv::FsKeyValueStore;
