//! Storage trait definitions
//!
//! All storage traits are defined here, with implementations in `implementations/`.

mod kv;

pub use kv::KeyValueStore;
