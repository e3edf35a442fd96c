//! Storage types
//!
//! Shared types used by storage traits and implementations.

pub mod asset;

pub use asset::{Asset, AssetInput, AssetPatch, InvalidAsset, Metal, OrnamentType, WeightType};
