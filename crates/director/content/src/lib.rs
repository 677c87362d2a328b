//! Data-driven director content and loaders.
//!
//! This crate houses the static tables the director consumes:
//! - Candidate group behaviors for every policy context (RON)
//! - Item name sets used to classify the inventory (RON)
//! - Director configuration (TOML)
//!
//! Content is read once at startup and never changes while a director runs.

pub mod items;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use items::ItemCatalog;

#[cfg(feature = "loaders")]
pub use loaders::{
    BehaviorEntry, BehaviorMatrix, BehaviorTableLoader, ConfigLoader, ItemCatalogLoader,
    LoadResult,
};
