//! Content loaders for reading director data from files.
//!
//! Embedded defaults ship inside the crate; every loader can also read an
//! override file from disk.

pub mod behaviors;
pub mod config;
pub mod items;

pub use behaviors::{BehaviorEntry, BehaviorMatrix, BehaviorTableLoader};
pub use config::ConfigLoader;
pub use items::ItemCatalogLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
