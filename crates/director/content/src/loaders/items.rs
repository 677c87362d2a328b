//! Item catalog loader.

use std::path::Path;

use crate::items::ItemCatalog;
use crate::loaders::{LoadResult, read_file};

const EMBEDDED_ITEMS: &str = include_str!("../../data/items.ron");

/// Loader for the name-based item category sets.
pub struct ItemCatalogLoader;

impl ItemCatalogLoader {
    /// The catalog shipped with the crate.
    pub fn embedded() -> LoadResult<ItemCatalog> {
        Self::parse(EMBEDDED_ITEMS)
    }

    /// Load an item catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<ItemCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ItemCatalog> {
        let catalog: ItemCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use director_core::{InventoryProfile, ItemCategory};

    #[test]
    fn embedded_catalog_sorts_known_items() {
        let catalog = ItemCatalogLoader::embedded().unwrap();
        assert_eq!(catalog.len(), 23);
        assert_eq!(catalog.category_of("Kunai"), Some(ItemCategory::Brutality));
        assert_eq!(catalog.category_of("Runetracer"), Some(ItemCategory::Tactics));
        assert_eq!(catalog.category_of("Regen Pot"), Some(ItemCategory::Survival));
        assert_eq!(catalog.category_of("Unknown"), None);
    }

    #[test]
    fn inventory_classification() {
        let catalog = ItemCatalogLoader::embedded().unwrap();
        assert_eq!(
            catalog.classify([("Kunai", 10)]),
            InventoryProfile::Brutality
        );
        assert_eq!(
            catalog.classify([("Kunai", 4), ("Time Piece", 4), ("Armor", 2)]),
            InventoryProfile::Balanced
        );
    }
}
