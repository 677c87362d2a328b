//! Name-based item categories.

use director_core::{CategoryTally, InventoryProfile, ItemCategory};

/// Item names grouped into the three build categories.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemCatalog {
    pub brutality: Vec<String>,
    pub tactics: Vec<String>,
    pub survival: Vec<String>,
}

impl ItemCatalog {
    /// Category an item name belongs to. Brutality is checked first, then
    /// Tactics, then Survival.
    pub fn category_of(&self, name: &str) -> Option<ItemCategory> {
        if self.brutality.iter().any(|n| n == name) {
            Some(ItemCategory::Brutality)
        } else if self.tactics.iter().any(|n| n == name) {
            Some(ItemCategory::Tactics)
        } else if self.survival.iter().any(|n| n == name) {
            Some(ItemCategory::Survival)
        } else {
            None
        }
    }

    /// Sums item levels per category. Unknown names are ignored.
    pub fn tally<'a, I>(&self, items: I) -> CategoryTally
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut tally = CategoryTally::default();
        for (name, level) in items {
            if let Some(category) = self.category_of(name) {
                tally.add(category, level);
            }
        }
        tally
    }

    /// Dominant inventory category for `(name, level)` pairs.
    pub fn classify<'a, I>(&self, items: I) -> InventoryProfile
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        InventoryProfile::classify(&self.tally(items))
    }

    pub fn len(&self) -> usize {
        self.brutality.len() + self.tactics.len() + self.survival.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ItemCatalog {
        ItemCatalog {
            brutality: vec!["Kunai".into(), "Scythe".into()],
            tactics: vec!["Time Piece".into()],
            survival: vec!["Armor".into()],
        }
    }

    #[test]
    fn dominant_category_needs_half_the_weight() {
        let catalog = catalog();
        assert_eq!(
            catalog.classify([("Kunai", 6), ("Scythe", 4)]),
            InventoryProfile::Brutality
        );
        assert_eq!(
            catalog.classify([("Kunai", 4), ("Time Piece", 4), ("Armor", 2)]),
            InventoryProfile::Balanced
        );
    }

    #[test]
    fn unknown_items_do_not_count() {
        let catalog = catalog();
        let tally = catalog.tally([("Mystery Box", 9), ("Armor", 1)]);
        assert_eq!(tally.total(), 1);
        assert_eq!(
            catalog.classify([("Mystery Box", 9), ("Armor", 1)]),
            InventoryProfile::Survival
        );
        assert_eq!(catalog.classify([]), InventoryProfile::Balanced);
    }
}
