//! Drop-table biases and weighted upgrade selection.

use std::collections::HashMap;

use rand::Rng;

use director_core::{ItemCategory, LootBiasSink, Rarity, env::roulette};

/// Anything the loot table can weigh.
pub trait Upgrade {
    /// Build category, `None` for items outside the three categories.
    fn category(&self) -> Option<ItemCategory>;

    fn rarity(&self) -> Rarity;
}

/// Plain upgrade description for headless drivers.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeOffer {
    pub name: String,
    pub category: Option<ItemCategory>,
    pub rarity: Rarity,
}

impl UpgradeOffer {
    pub fn new(name: impl Into<String>, category: Option<ItemCategory>, rarity: Rarity) -> Self {
        Self {
            name: name.into(),
            category,
            rarity,
        }
    }
}

impl Upgrade for UpgradeOffer {
    fn category(&self) -> Option<ItemCategory> {
        self.category
    }

    fn rarity(&self) -> Rarity {
        self.rarity
    }
}

/// Category and rarity multipliers set by the macro director.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LootTable {
    categories: HashMap<ItemCategory, f32>,
    rarities: HashMap<Rarity, f32>,
}

impl LootTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection weight: category bias times rarity bias, each `1.0` when
    /// unset.
    pub fn weight<U: Upgrade + ?Sized>(&self, upgrade: &U) -> f32 {
        let category = upgrade
            .category()
            .and_then(|c| self.categories.get(&c).copied())
            .unwrap_or(1.0);
        let rarity = self
            .rarities
            .get(&upgrade.rarity())
            .copied()
            .unwrap_or(1.0);
        category * rarity
    }

    /// Draws up to `count` distinct upgrades from `pool`, weighted by
    /// [`weight`](Self::weight). `None` draws the whole pool in weighted order.
    pub fn choose_upgrades<'a, U, R>(
        &self,
        pool: &'a [U],
        count: Option<usize>,
        rng: &mut R,
    ) -> Vec<&'a U>
    where
        U: Upgrade,
        R: Rng + ?Sized,
    {
        let mut remaining: Vec<(&'a U, f32)> =
            pool.iter().map(|u| (u, self.weight(u))).collect();
        let count = count.unwrap_or(pool.len()).min(pool.len());
        let mut chosen = Vec::with_capacity(count);

        while chosen.len() < count && !remaining.is_empty() {
            // An all-zero wheel falls back to the first remaining upgrade.
            let index = roulette(rng, remaining.iter().map(|(_, w)| *w)).unwrap_or(0);
            chosen.push(remaining.remove(index).0);
        }
        chosen
    }
}

impl LootBiasSink for LootTable {
    fn set_category_bias(&mut self, category: ItemCategory, bias: f32) {
        self.categories.insert(category, bias);
    }

    fn set_rarity_bias(&mut self, rarity: Rarity, bias: f32) {
        self.rarities.insert(rarity, bias);
    }

    fn clear_biases(&mut self) {
        self.categories.clear();
        self.rarities.clear();
    }

    fn category_bias(&self, category: ItemCategory) -> f32 {
        self.categories.get(&category).copied().unwrap_or(0.0)
    }

    fn rarity_bias(&self, rarity: Rarity) -> f32 {
        self.rarities.get(&rarity).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use director_core::env::seeded;

    fn pool() -> Vec<UpgradeOffer> {
        vec![
            UpgradeOffer::new("Kunai", Some(ItemCategory::Brutality), Rarity::Common),
            UpgradeOffer::new("Armor", Some(ItemCategory::Survival), Rarity::Rare),
            UpgradeOffer::new("Time Piece", Some(ItemCategory::Tactics), Rarity::Common),
            UpgradeOffer::new("Mystery Box", None, Rarity::Uncommon),
        ]
    }

    #[test]
    fn unset_biases_weigh_one() {
        let mut table = LootTable::new();
        let pool = pool();
        assert_eq!(table.weight(&pool[3]), 1.0);

        table.set_category_bias(ItemCategory::Survival, 3.0);
        table.set_rarity_bias(Rarity::Rare, 1.5);
        assert!((table.weight(&pool[1]) - 4.5).abs() < 1e-6);
        assert_eq!(table.weight(&pool[0]), 1.0);
        assert_eq!(table.category_bias(ItemCategory::Brutality), 0.0);
    }

    #[test]
    fn selection_is_without_replacement() {
        let table = LootTable::new();
        let pool = pool();
        let mut rng = seeded(7);

        let picks = table.choose_upgrades(&pool, Some(3), &mut rng);
        assert_eq!(picks.len(), 3);
        for (i, a) in picks.iter().enumerate() {
            for b in &picks[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }

        assert_eq!(table.choose_upgrades(&pool, Some(10), &mut rng).len(), 4);
        assert_eq!(table.choose_upgrades(&pool, None, &mut rng).len(), 4);
    }

    #[test]
    fn heavy_bias_dominates_first_pick() {
        let mut table = LootTable::new();
        table.set_category_bias(ItemCategory::Survival, 1000.0);
        let pool = pool();
        let mut rng = seeded(11);

        let survival_first = (0..200)
            .filter(|_| table.choose_upgrades(&pool, Some(1), &mut rng)[0].name == "Armor")
            .count();
        assert!(survival_first > 190);
    }

    #[test]
    fn zero_weights_still_fill_the_draw() {
        let mut table = LootTable::new();
        table.set_rarity_bias(Rarity::Common, 0.0);
        table.set_rarity_bias(Rarity::Rare, 0.0);
        table.set_rarity_bias(Rarity::Uncommon, 0.0);
        let pool = pool();
        let mut rng = seeded(3);
        assert_eq!(table.choose_upgrades(&pool, Some(4), &mut rng).len(), 4);
    }
}
