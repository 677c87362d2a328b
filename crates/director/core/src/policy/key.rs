//! Four-axis policy context packed into a small integer.

use strum::EnumCount;

use crate::profile::{InventoryProfile, MovementStyle, PlayerProfile, Playstyle, TimePhase};

/// Context used to look up candidate behaviors and bandit weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyKey {
    pub phase: TimePhase,
    pub playstyle: Playstyle,
    pub movement: MovementStyle,
    pub inventory: InventoryProfile,
}

impl PolicyKey {
    /// Size of the finite key domain.
    pub const COUNT: usize =
        TimePhase::COUNT * Playstyle::COUNT * MovementStyle::COUNT * InventoryProfile::COUNT;

    pub const fn new(
        phase: TimePhase,
        playstyle: Playstyle,
        movement: MovementStyle,
        inventory: InventoryProfile,
    ) -> Self {
        Self {
            phase,
            playstyle,
            movement,
            inventory,
        }
    }

    /// Key for the profile's current tags and an inventory classification.
    pub fn from_profile(profile: &PlayerProfile, inventory: InventoryProfile) -> Self {
        Self::new(
            profile.time_phase,
            profile.playstyle,
            profile.movement,
            inventory,
        )
    }

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        let mut index = self.phase.index();
        index = index * Playstyle::COUNT + self.playstyle.index();
        index = index * MovementStyle::COUNT + self.movement.index();
        index * InventoryProfile::COUNT + self.inventory.index()
    }

    /// Same context with the inventory axis set to Balanced.
    pub const fn with_balanced_inventory(self) -> Self {
        Self {
            inventory: InventoryProfile::Balanced,
            ..self
        }
    }
}

impl core::fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.phase, self.playstyle, self.movement, self.inventory
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn index_is_dense_and_unique() {
        let mut seen = HashSet::new();
        for phase in TimePhase::iter() {
            for playstyle in Playstyle::iter() {
                for movement in MovementStyle::iter() {
                    for inventory in InventoryProfile::iter() {
                        let key = PolicyKey::new(phase, playstyle, movement, inventory);
                        assert!(key.index() < PolicyKey::COUNT);
                        assert!(seen.insert(key.index()));
                    }
                }
            }
        }
        assert_eq!(seen.len(), 144);
    }

    #[test]
    fn balanced_fallback_keeps_other_axes() {
        let key = PolicyKey::new(
            TimePhase::Late,
            Playstyle::Efficient,
            MovementStyle::Erratic,
            InventoryProfile::Survival,
        );
        let fallback = key.with_balanced_inventory();
        assert_eq!(fallback.phase, TimePhase::Late);
        assert_eq!(fallback.playstyle, Playstyle::Efficient);
        assert_eq!(fallback.movement, MovementStyle::Erratic);
        assert_eq!(fallback.inventory, InventoryProfile::Balanced);
    }
}
