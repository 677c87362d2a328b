//! Player-facing telemetry: push events and the pull-side source trait.

use glam::Vec2;

use crate::profile::{CategoryTally, InventoryProfile, ItemCategory, Rarity};

/// Discrete telemetry pushed by gameplay systems as it happens.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TelemetryEvent {
    DamageTaken(f32),
    DamageDealt(f32),
    /// An enemy died; `ttk` is the time from its first hit to its death.
    Kill { ttk: f32 },
    ItemPicked {
        category: ItemCategory,
        rarity: Rarity,
    },
}

/// Pull-side telemetry read once per tick.
///
/// Implementations return `None` for values they cannot provide this tick.
/// Missing HP makes the tick a "no signal" tick: the estimator keeps its
/// previous HP and decision tasks are skipped.
pub trait PlayerTelemetrySource {
    fn max_hp(&self) -> Option<f32>;

    fn current_hp(&self) -> Option<f32>;

    /// Raw movement input, magnitude in [0, 1].
    fn movement_input(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// World position, used as the anchor the agent cluster is pulled toward.
    fn position(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Summed item levels per category for the current inventory.
    fn inventory(&self) -> CategoryTally {
        CategoryTally::default()
    }

    fn inventory_profile(&self) -> InventoryProfile {
        InventoryProfile::classify(&self.inventory())
    }

    /// HP fraction, `None` when either side is missing.
    fn hp_percent(&self) -> Option<f32> {
        let max = self.max_hp()?;
        let current = self.current_hp()?;
        if max <= 0.0 {
            return Some(0.0);
        }
        Some((current / max).clamp(0.0, 1.0))
    }
}

/// Plain-value telemetry, useful for tests and headless drivers.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TelemetrySnapshot {
    pub max_hp: Option<f32>,
    pub current_hp: Option<f32>,
    pub movement_input: Vec2,
    pub position: Vec2,
    pub inventory: CategoryTally,
}

impl TelemetrySnapshot {
    pub fn new(current_hp: f32, max_hp: f32) -> Self {
        Self {
            max_hp: Some(max_hp),
            current_hp: Some(current_hp),
            ..Self::default()
        }
    }

    pub fn with_movement(mut self, input: Vec2) -> Self {
        self.movement_input = input;
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_inventory(mut self, inventory: CategoryTally) -> Self {
        self.inventory = inventory;
        self
    }
}

impl PlayerTelemetrySource for TelemetrySnapshot {
    fn max_hp(&self) -> Option<f32> {
        self.max_hp
    }

    fn current_hp(&self) -> Option<f32> {
        self.current_hp
    }

    fn movement_input(&self) -> Vec2 {
        self.movement_input
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn inventory(&self) -> CategoryTally {
        self.inventory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hp_percent_clamps_and_guards_zero_max() {
        assert_eq!(TelemetrySnapshot::new(150.0, 100.0).hp_percent(), Some(1.0));
        assert_eq!(TelemetrySnapshot::new(50.0, 0.0).hp_percent(), Some(0.0));
        assert_eq!(TelemetrySnapshot::default().hp_percent(), None);
    }
}
