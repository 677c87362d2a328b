//! Player telemetry snapshot and the per-axis context tags derived from it.
//!
//! Each context axis (time phase, playstyle, movement style, inventory
//! category) is its own small enum. The same word may appear on several axes
//! ("Aggressive" is a playstyle, a movement style and a group behavior); the
//! type keeps them apart.

use glam::Vec2;
use strum::{EnumCount, IntoEnumIterator};

/// Coarse session phase, derived from elapsed time.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimePhase {
    #[default]
    Early,
    Mid,
    Late,
}

impl TimePhase {
    /// Session time at which Mid begins.
    pub const MID_START_SECS: f32 = 150.0;
    /// Session time at which Late begins.
    pub const LATE_START_SECS: f32 = 390.0;

    /// Early `< 150s`, Mid `[150s, 390s)`, Late `>= 390s`.
    pub fn classify(elapsed_secs: f32) -> Self {
        if elapsed_secs < Self::MID_START_SECS {
            Self::Early
        } else if elapsed_secs < Self::LATE_START_SECS {
            Self::Mid
        } else {
            Self::Late
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Combat playstyle inferred from kill speed, damage intake and output.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Playstyle {
    Aggressive,
    Efficient,
    Defensive,
    #[default]
    Balanced,
}

impl Playstyle {
    pub const AGGRESSIVE_MAX_TTK: f32 = 2.0;
    pub const AGGRESSIVE_MIN_DAMAGE_RATE: f32 = 10.0;
    pub const CAREFUL_MAX_DAMAGE_RATE: f32 = 5.0;
    pub const EFFICIENT_MIN_DPS: f32 = 50.0;

    /// First matching rule wins:
    /// fast kills while taking heavy damage, then low intake with high output,
    /// then low intake alone. Anything else is Balanced.
    pub fn classify(avg_ttk: f32, damage_taken_rate: f32, dps: f32) -> Self {
        if avg_ttk > 0.0
            && avg_ttk < Self::AGGRESSIVE_MAX_TTK
            && damage_taken_rate > Self::AGGRESSIVE_MIN_DAMAGE_RATE
        {
            Self::Aggressive
        } else if damage_taken_rate < Self::CAREFUL_MAX_DAMAGE_RATE && dps > Self::EFFICIENT_MIN_DPS
        {
            Self::Efficient
        } else if damage_taken_rate < Self::CAREFUL_MAX_DAMAGE_RATE {
            Self::Defensive
        } else {
            Self::Balanced
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Movement pattern inferred from recent input directions.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementStyle {
    #[default]
    Static,
    /// Sustained movement in one direction.
    Aggressive,
    Erratic,
}

impl MovementStyle {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Build category an item belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemCategory {
    Brutality,
    Tactics,
    Survival,
}

/// Dominant build direction of the current inventory.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InventoryProfile {
    #[default]
    Balanced,
    Brutality,
    Tactics,
    Survival,
}

impl InventoryProfile {
    /// Minimum share of total weight for a category to dominate.
    pub const DOMINANCE_RATIO: f32 = 0.5;

    /// Classifies summed per-category weights.
    ///
    /// A category dominates only with at least half the total weight. Equal
    /// leaders resolve in `ItemCategory` order.
    pub fn classify(tally: &CategoryTally) -> Self {
        let total = tally.total();
        if total == 0 {
            return Self::Balanced;
        }

        let mut best: Option<(ItemCategory, u32)> = None;
        for category in ItemCategory::iter() {
            let weight = tally.get(category);
            // In case of tie, first category wins (stable ordering)
            if best.is_none_or(|(_, w)| weight > w) {
                best = Some((category, weight));
            }
        }

        match best {
            Some((category, weight))
                if weight as f32 / total as f32 >= Self::DOMINANCE_RATIO =>
            {
                category.into()
            }
            _ => Self::Balanced,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl From<ItemCategory> for InventoryProfile {
    fn from(category: ItemCategory) -> Self {
        match category {
            ItemCategory::Brutality => Self::Brutality,
            ItemCategory::Tactics => Self::Tactics,
            ItemCategory::Survival => Self::Survival,
        }
    }
}

/// Item rarity tier.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Ssr,
    Evolution,
}

/// Per-category counters, used both for inventory levels and pickup counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CategoryTally {
    pub brutality: u32,
    pub tactics: u32,
    pub survival: u32,
}

impl CategoryTally {
    pub const fn new(brutality: u32, tactics: u32, survival: u32) -> Self {
        Self {
            brutality,
            tactics,
            survival,
        }
    }

    pub const fn get(&self, category: ItemCategory) -> u32 {
        match category {
            ItemCategory::Brutality => self.brutality,
            ItemCategory::Tactics => self.tactics,
            ItemCategory::Survival => self.survival,
        }
    }

    pub fn add(&mut self, category: ItemCategory, amount: u32) {
        let slot = match category {
            ItemCategory::Brutality => &mut self.brutality,
            ItemCategory::Tactics => &mut self.tactics,
            ItemCategory::Survival => &mut self.survival,
        };
        *slot = slot.saturating_add(amount);
    }

    pub const fn total(&self) -> u32 {
        self.brutality + self.tactics + self.survival
    }

    /// Category with the highest count, `None` when empty.
    pub fn top(&self) -> Option<ItemCategory> {
        let mut best: Option<(ItemCategory, u32)> = None;
        for category in ItemCategory::iter() {
            let count = self.get(category);
            if count > 0 && best.is_none_or(|(_, c)| count > c) {
                best = Some((category, count));
            }
        }
        best.map(|(category, _)| category)
    }
}

/// Mutable telemetry snapshot for one run.
///
/// Updated by [`crate::estimator::PlayerStateEstimator`] every tick and read by
/// every decision layer. Fields are flat and additive-only so older snapshots
/// keep deserializing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerProfile {
    /// Seconds since the run started.
    pub session_time: f32,

    pub rolling_dps: f32,
    pub session_dps: f32,
    pub predicted_dps: f32,

    pub rolling_damage_taken: f32,
    pub session_damage_taken: f32,
    pub predicted_damage_taken: f32,

    pub rolling_kps: f32,
    pub session_kps: f32,
    pub predicted_kps: f32,

    pub total_kills: u32,
    /// Mean time-to-kill over all recorded kills.
    pub avg_ttk: f32,

    /// Current HP over max HP, clamped to [0, 1].
    pub hp_percent: f32,

    pub playstyle: Playstyle,
    pub time_phase: TimePhase,
    pub movement: MovementStyle,
    pub avg_move_speed: f32,
    pub avg_move_dir: Vec2,

    /// Category of the most recent item pickup.
    pub predicted_item_category: Option<ItemCategory>,
    /// Most frequently picked category this run.
    pub favored_item_category: Option<ItemCategory>,
    pub category_usage: CategoryTally,
    pub rarity_usage: [u32; Rarity::COUNT],

    pub continued_from_previous: bool,
    pub replay_count: u32,
}

impl PlayerProfile {
    pub fn new() -> Self {
        Self {
            session_time: 0.0,
            rolling_dps: 0.0,
            session_dps: 0.0,
            predicted_dps: 0.0,
            rolling_damage_taken: 0.0,
            session_damage_taken: 0.0,
            predicted_damage_taken: 0.0,
            rolling_kps: 0.0,
            session_kps: 0.0,
            predicted_kps: 0.0,
            total_kills: 0,
            avg_ttk: 0.0,
            hp_percent: 1.0,
            playstyle: Playstyle::default(),
            time_phase: TimePhase::default(),
            movement: MovementStyle::default(),
            avg_move_speed: 0.0,
            avg_move_dir: Vec2::ZERO,
            predicted_item_category: None,
            favored_item_category: None,
            category_usage: CategoryTally::default(),
            rarity_usage: [0; Rarity::COUNT],
            continued_from_previous: false,
            replay_count: 0,
        }
    }

    /// Prediction over session average, with a small denominator guard.
    pub fn dps_ratio(&self) -> f32 {
        self.predicted_dps / (self.session_dps + Self::RATIO_EPSILON)
    }

    pub fn damage_ratio(&self) -> f32 {
        self.predicted_damage_taken / (self.session_damage_taken + Self::RATIO_EPSILON)
    }

    /// True when the latest pickup matches the most-picked category.
    pub fn item_prediction_matches_favorite(&self) -> bool {
        matches!(
            (self.predicted_item_category, self.favored_item_category),
            (Some(predicted), Some(favored)) if predicted == favored
        )
    }

    pub fn rarity_count(&self, rarity: Rarity) -> u32 {
        self.rarity_usage[rarity as usize]
    }

    const RATIO_EPSILON: f32 = 0.01;
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::new()
    }
}
