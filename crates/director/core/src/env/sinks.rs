//! Fire-and-forget collaborators the macro director pushes side effects into.
//!
//! None of these calls return a result: the director never waits on, or
//! reacts to, the outcome of a side effect.

use crate::profile::{ItemCategory, Rarity, TimePhase};

/// Requested difficulty of a wave or scripted event.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Spawn requests. Concrete unit selection belongs to the implementor.
pub trait WaveQueue {
    fn enqueue(&mut self, phase: TimePhase, difficulty: Difficulty);
}

/// Scripted-event triggers.
pub trait EventQueue {
    fn enqueue(&mut self, phase: TimePhase, difficulty: Difficulty);
}

/// Drop-table weighting, rewritten once per loot action.
pub trait LootBiasSink {
    fn set_category_bias(&mut self, category: ItemCategory, bias: f32);

    fn set_rarity_bias(&mut self, rarity: Rarity, bias: f32);

    fn clear_biases(&mut self);

    /// Current bias for a category, `0.0` when unset.
    fn category_bias(&self, category: ItemCategory) -> f32;

    fn rarity_bias(&self, rarity: Rarity) -> f32;
}

/// Global difficulty multiplier.
///
/// Combines a director-controlled term moved in whole steps with a late-game
/// term that only ever grows.
pub trait CurseSink {
    fn adjust_steps(&mut self, steps: i32);

    fn add_bias(&mut self, amount: f32);

    /// `1 + sum(terms)`.
    fn multiplier(&self) -> f32;
}
