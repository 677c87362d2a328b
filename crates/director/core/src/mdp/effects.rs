//! Side effects triggered by each planner action, keyed off the next state.

use rand::Rng;

use super::state::MacroState;
use crate::env::{Difficulty, LootBiasSink, roulette};
use crate::profile::{ItemCategory, PlayerProfile, Rarity, TimePhase};

/// `[easy, medium, hard]` spawn weights for a state.
pub const fn wave_difficulty_weights(state: MacroState) -> [f32; 3] {
    match state {
        MacroState::Dominating => [0.0, 0.2, 0.8],
        MacroState::Relaxed => [0.0, 0.6, 0.4],
        MacroState::Neutral => [0.3, 0.5, 0.2],
        MacroState::Tense => [0.2, 0.6, 0.2],
        MacroState::Suffering => [0.7, 0.3, 0.0],
    }
}

/// Event weights: wave weights with hard events capped early in the session.
pub fn event_difficulty_weights(state: MacroState, phase: TimePhase) -> [f32; 3] {
    let [easy, mut medium, mut hard] = wave_difficulty_weights(state);
    match phase {
        TimePhase::Early => {
            hard = hard.min(0.1);
            medium = medium.max(0.4);
        }
        TimePhase::Mid => hard = hard.min(0.4),
        TimePhase::Late => {}
    }
    [easy, medium, hard]
}

/// Roulette over `[easy, medium, hard]`; an empty wheel yields Medium.
pub fn roll_difficulty<R: Rng + ?Sized>(rng: &mut R, weights: [f32; 3]) -> Difficulty {
    match roulette(rng, weights) {
        Some(0) => Difficulty::Easy,
        Some(2) => Difficulty::Hard,
        _ => Difficulty::Medium,
    }
}

/// Rewrites drop-table biases for `state`, then layers on forecast-driven
/// corrections and the player's item preferences.
pub fn apply_loot_bias(sink: &mut dyn LootBiasSink, state: MacroState, profile: &PlayerProfile) {
    sink.clear_biases();

    match state {
        MacroState::Dominating => {
            add_category(sink, ItemCategory::Tactics, 2.0);
            add_rarity(sink, Rarity::Common, 1.5);
        }
        MacroState::Relaxed => add_rarity(sink, Rarity::Common, 1.5),
        MacroState::Neutral => add_category(sink, ItemCategory::Tactics, 1.2),
        MacroState::Tense => add_category(sink, ItemCategory::Brutality, 2.0),
        MacroState::Suffering => {
            add_category(sink, ItemCategory::Survival, 3.0);
            add_rarity(sink, Rarity::Rare, 1.5);
        }
    }

    if profile.predicted_dps < profile.session_dps * 0.8 {
        add_category(sink, ItemCategory::Brutality, 2.0);
    }
    if profile.predicted_damage_taken > 10.0 {
        add_category(sink, ItemCategory::Survival, 2.0);
    }

    if let Some(predicted) = profile.predicted_item_category {
        let bump = (sink.category_bias(predicted) + 2.0).min(2.0);
        add_category(sink, predicted, bump);
    }
    if let Some(favored) = profile.favored_item_category {
        let bump = (sink.category_bias(favored) + 1.5).min(1.5);
        add_category(sink, favored, bump);
    }
}

/// Curse steps pushed for a next state.
///
/// Pressure rises against a comfortable player, more so once the session is
/// past its opening, and falls harder the earlier a struggling player is.
pub fn curse_steps(state: MacroState, phase: TimePhase, dps_ratio: f32, hp: f32) -> i32 {
    match state {
        MacroState::Dominating => {
            let late_blowout = phase == TimePhase::Late && dps_ratio > 1.2 && hp > 0.9;
            let healthy_after_opening = hp > 0.9 && phase != TimePhase::Early;
            if late_blowout || healthy_after_opening {
                2
            } else {
                1
            }
        }
        MacroState::Relaxed => 1,
        MacroState::Neutral => 0,
        MacroState::Tense => match phase {
            TimePhase::Early | TimePhase::Mid => -2,
            TimePhase::Late => -1,
        },
        MacroState::Suffering => match phase {
            TimePhase::Early => -3,
            TimePhase::Mid => -2,
            TimePhase::Late => -1,
        },
    }
}

fn add_category(sink: &mut dyn LootBiasSink, category: ItemCategory, amount: f32) {
    let current = sink.category_bias(category);
    sink.set_category_bias(category, current + amount);
}

fn add_rarity(sink: &mut dyn LootBiasSink, rarity: Rarity, amount: f32) {
    let current = sink.rarity_bias(rarity);
    sink.set_rarity_bias(rarity, current + amount);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::seeded;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapSink {
        categories: HashMap<ItemCategory, f32>,
        rarities: HashMap<Rarity, f32>,
    }

    impl LootBiasSink for MapSink {
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

    #[test]
    fn early_events_cap_hard_difficulty() {
        let weights = event_difficulty_weights(MacroState::Dominating, TimePhase::Early);
        assert_eq!(weights, [0.0, 0.4, 0.1]);

        let weights = event_difficulty_weights(MacroState::Dominating, TimePhase::Mid);
        assert_eq!(weights, [0.0, 0.2, 0.4]);

        let weights = event_difficulty_weights(MacroState::Dominating, TimePhase::Late);
        assert_eq!(weights, [0.0, 0.2, 0.8]);
    }

    #[test]
    fn suffering_never_rolls_hard_waves() {
        let mut rng = seeded(5);
        for _ in 0..300 {
            let d = roll_difficulty(&mut rng, wave_difficulty_weights(MacroState::Suffering));
            assert_ne!(d, Difficulty::Hard);
        }
    }

    #[test]
    fn empty_wheel_rolls_medium() {
        let mut rng = seeded(5);
        assert_eq!(roll_difficulty(&mut rng, [0.0; 3]), Difficulty::Medium);
    }

    #[test]
    fn suffering_loot_favors_survival() {
        let mut sink = MapSink::default();
        sink.set_category_bias(ItemCategory::Tactics, 9.0);

        let profile = PlayerProfile {
            predicted_damage_taken: 12.0,
            favored_item_category: Some(ItemCategory::Survival),
            ..PlayerProfile::new()
        };
        apply_loot_bias(&mut sink, MacroState::Suffering, &profile);

        assert_eq!(sink.category_bias(ItemCategory::Tactics), 0.0);
        assert!((sink.category_bias(ItemCategory::Survival) - 6.5).abs() < 1e-6);
        assert!((sink.rarity_bias(Rarity::Rare) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn curse_step_table() {
        assert_eq!(curse_steps(MacroState::Dominating, TimePhase::Early, 1.5, 0.95), 1);
        assert_eq!(curse_steps(MacroState::Dominating, TimePhase::Mid, 1.0, 0.95), 2);
        assert_eq!(curse_steps(MacroState::Dominating, TimePhase::Late, 1.0, 0.8), 1);
        assert_eq!(curse_steps(MacroState::Relaxed, TimePhase::Late, 1.0, 0.5), 1);
        assert_eq!(curse_steps(MacroState::Neutral, TimePhase::Mid, 1.0, 0.5), 0);
        assert_eq!(curse_steps(MacroState::Tense, TimePhase::Mid, 1.0, 0.5), -2);
        assert_eq!(curse_steps(MacroState::Tense, TimePhase::Late, 1.0, 0.5), -1);
        assert_eq!(curse_steps(MacroState::Suffering, TimePhase::Early, 1.0, 0.1), -3);
        assert_eq!(curse_steps(MacroState::Suffering, TimePhase::Late, 1.0, 0.1), -1);
    }
}
