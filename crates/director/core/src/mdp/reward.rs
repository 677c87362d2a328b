//! Pacing reward for one planner transition.
//!
//! The reward favors landing in Neutral or Tense, punishes both extremes, and
//! weights each action by how useful it is in the current session phase:
//! spawns and loot matter early, curses matter late.

use super::state::{DirectorAction, MacroState};
use crate::config::RewardWeights;
use crate::profile::{PlayerProfile, TimePhase};

/// Scores `(state, action, next)` transitions against a profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardModel {
    weights: RewardWeights,
}

impl RewardModel {
    pub fn new(weights: RewardWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &RewardWeights {
        &self.weights
    }

    pub fn reward(
        &self,
        state: MacroState,
        action: DirectorAction,
        next: MacroState,
        profile: &PlayerProfile,
    ) -> f32 {
        let w = &self.weights;
        let phase = TimePhase::classify(profile.session_time);

        let outcome = match next {
            MacroState::Neutral => w.neutral_bonus,
            MacroState::Tense => w.tense_bonus,
            MacroState::Dominating | MacroState::Suffering => -w.extreme_penalty,
            MacroState::Relaxed => 0.0,
        };

        let loot_fit = match action {
            DirectorAction::AdjustLoot if profile.item_prediction_matches_favorite() => {
                w.loot_match_bonus
            }
            DirectorAction::AdjustLoot => w.loot_default_bonus,
            _ => 0.0,
        };

        let action_value = self.action_base(state, action) * phase_multiplier(action, phase);
        let survival = (1.0 + profile.session_time.max(0.0)).ln();

        outcome + loot_fit + action_value + survival - w.flat_cost
    }

    fn action_base(&self, state: MacroState, action: DirectorAction) -> f32 {
        match action {
            DirectorAction::SpawnEnemies => self.weights.spawn_base,
            DirectorAction::TriggerEvent => self.weights.event_base,
            DirectorAction::AdjustLoot => self.weights.loot_base,
            DirectorAction::AdjustCurse => curse_base(state),
        }
    }
}

/// Curse is most valuable against a dominating player and worthless mid-tension.
pub const fn curse_base(state: MacroState) -> f32 {
    match state {
        MacroState::Dominating => 4.5,
        MacroState::Relaxed => 3.0,
        MacroState::Suffering => 2.5,
        MacroState::Neutral => 1.0,
        MacroState::Tense => 0.0,
    }
}

pub const fn phase_multiplier(action: DirectorAction, phase: TimePhase) -> f32 {
    match (action, phase) {
        (DirectorAction::SpawnEnemies | DirectorAction::AdjustLoot, TimePhase::Early) => 1.5,
        (DirectorAction::SpawnEnemies | DirectorAction::AdjustLoot, TimePhase::Mid) => 1.0,
        (DirectorAction::SpawnEnemies | DirectorAction::AdjustLoot, TimePhase::Late) => 0.5,
        (DirectorAction::AdjustCurse, TimePhase::Early) => 0.5,
        (DirectorAction::AdjustCurse, TimePhase::Mid) => 1.0,
        (DirectorAction::AdjustCurse, TimePhase::Late) => 3.0,
        (DirectorAction::TriggerEvent, TimePhase::Early) => 1.2,
        (DirectorAction::TriggerEvent, TimePhase::Mid) => 1.0,
        (DirectorAction::TriggerEvent, TimePhase::Late) => 0.8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ItemCategory;

    fn profile_at(session_time: f32) -> PlayerProfile {
        PlayerProfile {
            session_time,
            ..PlayerProfile::new()
        }
    }

    #[test]
    fn neutral_spawn_at_start() {
        let model = RewardModel::default();
        let r = model.reward(
            MacroState::Neutral,
            DirectorAction::SpawnEnemies,
            MacroState::Neutral,
            &profile_at(0.0),
        );
        // 3.5 outcome + 4 * 1.5 spawn + ln(1) - 0.2
        assert!((r - 9.3).abs() < 1e-5);
    }

    #[test]
    fn extremes_are_penalized() {
        let model = RewardModel::default();
        let profile = profile_at(200.0);
        let tense = model.reward(
            MacroState::Neutral,
            DirectorAction::TriggerEvent,
            MacroState::Tense,
            &profile,
        );
        let suffering = model.reward(
            MacroState::Neutral,
            DirectorAction::TriggerEvent,
            MacroState::Suffering,
            &profile,
        );
        assert!((tense - suffering - 9.0).abs() < 1e-5);
    }

    #[test]
    fn matching_loot_prediction_earns_bonus() {
        let model = RewardModel::default();
        let mut profile = profile_at(10.0);
        profile.predicted_item_category = Some(ItemCategory::Tactics);
        profile.favored_item_category = Some(ItemCategory::Tactics);

        let matched = model.reward(
            MacroState::Dominating,
            DirectorAction::AdjustLoot,
            MacroState::Relaxed,
            &profile,
        );
        profile.favored_item_category = Some(ItemCategory::Survival);
        let unmatched = model.reward(
            MacroState::Dominating,
            DirectorAction::AdjustLoot,
            MacroState::Relaxed,
            &profile,
        );
        assert!((matched - unmatched - 4.0).abs() < 1e-5);
    }

    #[test]
    fn curse_scales_with_state_and_phase() {
        let model = RewardModel::default();
        let early = model.reward(
            MacroState::Dominating,
            DirectorAction::AdjustCurse,
            MacroState::Relaxed,
            &profile_at(0.0),
        );
        // 0 outcome + 4.5 * 0.5 - 0.2
        assert!((early - 2.05).abs() < 1e-5);

        let tense = model.reward(
            MacroState::Tense,
            DirectorAction::AdjustCurse,
            MacroState::Relaxed,
            &profile_at(0.0),
        );
        assert!((tense + 0.2).abs() < 1e-5);
    }
}
