//! Macro-states and the actions the planner chooses between.

use strum::EnumCount;

use crate::profile::PlayerProfile;

/// Coarse match pressure as perceived from player telemetry.
///
/// Variants are ordered from most comfortable to most dire, so
/// [`toward_dominating`](Self::toward_dominating) and
/// [`toward_suffering`](Self::toward_suffering) move one notch along that axis.
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
pub enum MacroState {
    Dominating,
    Relaxed,
    #[default]
    Neutral,
    Tense,
    Suffering,
}

impl MacroState {
    pub const ALL: [Self; Self::COUNT] = [
        Self::Dominating,
        Self::Relaxed,
        Self::Neutral,
        Self::Tense,
        Self::Suffering,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Classifies raw ratios into a state.
    ///
    /// `dps_ratio` and `damage_ratio` compare the forecast to the session
    /// average; `hp` is the HP fraction. Rules are checked in order:
    /// Dominating, Relaxed, Tense, Suffering, then Neutral.
    pub fn derive(dps_ratio: f32, damage_ratio: f32, hp: f32) -> Self {
        let offensive_dominance = dps_ratio > 1.1 && damage_ratio < 0.9 && hp > 0.75;
        let defensive_dominance = hp > 0.9 && damage_ratio < 0.7;
        if offensive_dominance || defensive_dominance {
            return Self::Dominating;
        }

        let in_control = dps_ratio > 1.0 && damage_ratio < 1.0 && hp > 0.75;
        let sustaining = hp > 0.85 && damage_ratio < 0.7;
        let starved = hp > 0.9 && damage_ratio < 0.7 && dps_ratio < 0.8;
        if in_control || sustaining || starved {
            return Self::Relaxed;
        }

        let pushing_through = damage_ratio > 1.2 && hp < 0.7;
        let retreating = hp < 0.5 && dps_ratio < 0.9;
        if pushing_through || retreating {
            return Self::Tense;
        }

        if hp < 0.2 || (damage_ratio > 1.8 && hp < 0.3) {
            return Self::Suffering;
        }

        Self::Neutral
    }

    pub fn from_profile(profile: &PlayerProfile) -> Self {
        Self::derive(
            profile.dps_ratio(),
            profile.damage_ratio(),
            profile.hp_percent,
        )
    }

    /// One notch toward Dominating; Dominating stays put.
    pub const fn toward_dominating(self) -> Self {
        match self {
            Self::Suffering => Self::Tense,
            Self::Tense => Self::Neutral,
            Self::Neutral => Self::Relaxed,
            Self::Relaxed | Self::Dominating => Self::Dominating,
        }
    }

    /// One notch toward Suffering; Suffering stays put.
    pub const fn toward_suffering(self) -> Self {
        match self {
            Self::Dominating => Self::Relaxed,
            Self::Relaxed => Self::Neutral,
            Self::Neutral => Self::Tense,
            Self::Tense | Self::Suffering => Self::Suffering,
        }
    }
}

/// Discrete interventions available to the macro director.
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
pub enum DirectorAction {
    SpawnEnemies,
    TriggerEvent,
    AdjustLoot,
    AdjustCurse,
}

impl DirectorAction {
    /// Enumeration order; also the tie-break order of the planner.
    pub const ALL: [Self; Self::COUNT] = [
        Self::SpawnEnemies,
        Self::TriggerEvent,
        Self::AdjustLoot,
        Self::AdjustCurse,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_cascade() {
        assert_eq!(MacroState::derive(1.2, 0.5, 0.8), MacroState::Dominating);
        assert_eq!(MacroState::derive(0.5, 0.6, 0.95), MacroState::Dominating);
        assert_eq!(MacroState::derive(1.05, 0.95, 0.8), MacroState::Relaxed);
        assert_eq!(MacroState::derive(1.0, 0.65, 0.88), MacroState::Relaxed);
        assert_eq!(MacroState::derive(1.0, 1.3, 0.6), MacroState::Tense);
        assert_eq!(MacroState::derive(0.8, 1.0, 0.45), MacroState::Tense);
        assert_eq!(MacroState::derive(0.5, 1.0, 0.1), MacroState::Tense);
        assert_eq!(MacroState::derive(1.0, 1.0, 0.15), MacroState::Suffering);
        assert_eq!(MacroState::derive(0.95, 1.1, 0.1), MacroState::Suffering);
        assert_eq!(MacroState::derive(1.0, 1.0, 0.7), MacroState::Neutral);
    }

    #[test]
    fn tense_rules_win_over_suffering() {
        // Low HP with weak output reads as Tense before the Suffering rules run.
        assert_eq!(MacroState::derive(0.2, 0.0, 0.05), MacroState::Tense);
        // The heavy-damage Suffering rule is shadowed by the Tense damage rule.
        assert_eq!(MacroState::derive(1.0, 2.0, 0.25), MacroState::Tense);
        assert_eq!(MacroState::derive(1.0, 1.0, 0.19), MacroState::Suffering);
    }

    #[test]
    fn derive_is_pure() {
        let inputs = [(1.2, 0.4, 0.8), (0.7, 1.5, 0.4), (1.0, 1.0, 0.6)];
        for (dps, dmg, hp) in inputs {
            let first = MacroState::derive(dps, dmg, hp);
            for _ in 0..10 {
                assert_eq!(MacroState::derive(dps, dmg, hp), first);
            }
        }
    }

    #[test]
    fn notches_saturate_at_extremes() {
        assert_eq!(
            MacroState::Dominating.toward_dominating(),
            MacroState::Dominating
        );
        assert_eq!(MacroState::Suffering.toward_suffering(), MacroState::Suffering);
        assert_eq!(MacroState::Neutral.toward_dominating(), MacroState::Relaxed);
        assert_eq!(MacroState::Neutral.toward_suffering(), MacroState::Tense);
    }
}
