//! The director's single output record.

use super::state::{DirectorAction, MacroState};

/// Loot direction requested from drop tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LootBias {
    Dps,
    Survival,
    #[default]
    Balanced,
}

impl LootBias {
    pub const fn for_state(state: MacroState) -> Self {
        match state {
            MacroState::Dominating => Self::Dps,
            MacroState::Suffering => Self::Survival,
            _ => Self::Balanced,
        }
    }
}

/// Wave template family requested from spawners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaveType {
    #[default]
    Easy,
    Medium,
    Hard,
    Event,
}

impl WaveType {
    pub const fn for_state(state: MacroState) -> Self {
        match state {
            MacroState::Tense => Self::Hard,
            MacroState::Suffering => Self::Event,
            MacroState::Dominating => Self::Medium,
            _ => Self::Easy,
        }
    }
}

/// Baseline curse adjustment carried by a directive for a state.
pub const fn curse_adjustment_for_state(state: MacroState) -> f32 {
    match state {
        MacroState::Suffering => -1.0,
        MacroState::Dominating => 1.0,
        _ => 0.0,
    }
}

/// Macro-director intent handed to downstream systems.
///
/// Consumers translate it into spawn templates, stat multipliers and drop
/// tables; the director never reads it back except as a bias source for the
/// group-behavior layer.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Directive {
    pub target_state: MacroState,
    pub loot_bias: LootBias,
    pub wave_type: WaveType,
    pub curse_adjustment: f32,
    pub last_action: DirectorAction,
}

impl Directive {
    /// Directive with every field derived from `state` alone.
    pub const fn for_state(state: MacroState, action: DirectorAction) -> Self {
        Self {
            target_state: state,
            loot_bias: LootBias::for_state(state),
            wave_type: WaveType::for_state(state),
            curse_adjustment: curse_adjustment_for_state(state),
            last_action: action,
        }
    }
}
