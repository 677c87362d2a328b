//! Stochastic transition model `P(next | state, action)`.
//!
//! The model is immutable once built. Every row is a normalized distribution
//! over [`MacroState`]; rows that were never specified are a 100% self-loop,
//! so sampling never fails.

use rand::Rng;
use strum::EnumCount;
use thiserror::Error;

use super::state::{DirectorAction, MacroState};
use crate::env::roulette;
use crate::error::{DirectorError, ErrorSeverity};

/// Distribution over next states, indexed by [`MacroState::index`].
pub type StateDistribution = [f32; MacroState::COUNT];

#[derive(Clone, Debug, PartialEq, Error)]
pub enum TransitionError {
    #[error("probability for {from} --{action}--> {to} is not finite")]
    NonFinite {
        from: MacroState,
        action: DirectorAction,
        to: MacroState,
    },

    #[error("row {from} --{action}--> specified more than once")]
    DuplicateRow {
        from: MacroState,
        action: DirectorAction,
    },
}

impl DirectorError for TransitionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NonFinite { .. } => "TRANSITION_NON_FINITE",
            Self::DuplicateRow { .. } => "TRANSITION_DUPLICATE_ROW",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransitionModel {
    rows: [[StateDistribution; DirectorAction::COUNT]; MacroState::COUNT],
}

impl TransitionModel {
    pub fn builder() -> TransitionModelBuilder {
        TransitionModelBuilder::new()
    }

    /// Model in which every action keeps the current state.
    pub fn self_loops() -> Self {
        let mut rows = [[[0.0; MacroState::COUNT]; DirectorAction::COUNT]; MacroState::COUNT];
        for state in MacroState::ALL {
            for action in DirectorAction::ALL {
                rows[state.index()][action.index()][state.index()] = 1.0;
            }
        }
        Self { rows }
    }

    /// The tuned pacing table used by default directors.
    pub fn standard() -> Self {
        use DirectorAction::*;
        use MacroState::*;

        let table: [(MacroState, DirectorAction, &[(MacroState, f32)]); 20] = [
            (Dominating, SpawnEnemies, &[(Dominating, 0.5), (Relaxed, 0.3), (Neutral, 0.2)]),
            (Dominating, TriggerEvent, &[(Dominating, 0.4), (Tense, 0.4), (Neutral, 0.2)]),
            (Dominating, AdjustLoot, &[(Dominating, 0.5), (Relaxed, 0.3), (Neutral, 0.2)]),
            (Dominating, AdjustCurse, &[(Dominating, 0.2), (Neutral, 0.4), (Tense, 0.4)]),
            (Relaxed, SpawnEnemies, &[(Relaxed, 0.5), (Neutral, 0.3), (Tense, 0.2)]),
            (Relaxed, TriggerEvent, &[(Relaxed, 0.4), (Tense, 0.4), (Neutral, 0.2)]),
            (Relaxed, AdjustLoot, &[(Relaxed, 0.6), (Dominating, 0.25), (Neutral, 0.15)]),
            (Relaxed, AdjustCurse, &[(Relaxed, 0.3), (Neutral, 0.4), (Tense, 0.3)]),
            (Neutral, SpawnEnemies, &[(Neutral, 0.5), (Tense, 0.3), (Relaxed, 0.2)]),
            (Neutral, TriggerEvent, &[(Neutral, 0.4), (Relaxed, 0.3), (Tense, 0.3)]),
            (Neutral, AdjustLoot, &[(Neutral, 0.5), (Relaxed, 0.3), (Dominating, 0.2)]),
            (Neutral, AdjustCurse, &[(Dominating, 0.2), (Neutral, 0.4), (Tense, 0.4)]),
            (Tense, SpawnEnemies, &[(Tense, 0.5), (Suffering, 0.3), (Neutral, 0.2)]),
            (Tense, TriggerEvent, &[(Tense, 0.4), (Suffering, 0.4), (Neutral, 0.2)]),
            (Tense, AdjustLoot, &[(Tense, 0.5), (Neutral, 0.3), (Relaxed, 0.2)]),
            (Tense, AdjustCurse, &[(Tense, 0.4), (Suffering, 0.4), (Neutral, 0.2)]),
            (Suffering, SpawnEnemies, &[(Suffering, 0.6), (Tense, 0.3), (Neutral, 0.1)]),
            (Suffering, TriggerEvent, &[(Suffering, 0.7), (Tense, 0.3)]),
            (Suffering, AdjustLoot, &[(Suffering, 0.5), (Relaxed, 0.3), (Neutral, 0.2)]),
            (Suffering, AdjustCurse, &[(Suffering, 0.5), (Tense, 0.3), (Neutral, 0.2)]),
        ];

        let mut builder = Self::builder();
        for (from, action, pairs) in table {
            builder = builder.row(from, action, pairs);
        }
        // Table literals are finite and unique.
        builder.build().unwrap_or_else(|_| Self::self_loops())
    }

    pub fn distribution(&self, state: MacroState, action: DirectorAction) -> &StateDistribution {
        &self.rows[state.index()][action.index()]
    }

    pub fn probability(&self, from: MacroState, action: DirectorAction, to: MacroState) -> f32 {
        self.rows[from.index()][action.index()][to.index()]
    }

    /// Roulette-wheel draw of the next state.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        state: MacroState,
        action: DirectorAction,
        rng: &mut R,
    ) -> MacroState {
        let row = self.distribution(state, action);
        roulette(rng, row.iter().copied())
            .map(|index| MacroState::ALL[index])
            .unwrap_or(state)
    }
}

impl Default for TransitionModel {
    fn default() -> Self {
        Self::standard()
    }
}

/// Collects rows, then normalizes them into a [`TransitionModel`].
///
/// Probabilities are clamped to [0, 1]. When a row sums to less than 1 the
/// remainder goes to staying in the same state; the row is then normalized.
#[derive(Clone, Debug, Default)]
pub struct TransitionModelBuilder {
    rows: Vec<(MacroState, DirectorAction, Vec<(MacroState, f32)>)>,
}

impl TransitionModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(
        mut self,
        from: MacroState,
        action: DirectorAction,
        pairs: &[(MacroState, f32)],
    ) -> Self {
        self.rows.push((from, action, pairs.to_vec()));
        self
    }

    pub fn build(self) -> Result<TransitionModel, TransitionError> {
        let mut model = TransitionModel::self_loops();
        let mut seen = [[false; DirectorAction::COUNT]; MacroState::COUNT];

        for (from, action, pairs) in self.rows {
            let slot = &mut seen[from.index()][action.index()];
            if *slot {
                return Err(TransitionError::DuplicateRow { from, action });
            }
            *slot = true;

            let mut row = [0.0; MacroState::COUNT];
            let mut listed = 0.0;
            for (to, p) in pairs {
                if !p.is_finite() {
                    return Err(TransitionError::NonFinite { from, action, to });
                }
                let p = p.clamp(0.0, 1.0);
                row[to.index()] += p;
                listed += p;
            }

            if listed < 1.0 {
                row[from.index()] += 1.0 - listed;
            }
            let total: f32 = row.iter().sum();
            for p in &mut row {
                *p /= total;
            }

            model.rows[from.index()][action.index()] = row;
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::seeded;

    #[test]
    fn every_row_is_normalized() {
        let model = TransitionModel::standard();
        for state in MacroState::ALL {
            for action in DirectorAction::ALL {
                let sum: f32 = model.distribution(state, action).iter().sum();
                assert!((sum - 1.0).abs() < 1e-5, "{state} {action} sums to {sum}");
            }
        }
    }

    #[test]
    fn remainder_goes_to_self_loop() {
        let model = TransitionModel::builder()
            .row(
                MacroState::Neutral,
                DirectorAction::SpawnEnemies,
                &[(MacroState::Tense, 0.25)],
            )
            .build()
            .unwrap();

        let row = model.distribution(MacroState::Neutral, DirectorAction::SpawnEnemies);
        assert!((row[MacroState::Tense.index()] - 0.25).abs() < 1e-6);
        assert!((row[MacroState::Neutral.index()] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn overfull_rows_are_normalized() {
        let model = TransitionModel::builder()
            .row(
                MacroState::Tense,
                DirectorAction::AdjustLoot,
                &[(MacroState::Relaxed, 1.0), (MacroState::Neutral, 1.0)],
            )
            .build()
            .unwrap();

        let row = model.distribution(MacroState::Tense, DirectorAction::AdjustLoot);
        assert!((row[MacroState::Relaxed.index()] - 0.5).abs() < 1e-6);
        assert!((row[MacroState::Neutral.index()] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unspecified_rows_self_loop() {
        let model = TransitionModel::builder().build().unwrap();
        let mut rng = seeded(3);
        for state in MacroState::ALL {
            assert_eq!(model.sample(state, DirectorAction::AdjustCurse, &mut rng), state);
        }
    }

    #[test]
    fn rejects_nan_and_duplicates() {
        let nan = TransitionModel::builder()
            .row(
                MacroState::Relaxed,
                DirectorAction::TriggerEvent,
                &[(MacroState::Tense, f32::NAN)],
            )
            .build();
        assert!(matches!(nan, Err(TransitionError::NonFinite { .. })));

        let dup = TransitionModel::builder()
            .row(MacroState::Relaxed, DirectorAction::TriggerEvent, &[])
            .row(MacroState::Relaxed, DirectorAction::TriggerEvent, &[])
            .build();
        assert!(matches!(dup, Err(TransitionError::DuplicateRow { .. })));
    }

    #[test]
    fn sampling_only_reaches_supported_states() {
        let model = TransitionModel::standard();
        let mut rng = seeded(11);
        for _ in 0..500 {
            let next = model.sample(MacroState::Suffering, DirectorAction::TriggerEvent, &mut rng);
            assert!(matches!(next, MacroState::Suffering | MacroState::Tense));
        }
    }
}
