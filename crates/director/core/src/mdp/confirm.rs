//! Hysteresis on macro-state changes.
//!
//! A freshly derived state only replaces the committed one after it has been
//! observed continuously for the confirmation interval. Seeing the committed
//! state again, seeing a different candidate, or a clock discontinuity resets
//! the timer.

use super::state::MacroState;

#[derive(Clone, Debug, PartialEq)]
pub struct ConfirmationFilter {
    confirm_secs: f32,
    candidate: Option<Candidate>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    state: MacroState,
    held_for: f32,
}

impl ConfirmationFilter {
    pub fn new(confirm_secs: f32) -> Self {
        Self {
            confirm_secs,
            candidate: None,
        }
    }

    pub fn confirm_secs(&self) -> f32 {
        self.confirm_secs
    }

    /// State currently waiting for confirmation, if any.
    pub fn candidate(&self) -> Option<MacroState> {
        self.candidate.map(|c| c.state)
    }

    /// Feeds one observation taken `dt` seconds after the previous one.
    ///
    /// Returns the state to commit once a candidate has persisted for the
    /// whole confirmation interval.
    pub fn observe(
        &mut self,
        current: MacroState,
        observed: MacroState,
        dt: f32,
    ) -> Option<MacroState> {
        if !dt.is_finite() || dt < 0.0 {
            self.reset();
            return None;
        }

        if observed == current {
            self.candidate = None;
            return None;
        }

        match &mut self.candidate {
            Some(candidate) if candidate.state == observed => {
                candidate.held_for += dt;
                if candidate.held_for >= self.confirm_secs {
                    self.candidate = None;
                    return Some(observed);
                }
                None
            }
            _ => {
                self.candidate = Some(Candidate {
                    state: observed,
                    held_for: 0.0,
                });
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.candidate = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_deviation_commits_once() {
        let mut filter = ConfirmationFilter::new(0.8);
        let mut current = MacroState::Neutral;
        let mut commits = 0;

        for _ in 0..40 {
            if let Some(next) = filter.observe(current, MacroState::Tense, 0.1) {
                current = next;
                commits += 1;
            }
        }

        assert_eq!(commits, 1);
        assert_eq!(current, MacroState::Tense);
    }

    #[test]
    fn commit_waits_for_full_interval() {
        let mut filter = ConfirmationFilter::new(1.0);
        assert_eq!(
            filter.observe(MacroState::Neutral, MacroState::Relaxed, 0.5),
            None
        );
        assert_eq!(
            filter.observe(MacroState::Neutral, MacroState::Relaxed, 0.5),
            None
        );
        assert_eq!(
            filter.observe(MacroState::Neutral, MacroState::Relaxed, 0.5),
            Some(MacroState::Relaxed)
        );
    }

    #[test]
    fn fast_oscillation_never_commits() {
        let mut filter = ConfirmationFilter::new(0.8);
        let sequence = [MacroState::Tense, MacroState::Neutral];
        for i in 0..200 {
            let observed = sequence[i % 2];
            assert_eq!(filter.observe(MacroState::Neutral, observed, 0.3), None);
        }
    }

    #[test]
    fn switching_candidates_restarts_timer() {
        let mut filter = ConfirmationFilter::new(0.8);
        for i in 0..200 {
            let observed = if (i / 2) % 2 == 0 {
                MacroState::Tense
            } else {
                MacroState::Suffering
            };
            assert_eq!(filter.observe(MacroState::Neutral, observed, 0.3), None);
        }
    }

    #[test]
    fn discontinuity_resets_candidate() {
        let mut filter = ConfirmationFilter::new(0.8);
        filter.observe(MacroState::Neutral, MacroState::Tense, 0.1);
        filter.observe(MacroState::Neutral, MacroState::Tense, 0.5);
        assert_eq!(filter.candidate(), Some(MacroState::Tense));

        filter.observe(MacroState::Neutral, MacroState::Tense, f32::NAN);
        assert_eq!(filter.candidate(), None);
    }
}
