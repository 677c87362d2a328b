//! Two-term global difficulty multiplier.

use director_core::CurseSink;

/// Curse state split into a director term, moved in whole steps and never
/// below zero, and a late-game term that only grows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurseLedger {
    step: f32,
    director_bias: f32,
    late_bias: f32,
}

impl CurseLedger {
    /// Each step moves the multiplier by 10%.
    pub const DEFAULT_STEP: f32 = 0.1;

    pub fn new() -> Self {
        Self::with_step(Self::DEFAULT_STEP)
    }

    pub fn with_step(step: f32) -> Self {
        Self {
            step,
            director_bias: 0.0,
            late_bias: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn director_bias(&self) -> f32 {
        self.director_bias
    }

    pub fn late_bias(&self) -> f32 {
        self.late_bias
    }

    /// Sum of both terms.
    pub fn total_bias(&self) -> f32 {
        self.director_bias + self.late_bias
    }

    pub fn reset(&mut self) {
        self.director_bias = 0.0;
        self.late_bias = 0.0;
    }
}

impl Default for CurseLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl CurseSink for CurseLedger {
    fn adjust_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        self.director_bias = (self.director_bias + steps as f32 * self.step).max(0.0);
        tracing::debug!(
            "CurseLedger: director term moved {} steps to {}, multiplier {}",
            steps,
            self.director_bias,
            self.multiplier()
        );
    }

    fn add_bias(&mut self, amount: f32) {
        if !(amount > 0.0) || !amount.is_finite() {
            return;
        }
        self.late_bias += amount;
        tracing::debug!(
            "CurseLedger: late term now {}, multiplier {}",
            self.late_bias,
            self.multiplier()
        );
    }

    fn multiplier(&self) -> f32 {
        1.0 + self.total_bias()
    }
}
