//! Accumulating interval timers for the coordinator tasks.

/// Fires once its accumulated time reaches the interval, then restarts from
/// zero. At most one firing per advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntervalTimer {
    interval: f32,
    elapsed: f32,
}

impl IntervalTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Adds `dt` and reports whether the interval elapsed.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Named timers owned by the coordinator, one per periodic task.
#[derive(Clone, Debug)]
pub struct TaskTimers {
    pub cache: IntervalTimer,
    pub mdp: IntervalTimer,
    pub reward: IntervalTimer,
    pub behavior: IntervalTimer,
    pub late_curse: IntervalTimer,
}

impl TaskTimers {
    pub fn from_config(config: &director_core::CoordinatorConfig) -> Self {
        Self {
            cache: IntervalTimer::new(config.cache_interval),
            mdp: IntervalTimer::new(config.mdp_interval),
            reward: IntervalTimer::new(config.reward_interval),
            behavior: IntervalTimer::new(config.behavior_interval),
            late_curse: IntervalTimer::new(config.late_curse_interval),
        }
    }

    pub fn reset(&mut self) {
        self.cache.reset();
        self.mdp.reset();
        self.reward.reset();
        self.behavior.reset();
        self.late_curse.reset();
    }
}
