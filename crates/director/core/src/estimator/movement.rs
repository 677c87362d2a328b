//! Movement-style classification from sampled input directions.

use std::collections::VecDeque;

use glam::Vec2;

use crate::profile::MovementStyle;

/// Rolling movement samples and the last classification.
#[derive(Clone, Debug)]
pub struct MovementTracker {
    window: f32,
    interval: f32,
    since_sample: f32,
    samples: VecDeque<Sample>,
    latest_speed: f32,
    style: MovementStyle,
    avg_speed: f32,
    avg_dir: Vec2,
}

#[derive(Clone, Copy, Debug)]
struct Sample {
    at: f32,
    dir: Vec2,
    speed: f32,
}

impl MovementTracker {
    /// Inputs at or below this magnitude are not recorded.
    pub const DEAD_ZONE: f32 = 0.01;
    /// Latest speed below this classifies as Static.
    pub const STATIC_SPEED: f32 = 0.05;
    /// Directional variance below this classifies as Aggressive.
    pub const DIRECT_VARIANCE: f32 = 0.2;

    pub fn new(window: f32, interval: f32) -> Self {
        Self {
            window,
            interval,
            since_sample: interval,
            samples: VecDeque::new(),
            latest_speed: 0.0,
            style: MovementStyle::Static,
            avg_speed: 0.0,
            avg_dir: Vec2::ZERO,
        }
    }

    /// Advances the sampling clock and samples `input` when an interval has
    /// elapsed. Returns true when a new classification was produced.
    pub fn tick(&mut self, now: f32, dt: f32, input: Vec2) -> bool {
        self.since_sample += dt;
        if self.since_sample < self.interval {
            return false;
        }
        self.since_sample = 0.0;
        self.sample(now, input);
        true
    }

    fn sample(&mut self, now: f32, input: Vec2) {
        let speed = if input.is_finite() { input.length() } else { 0.0 };
        self.latest_speed = speed;

        if speed > Self::DEAD_ZONE {
            self.samples.push_back(Sample {
                at: now,
                dir: input / speed,
                speed,
            });
        }

        let cutoff = now - self.window;
        while self.samples.front().is_some_and(|s| s.at < cutoff) {
            self.samples.pop_front();
        }

        self.classify();
    }

    fn classify(&mut self) {
        if self.samples.is_empty() {
            self.style = MovementStyle::Static;
            self.avg_speed = 0.0;
            self.avg_dir = Vec2::ZERO;
            return;
        }

        let count = self.samples.len() as f32;
        let (dir_sum, speed_sum) = self
            .samples
            .iter()
            .fold((Vec2::ZERO, 0.0), |(d, s), sample| {
                (d + sample.dir, s + sample.speed)
            });
        let mean_dir = dir_sum.normalize_or_zero();
        let variance = self
            .samples
            .iter()
            .map(|s| 1.0 - s.dir.dot(mean_dir))
            .sum::<f32>()
            / count;

        self.avg_dir = mean_dir;
        self.avg_speed = speed_sum / count;
        self.style = if self.latest_speed < Self::STATIC_SPEED {
            MovementStyle::Static
        } else if variance < Self::DIRECT_VARIANCE {
            MovementStyle::Aggressive
        } else {
            MovementStyle::Erratic
        };
    }

    pub fn style(&self) -> MovementStyle {
        self.style
    }

    pub fn avg_speed(&self) -> f32 {
        self.avg_speed
    }

    pub fn avg_dir(&self) -> Vec2 {
        self.avg_dir
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.window, self.interval);
    }
}
