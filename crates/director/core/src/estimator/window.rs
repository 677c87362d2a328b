//! Time-bounded event window and exponential smoothing primitives.

use std::collections::VecDeque;

/// Timestamped samples kept for a fixed trailing duration.
///
/// The running sum is maintained incrementally, so pushes and prunes are O(1)
/// amortized.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    span: f32,
    events: VecDeque<(f32, f32)>,
    sum: f32,
}

impl RollingWindow {
    pub fn new(span: f32) -> Self {
        Self {
            span,
            events: VecDeque::new(),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, at: f32, value: f32) {
        self.events.push_back((at, value));
        self.sum += value;
    }

    /// Drops every event older than `now - span`.
    pub fn prune(&mut self, now: f32) {
        let cutoff = now - self.span;
        while let Some(&(at, value)) = self.events.front() {
            if at >= cutoff {
                break;
            }
            self.events.pop_front();
            self.sum -= value;
        }
        if self.events.is_empty() {
            // Resync so float drift never accumulates across lulls.
            self.sum = 0.0;
        }
    }

    /// Window sum divided by the window length.
    pub fn rate(&self) -> f32 {
        (self.sum / self.span).max(0.0)
    }

    pub fn sum(&self) -> f32 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.sum = 0.0;
    }
}

/// Exponential moving average with a collapse floor.
///
/// A zero estimate is reseeded from the next sample instead of being smoothed
/// up from nothing.
#[derive(Clone, Copy, Debug)]
pub struct Ema {
    alpha: f32,
    value: f32,
}

impl Ema {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: 0.0,
        }
    }

    /// Folds in `sample`, then clamps the estimate to at least `floor` and 0.
    pub fn update(&mut self, sample: f32, floor: f32) -> f32 {
        if self.value == 0.0 {
            self.value = sample;
        }
        self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        self.value = self.value.max(floor).max(0.0);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_prunes_old_events() {
        let mut window = RollingWindow::new(15.0);
        window.push(0.0, 30.0);
        window.push(10.0, 15.0);

        window.prune(14.0);
        assert_eq!(window.len(), 2);
        assert!((window.rate() - 3.0).abs() < 1e-6);

        window.prune(20.0);
        assert_eq!(window.len(), 1);
        assert!((window.rate() - 1.0).abs() < 1e-6);

        window.prune(40.0);
        assert!(window.is_empty());
        assert_eq!(window.sum(), 0.0);
    }

    #[test]
    fn ema_seeds_from_first_sample() {
        let mut ema = Ema::new(0.3);
        assert_eq!(ema.update(10.0, 0.0), 10.0);

        let next = ema.update(20.0, 0.0);
        assert!((next - 13.0).abs() < 1e-5);
    }

    #[test]
    fn ema_respects_floor() {
        let mut ema = Ema::new(0.5);
        ema.update(10.0, 0.0);
        assert_eq!(ema.update(0.0, 8.0), 8.0);
        assert_eq!(ema.update(-50.0, -10.0), 0.0);
    }
}
