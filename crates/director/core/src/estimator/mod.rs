//! Player telemetry aggregation and short-term forecasting.
//!
//! The estimator folds pushed [`TelemetryEvent`]s into rolling windows and
//! lifetime totals, then on every [`PlayerStateEstimator::tick`] rebuilds the
//! [`PlayerProfile`]: rolling and session rates, EMA forecasts, playstyle,
//! time phase, movement style and item preferences.
//!
//! # Design
//!
//! - **Hybrid forecast**: the EMA input is `w * rolling + (1 - w) * session`,
//!   so a quiet window pulls the forecast down without erasing session history.
//! - **Collapse floor**: forecasts never drop below
//!   `prediction_floor_fraction * session_rate` during lulls.
//! - **Never fails**: missing inputs leave neutral defaults (Balanced, Static,
//!   full HP) in place.

mod movement;
mod window;

pub use movement::MovementTracker;
pub use window::{Ema, RollingWindow};

use std::collections::VecDeque;

use tracing::debug;

use crate::config::EstimatorConfig;
use crate::env::{PlayerTelemetrySource, TelemetryEvent};
use crate::profile::{ItemCategory, MovementStyle, PlayerProfile, Playstyle, Rarity, TimePhase};

/// Rolling/session telemetry aggregator that owns the run's [`PlayerProfile`].
#[derive(Clone, Debug)]
pub struct PlayerStateEstimator {
    config: EstimatorConfig,
    profile: PlayerProfile,
    elapsed: f32,
    has_signal: bool,

    damage_taken: RollingWindow,
    damage_dealt: RollingWindow,
    kills: RollingWindow,

    total_damage_taken: f32,
    total_damage_dealt: f32,
    total_kills: u32,
    total_ttk: f32,

    dps_forecast: Ema,
    damage_forecast: Ema,
    kps_forecast: Ema,

    movement: MovementTracker,
    dps_history: VecDeque<f32>,
    damage_history: VecDeque<f32>,

    carried: Option<PlayerProfile>,
}

impl PlayerStateEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            profile: PlayerProfile::new(),
            elapsed: 0.0,
            has_signal: false,
            damage_taken: RollingWindow::new(config.window_secs),
            damage_dealt: RollingWindow::new(config.window_secs),
            kills: RollingWindow::new(config.window_secs),
            total_damage_taken: 0.0,
            total_damage_dealt: 0.0,
            total_kills: 0,
            total_ttk: 0.0,
            dps_forecast: Ema::new(config.dps_alpha),
            damage_forecast: Ema::new(config.damage_alpha),
            kps_forecast: Ema::new(config.kill_alpha),
            movement: MovementTracker::new(
                config.movement_window_secs,
                config.movement_sample_interval,
            ),
            dps_history: VecDeque::with_capacity(config.history_len),
            damage_history: VecDeque::with_capacity(config.history_len),
            carried: None,
            config,
        }
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// Session seconds advanced through [`tick`](Self::tick).
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether the last tick received usable HP telemetry.
    pub fn has_signal(&self) -> bool {
        self.has_signal
    }

    pub fn dps_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.dps_history.iter().copied()
    }

    pub fn damage_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.damage_history.iter().copied()
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::DamageTaken(amount) => self.record_damage_taken(amount),
            TelemetryEvent::DamageDealt(amount) => self.record_damage_dealt(amount),
            TelemetryEvent::Kill { ttk } => self.record_kill(ttk),
            TelemetryEvent::ItemPicked { category, rarity } => self.record_item(category, rarity),
        }
    }

    pub fn record_damage_taken(&mut self, amount: f32) {
        if !is_valid_amount(amount) {
            return;
        }
        self.damage_taken.push(self.elapsed, amount);
        self.total_damage_taken += amount;
    }

    pub fn record_damage_dealt(&mut self, amount: f32) {
        if !is_valid_amount(amount) {
            return;
        }
        self.damage_dealt.push(self.elapsed, amount);
        self.total_damage_dealt += amount;
    }

    pub fn record_kill(&mut self, ttk: f32) {
        self.kills.push(self.elapsed, 1.0);
        self.total_kills += 1;
        if ttk.is_finite() && ttk > 0.0 {
            self.total_ttk += ttk;
        }
    }

    /// Tracks an item pickup for favored/predicted category and rarity usage.
    pub fn record_item(&mut self, category: ItemCategory, rarity: Rarity) {
        self.profile.category_usage.add(category, 1);
        self.profile.rarity_usage[rarity as usize] += 1;
        self.profile.predicted_item_category = Some(category);
        self.profile.favored_item_category = self.profile.category_usage.top();
    }

    /// Advances the session clock by `dt` and rebuilds the profile.
    ///
    /// Returns whether this tick carried usable telemetry.
    pub fn tick(&mut self, dt: f32, telemetry: &dyn PlayerTelemetrySource) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        let now = self.elapsed;

        self.damage_taken.prune(now);
        self.damage_dealt.prune(now);
        self.kills.prune(now);

        let hp = telemetry.hp_percent();
        self.has_signal = hp.is_some();
        if let Some(hp) = hp {
            self.profile.hp_percent = hp;
        }

        self.update_rates(now);
        self.update_forecasts();
        self.update_tags(now, dt, telemetry);

        self.has_signal
    }

    fn update_rates(&mut self, now: f32) {
        let profile = &mut self.profile;
        profile.session_time = now;

        profile.rolling_dps = self.damage_dealt.rate();
        profile.rolling_damage_taken = self.damage_taken.rate();
        profile.rolling_kps = self.kills.rate();

        if now > 0.0 {
            profile.session_dps = self.total_damage_dealt / now;
            profile.session_damage_taken = self.total_damage_taken / now;
            profile.session_kps = self.total_kills as f32 / now;
        } else {
            profile.session_dps = 0.0;
            profile.session_damage_taken = 0.0;
            profile.session_kps = 0.0;
        }

        profile.total_kills = self.total_kills;
        profile.avg_ttk = if self.total_kills > 0 {
            self.total_ttk / self.total_kills as f32
        } else {
            0.0
        };
    }

    fn update_forecasts(&mut self) {
        let w = self.config.rolling_weight;
        let floor = self.config.prediction_floor_fraction;
        let profile = &mut self.profile;

        let source = w * profile.rolling_dps + (1.0 - w) * profile.session_dps;
        profile.predicted_dps = self
            .dps_forecast
            .update(source, profile.session_dps * floor);

        let source = w * profile.rolling_damage_taken + (1.0 - w) * profile.session_damage_taken;
        profile.predicted_damage_taken = self
            .damage_forecast
            .update(source, profile.session_damage_taken * floor);

        let source = w * profile.rolling_kps + (1.0 - w) * profile.session_kps;
        profile.predicted_kps = self
            .kps_forecast
            .update(source, profile.session_kps * floor);

        push_bounded(
            &mut self.dps_history,
            profile.predicted_dps,
            self.config.history_len,
        );
        push_bounded(
            &mut self.damage_history,
            profile.predicted_damage_taken,
            self.config.history_len,
        );
    }

    fn update_tags(&mut self, now: f32, dt: f32, telemetry: &dyn PlayerTelemetrySource) {
        let profile = &mut self.profile;
        profile.time_phase = TimePhase::classify(now);
        profile.playstyle = Playstyle::classify(
            profile.avg_ttk,
            profile.rolling_damage_taken,
            profile.session_dps,
        );

        if self.movement.tick(now, dt, telemetry.movement_input()) {
            profile.movement = self.movement.style();
            profile.avg_move_speed = self.movement.avg_speed();
            profile.avg_move_dir = self.movement.avg_dir();
        }
    }

    /// Current movement classification.
    pub fn classify_movement(&self) -> MovementStyle {
        self.movement.style()
    }

    /// Starts a new run, optionally continuing from the profile kept by the
    /// last [`end_run`](Self::end_run) (or an externally loaded one).
    ///
    /// Counters, windows and forecasts always reset; only the profile carries.
    pub fn start_run(&mut self, continue_from_previous: bool) {
        let carried = if continue_from_previous {
            self.carried.take()
        } else {
            None
        };
        self.reset_counters();
        self.profile = carried.unwrap_or_default();
        debug!(
            continued = self.profile.continued_from_previous,
            replays = self.profile.replay_count,
            "estimator run started"
        );
    }

    /// Ends the current run. With `keep`, the profile is retained for the next
    /// continued run and a copy is returned for persistence.
    pub fn end_run(&mut self, keep: bool) -> Option<PlayerProfile> {
        if !keep {
            self.carried = None;
            return None;
        }
        let mut kept = self.profile.clone();
        kept.continued_from_previous = true;
        kept.replay_count += 1;
        self.carried = Some(kept.clone());
        Some(kept)
    }

    /// Installs a previously persisted profile as the carry-over for the next
    /// continued run.
    pub fn restore(&mut self, profile: PlayerProfile) {
        self.carried = Some(profile);
    }

    fn reset_counters(&mut self) {
        self.elapsed = 0.0;
        self.has_signal = false;
        self.damage_taken.clear();
        self.damage_dealt.clear();
        self.kills.clear();
        self.total_damage_taken = 0.0;
        self.total_damage_dealt = 0.0;
        self.total_kills = 0;
        self.total_ttk = 0.0;
        self.dps_forecast.reset();
        self.damage_forecast.reset();
        self.kps_forecast.reset();
        self.movement.clear();
        self.dps_history.clear();
        self.damage_history.clear();
    }
}

fn is_valid_amount(amount: f32) -> bool {
    amount.is_finite() && amount > 0.0
}

fn push_bounded(queue: &mut VecDeque<f32>, value: f32, capacity: usize) {
    if queue.len() >= capacity {
        queue.pop_front();
    }
    queue.push_back(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::TelemetrySnapshot;
    use glam::Vec2;

    fn full_hp() -> TelemetrySnapshot {
        TelemetrySnapshot::new(100.0, 100.0)
    }

    fn run(estimator: &mut PlayerStateEstimator, secs: f32, telemetry: &TelemetrySnapshot) {
        let steps = (secs / 0.1).round() as usize;
        for _ in 0..steps {
            estimator.tick(0.1, telemetry);
        }
    }

    #[test]
    fn defaults_without_input() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        estimator.tick(0.1, &TelemetrySnapshot::default());

        let profile = estimator.profile();
        assert!(!estimator.has_signal());
        assert_eq!(profile.hp_percent, 1.0);
        assert_eq!(profile.playstyle, Playstyle::Defensive);
        assert_eq!(profile.movement, MovementStyle::Static);
        assert_eq!(profile.predicted_dps, 0.0);
    }

    #[test]
    fn rolling_rate_uses_window_length() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        run(&mut estimator, 1.0, &full_hp());
        estimator.record_damage_dealt(150.0);
        estimator.tick(0.1, &full_hp());

        assert!((estimator.profile().rolling_dps - 10.0).abs() < 1e-4);
    }

    #[test]
    fn rolling_rate_decays_after_window() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        estimator.record_damage_dealt(150.0);
        run(&mut estimator, 16.0, &full_hp());

        let profile = estimator.profile();
        assert_eq!(profile.rolling_dps, 0.0);
        assert!(profile.session_dps > 0.0);
    }

    #[test]
    fn forecast_never_drops_below_floor() {
        let config = EstimatorConfig::default();
        let floor_fraction = config.prediction_floor_fraction;
        let mut estimator = PlayerStateEstimator::new(config);

        for _ in 0..50 {
            estimator.record_damage_dealt(20.0);
            estimator.tick(0.1, &full_hp());
        }
        run(&mut estimator, 60.0, &full_hp());

        let profile = estimator.profile();
        assert!(profile.predicted_dps >= profile.session_dps * floor_fraction - 1e-4);
        assert!(profile.predicted_dps > 0.0);
    }

    #[test]
    fn kills_feed_ttk_and_aggressive_playstyle() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        estimator.record_kill(1.0);
        estimator.record_kill(2.0);
        estimator.record_damage_taken(300.0);
        estimator.tick(0.1, &full_hp());

        let profile = estimator.profile();
        assert_eq!(profile.total_kills, 2);
        assert!((profile.avg_ttk - 1.5).abs() < 1e-6);
        assert_eq!(profile.playstyle, Playstyle::Aggressive);
    }

    #[test]
    fn ignores_invalid_amounts() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        estimator.record_damage_taken(-5.0);
        estimator.record_damage_dealt(f32::NAN);
        estimator.tick(1.0, &full_hp());

        assert_eq!(estimator.profile().session_damage_taken, 0.0);
        assert_eq!(estimator.profile().session_dps, 0.0);
    }

    #[test]
    fn hp_and_movement_come_from_telemetry() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        let telemetry = TelemetrySnapshot::new(25.0, 100.0).with_movement(Vec2::new(0.0, 1.0));
        run(&mut estimator, 1.0, &telemetry);

        let profile = estimator.profile();
        assert!((profile.hp_percent - 0.25).abs() < 1e-6);
        assert_eq!(profile.movement, MovementStyle::Aggressive);
        assert_eq!(estimator.classify_movement(), MovementStyle::Aggressive);
    }

    #[test]
    fn item_pickups_drive_category_preferences() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        estimator.record_item(ItemCategory::Survival, Rarity::Common);
        estimator.record_item(ItemCategory::Survival, Rarity::Rare);
        estimator.record_item(ItemCategory::Tactics, Rarity::Common);

        let profile = estimator.profile();
        assert_eq!(profile.favored_item_category, Some(ItemCategory::Survival));
        assert_eq!(profile.predicted_item_category, Some(ItemCategory::Tactics));
        assert_eq!(profile.rarity_count(Rarity::Common), 2);
        assert!(!profile.item_prediction_matches_favorite());
    }

    #[test]
    fn history_is_bounded() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        run(&mut estimator, 5.0, &full_hp());
        assert_eq!(
            estimator.dps_history().count(),
            EstimatorConfig::DEFAULT_HISTORY_LEN
        );
    }

    #[test]
    fn continued_run_carries_profile() {
        let mut estimator = PlayerStateEstimator::new(EstimatorConfig::default());
        estimator.record_item(ItemCategory::Brutality, Rarity::Ssr);
        estimator.record_damage_dealt(100.0);
        run(&mut estimator, 2.0, &full_hp());

        let kept = estimator.end_run(true).expect("profile kept");
        assert_eq!(kept.replay_count, 1);

        estimator.start_run(true);
        assert!(estimator.profile().continued_from_previous);
        assert_eq!(
            estimator.profile().favored_item_category,
            Some(ItemCategory::Brutality)
        );
        assert_eq!(estimator.elapsed(), 0.0);

        estimator.end_run(false);
        estimator.start_run(true);
        assert_eq!(estimator.profile(), &PlayerProfile::new());
    }
}
