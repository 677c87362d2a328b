//! Director configuration constants and tunable parameters.
//!
//! Every component owns a small config struct with `DEFAULT_*` associated
//! constants, a `new()` that applies them, and a `validate()` that rejects
//! values outside their meaningful range. [`DirectorConfig`] aggregates them so
//! a single TOML file can tune a whole director instance.
//!
//! The calibration numbers (reward centering, escalation thresholds, blend
//! bands) are kept here as named fields instead of literals scattered through
//! the algorithms.

use bitflags::bitflags;
use thiserror::Error;

use crate::error::{DirectorError, ErrorSeverity};

/// Configuration validation failures.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("{field} must be strictly positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be at least 1")]
    ZeroCapacity { field: &'static str },
}

impl DirectorError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "CONFIG_OUT_OF_RANGE",
            Self::NonPositive { .. } => "CONFIG_NON_POSITIVE",
            Self::ZeroCapacity { .. } => "CONFIG_ZERO_CAPACITY",
        }
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Top-level configuration for one director instance.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DirectorConfig {
    pub estimator: EstimatorConfig,
    pub mdp: MdpConfig,
    pub policy: PolicyConfig,
    pub cache: CacheConfig,
    pub coordinator: CoordinatorConfig,
}

impl DirectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every nested section, returning the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.estimator.validate()?;
        self.mdp.validate()?;
        self.policy.validate()?;
        self.cache.validate()?;
        self.coordinator.validate()
    }
}

/// Telemetry aggregation and forecasting parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EstimatorConfig {
    /// Length of the rolling telemetry window in seconds.
    pub window_secs: f32,
    /// Length of the movement sample window in seconds.
    pub movement_window_secs: f32,
    /// Seconds between movement input samples.
    pub movement_sample_interval: f32,
    pub dps_alpha: f32,
    pub damage_alpha: f32,
    pub kill_alpha: f32,
    /// Weight of the rolling rate in the EMA input; the session rate gets the rest.
    pub rolling_weight: f32,
    /// Predictions never fall below `session_rate * prediction_floor_fraction`.
    pub prediction_floor_fraction: f32,
    /// Number of past predictions kept for diagnostics.
    pub history_len: usize,
}

impl EstimatorConfig {
    pub const DEFAULT_WINDOW_SECS: f32 = 15.0;
    pub const DEFAULT_MOVEMENT_WINDOW_SECS: f32 = 5.0;
    pub const DEFAULT_MOVEMENT_SAMPLE_INTERVAL: f32 = 0.1;
    pub const DEFAULT_ALPHA: f32 = 0.3;
    pub const DEFAULT_ROLLING_WEIGHT: f32 = 0.7;
    pub const DEFAULT_PREDICTION_FLOOR_FRACTION: f32 = 0.5;
    pub const DEFAULT_HISTORY_LEN: usize = 10;

    pub fn new() -> Self {
        Self {
            window_secs: Self::DEFAULT_WINDOW_SECS,
            movement_window_secs: Self::DEFAULT_MOVEMENT_WINDOW_SECS,
            movement_sample_interval: Self::DEFAULT_MOVEMENT_SAMPLE_INTERVAL,
            dps_alpha: Self::DEFAULT_ALPHA,
            damage_alpha: Self::DEFAULT_ALPHA,
            kill_alpha: Self::DEFAULT_ALPHA,
            rolling_weight: Self::DEFAULT_ROLLING_WEIGHT,
            prediction_floor_fraction: Self::DEFAULT_PREDICTION_FLOOR_FRACTION,
            history_len: Self::DEFAULT_HISTORY_LEN,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("estimator.window_secs", self.window_secs)?;
        check_positive("estimator.movement_window_secs", self.movement_window_secs)?;
        check_positive(
            "estimator.movement_sample_interval",
            self.movement_sample_interval,
        )?;
        check_unit("estimator.dps_alpha", self.dps_alpha)?;
        check_unit("estimator.damage_alpha", self.damage_alpha)?;
        check_unit("estimator.kill_alpha", self.kill_alpha)?;
        check_unit("estimator.rolling_weight", self.rolling_weight)?;
        check_unit(
            "estimator.prediction_floor_fraction",
            self.prediction_floor_fraction,
        )?;
        if self.history_len == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "estimator.history_len",
            });
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant terms of the macro-director reward function.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardWeights {
    pub neutral_bonus: f32,
    pub tense_bonus: f32,
    /// Applied (as a negative) when the next state is Dominating or Suffering.
    pub extreme_penalty: f32,
    pub loot_match_bonus: f32,
    pub loot_default_bonus: f32,
    pub spawn_base: f32,
    pub event_base: f32,
    pub loot_base: f32,
    pub flat_cost: f32,
}

impl RewardWeights {
    pub const DEFAULT_NEUTRAL_BONUS: f32 = 3.5;
    pub const DEFAULT_TENSE_BONUS: f32 = 5.0;
    pub const DEFAULT_EXTREME_PENALTY: f32 = 4.0;
    pub const DEFAULT_LOOT_MATCH_BONUS: f32 = 6.0;
    pub const DEFAULT_LOOT_DEFAULT_BONUS: f32 = 2.0;
    pub const DEFAULT_SPAWN_BASE: f32 = 4.0;
    pub const DEFAULT_EVENT_BASE: f32 = 3.5;
    pub const DEFAULT_LOOT_BASE: f32 = 4.0;
    pub const DEFAULT_FLAT_COST: f32 = 0.2;

    pub fn new() -> Self {
        Self {
            neutral_bonus: Self::DEFAULT_NEUTRAL_BONUS,
            tense_bonus: Self::DEFAULT_TENSE_BONUS,
            extreme_penalty: Self::DEFAULT_EXTREME_PENALTY,
            loot_match_bonus: Self::DEFAULT_LOOT_MATCH_BONUS,
            loot_default_bonus: Self::DEFAULT_LOOT_DEFAULT_BONUS,
            spawn_base: Self::DEFAULT_SPAWN_BASE,
            event_base: Self::DEFAULT_EVENT_BASE,
            loot_base: Self::DEFAULT_LOOT_BASE,
            flat_cost: Self::DEFAULT_FLAT_COST,
        }
    }
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self::new()
    }
}

/// Macro-director planner parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MdpConfig {
    /// Discount applied to the best immediate reward of the sampled next state.
    pub gamma: f32,
    /// Seconds a differing observed state must persist before it is committed.
    pub confirm_secs: f32,
    /// Group reward considered "on target" when blending with the group policy.
    pub blend_neutral: f32,
    /// Half-width of the dead band around `blend_neutral`.
    pub blend_band: f32,
    /// Curse nudge applied when the group reward leaves the dead band.
    pub blend_curse_nudge: f32,
    /// Seed for transition sampling and difficulty rolls.
    pub seed: u64,
    pub rewards: RewardWeights,
}

impl MdpConfig {
    pub const DEFAULT_GAMMA: f32 = 0.9;
    pub const DEFAULT_CONFIRM_SECS: f32 = 0.8;
    pub const DEFAULT_BLEND_NEUTRAL: f32 = 10.0;
    pub const DEFAULT_BLEND_BAND: f32 = 2.0;
    pub const DEFAULT_BLEND_CURSE_NUDGE: f32 = 0.1;
    pub const DEFAULT_SEED: u64 = 0x00d1_7ec7;

    pub fn new() -> Self {
        Self {
            gamma: Self::DEFAULT_GAMMA,
            confirm_secs: Self::DEFAULT_CONFIRM_SECS,
            blend_neutral: Self::DEFAULT_BLEND_NEUTRAL,
            blend_band: Self::DEFAULT_BLEND_BAND,
            blend_curse_nudge: Self::DEFAULT_BLEND_CURSE_NUDGE,
            seed: Self::DEFAULT_SEED,
            rewards: RewardWeights::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("mdp.gamma", self.gamma)?;
        check_positive("mdp.confirm_secs", self.confirm_secs)?;
        check_positive("mdp.blend_band", self.blend_band)
    }
}

impl Default for MdpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Group-behavior bandit parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolicyConfig {
    /// Rewards are divided by this before clamping to [-1, 1].
    pub reward_scale: f32,
    pub min_learning_rate: f32,
    pub max_learning_rate: f32,
    /// Added to every weight after an update; keeps all weights positive.
    pub exploration_bias: f32,
    /// Relative improvement a sampled behavior needs over the last stable one.
    pub stability_threshold: f32,
    /// Denominator floor when computing relative improvement.
    pub stability_floor: f32,
    /// Initial weight of a behavior first seen during an update.
    pub unknown_behavior_weight: f32,
    pub seed: u64,
}

impl PolicyConfig {
    pub const DEFAULT_REWARD_SCALE: f32 = 20.0;
    pub const DEFAULT_MIN_LEARNING_RATE: f32 = 0.15;
    pub const DEFAULT_MAX_LEARNING_RATE: f32 = 0.5;
    pub const DEFAULT_EXPLORATION_BIAS: f32 = 0.02;
    pub const DEFAULT_STABILITY_THRESHOLD: f32 = 0.1;
    pub const DEFAULT_STABILITY_FLOOR: f32 = 0.01;
    pub const DEFAULT_UNKNOWN_BEHAVIOR_WEIGHT: f32 = 0.01;
    pub const DEFAULT_SEED: u64 = 0x0b4d_17a5;

    pub fn new() -> Self {
        Self {
            reward_scale: Self::DEFAULT_REWARD_SCALE,
            min_learning_rate: Self::DEFAULT_MIN_LEARNING_RATE,
            max_learning_rate: Self::DEFAULT_MAX_LEARNING_RATE,
            exploration_bias: Self::DEFAULT_EXPLORATION_BIAS,
            stability_threshold: Self::DEFAULT_STABILITY_THRESHOLD,
            stability_floor: Self::DEFAULT_STABILITY_FLOOR,
            unknown_behavior_weight: Self::DEFAULT_UNKNOWN_BEHAVIOR_WEIGHT,
            seed: Self::DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("policy.reward_scale", self.reward_scale)?;
        check_unit("policy.min_learning_rate", self.min_learning_rate)?;
        check_unit("policy.max_learning_rate", self.max_learning_rate)?;
        if self.max_learning_rate < self.min_learning_rate {
            return Err(ConfigError::OutOfRange {
                field: "policy.max_learning_rate",
                value: self.max_learning_rate,
                min: self.min_learning_rate,
                max: 1.0,
            });
        }
        check_positive("policy.exploration_bias", self.exploration_bias)?;
        check_positive("policy.stability_floor", self.stability_floor)?;
        check_positive(
            "policy.unknown_behavior_weight",
            self.unknown_behavior_weight,
        )
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Spatial grid cache parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
    pub cell_size: f32,
    pub separation_radius: f32,
    /// Distance floor for inverse-distance weighting.
    pub min_distance: f32,
    /// `nearby_count` stops counting once it reaches this value.
    pub nearby_cap: usize,
    /// Fraction of the way the cluster center is pulled toward the anchor.
    pub anchor_pull: f32,
}

impl CacheConfig {
    pub const DEFAULT_CELL_SIZE: f32 = 8.0;
    pub const DEFAULT_SEPARATION_RADIUS: f32 = 3.0;
    pub const DEFAULT_MIN_DISTANCE: f32 = 0.1;
    pub const DEFAULT_NEARBY_CAP: usize = 3;
    pub const DEFAULT_ANCHOR_PULL: f32 = 0.3;

    pub fn new() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            separation_radius: Self::DEFAULT_SEPARATION_RADIUS,
            min_distance: Self::DEFAULT_MIN_DISTANCE,
            nearby_cap: Self::DEFAULT_NEARBY_CAP,
            anchor_pull: Self::DEFAULT_ANCHOR_PULL,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("cache.cell_size", self.cell_size)?;
        check_positive("cache.separation_radius", self.separation_radius)?;
        // Separation only scans the 3x3 cells around an agent.
        if self.separation_radius > self.cell_size {
            return Err(ConfigError::OutOfRange {
                field: "cache.separation_radius",
                value: self.separation_radius,
                min: 0.0,
                max: self.cell_size,
            });
        }
        check_positive("cache.min_distance", self.min_distance)?;
        check_unit("cache.anchor_pull", self.anchor_pull)?;
        if self.nearby_cap == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "cache.nearby_cap",
            });
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

bitflags! {
    /// Periodic coordinator tasks. A cleared flag skips the task entirely.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct TaskFlags: u8 {
        const CACHE = 1 << 0;
        const MDP = 1 << 1;
        const GROUP_REWARD = 1 << 2;
        const GROUP_BEHAVIOR = 1 << 3;
        /// Late-game curse ramp.
        const LATE_CURSE = 1 << 4;
    }
}

impl TaskFlags {
    /// True when the macro planner should blend with the group policy.
    pub fn is_combined(self) -> bool {
        self.contains(Self::GROUP_REWARD | Self::GROUP_BEHAVIOR)
    }
}

impl Default for TaskFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Scheduling and cross-blending parameters for the tactical coordinator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoordinatorConfig {
    pub cache_interval: f32,
    pub mdp_interval: f32,
    pub reward_interval: f32,
    pub behavior_interval: f32,
    /// EMA factor for both the blended MDP reward and the group reward.
    pub smoothing_alpha: f32,
    /// Weight of the smoothed group reward when blended into the MDP reward.
    pub group_blend_weight: f32,
    pub escalation_rate: f32,
    /// Smoothed reward magnitude that moves the escalation scalar.
    pub escalation_threshold: f32,
    /// Share of the escalation scalar added to the directive curse.
    pub escalation_curse_weight: f32,
    /// Dominating is reinterpreted as Neutral above this group reward.
    pub dominating_release: f32,
    /// Suffering is reinterpreted as Neutral below this group reward.
    pub suffering_release: f32,
    /// Relaxed is reinterpreted as Tense above this group reward.
    pub relaxed_to_tense: f32,
    /// Tense is reinterpreted as Relaxed below this group reward.
    pub tense_to_relaxed: f32,
    /// Group reward per alive agent per second of reward interval.
    pub survival_reward_rate: f32,
    pub hit_reward: f32,
    pub death_penalty: f32,
    /// Session time after which the late-game curse ramp starts.
    pub late_curse_start_secs: f32,
    pub late_curse_interval: f32,
    pub late_curse_increment: f32,
    pub tasks: TaskFlags,
}

impl CoordinatorConfig {
    pub const DEFAULT_CACHE_INTERVAL: f32 = 0.5;
    pub const DEFAULT_MDP_INTERVAL: f32 = 0.8;
    pub const DEFAULT_REWARD_INTERVAL: f32 = 2.0;
    pub const DEFAULT_BEHAVIOR_INTERVAL: f32 = 2.0;
    pub const DEFAULT_SMOOTHING_ALPHA: f32 = 0.2;
    pub const DEFAULT_GROUP_BLEND_WEIGHT: f32 = 0.5;
    pub const DEFAULT_ESCALATION_RATE: f32 = 0.01;
    pub const DEFAULT_ESCALATION_THRESHOLD: f32 = 0.5;
    pub const DEFAULT_ESCALATION_CURSE_WEIGHT: f32 = 0.5;
    pub const DEFAULT_DOMINATING_RELEASE: f32 = 10.0;
    pub const DEFAULT_SUFFERING_RELEASE: f32 = -10.0;
    pub const DEFAULT_RELAXED_TO_TENSE: f32 = 5.6;
    pub const DEFAULT_TENSE_TO_RELAXED: f32 = -5.6;
    pub const DEFAULT_SURVIVAL_REWARD_RATE: f32 = 0.05;
    pub const DEFAULT_HIT_REWARD: f32 = 1.0;
    pub const DEFAULT_DEATH_PENALTY: f32 = 2.0;
    pub const DEFAULT_LATE_CURSE_START_SECS: f32 = 480.0;
    pub const DEFAULT_LATE_CURSE_INTERVAL: f32 = 10.0;
    pub const DEFAULT_LATE_CURSE_INCREMENT: f32 = 0.05;

    pub fn new() -> Self {
        Self {
            cache_interval: Self::DEFAULT_CACHE_INTERVAL,
            mdp_interval: Self::DEFAULT_MDP_INTERVAL,
            reward_interval: Self::DEFAULT_REWARD_INTERVAL,
            behavior_interval: Self::DEFAULT_BEHAVIOR_INTERVAL,
            smoothing_alpha: Self::DEFAULT_SMOOTHING_ALPHA,
            group_blend_weight: Self::DEFAULT_GROUP_BLEND_WEIGHT,
            escalation_rate: Self::DEFAULT_ESCALATION_RATE,
            escalation_threshold: Self::DEFAULT_ESCALATION_THRESHOLD,
            escalation_curse_weight: Self::DEFAULT_ESCALATION_CURSE_WEIGHT,
            dominating_release: Self::DEFAULT_DOMINATING_RELEASE,
            suffering_release: Self::DEFAULT_SUFFERING_RELEASE,
            relaxed_to_tense: Self::DEFAULT_RELAXED_TO_TENSE,
            tense_to_relaxed: Self::DEFAULT_TENSE_TO_RELAXED,
            survival_reward_rate: Self::DEFAULT_SURVIVAL_REWARD_RATE,
            hit_reward: Self::DEFAULT_HIT_REWARD,
            death_penalty: Self::DEFAULT_DEATH_PENALTY,
            late_curse_start_secs: Self::DEFAULT_LATE_CURSE_START_SECS,
            late_curse_interval: Self::DEFAULT_LATE_CURSE_INTERVAL,
            late_curse_increment: Self::DEFAULT_LATE_CURSE_INCREMENT,
            tasks: TaskFlags::all(),
        }
    }

    pub fn with_tasks(mut self, tasks: TaskFlags) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("coordinator.cache_interval", self.cache_interval)?;
        check_positive("coordinator.mdp_interval", self.mdp_interval)?;
        check_positive("coordinator.reward_interval", self.reward_interval)?;
        check_positive("coordinator.behavior_interval", self.behavior_interval)?;
        check_positive("coordinator.late_curse_interval", self.late_curse_interval)?;
        check_unit("coordinator.smoothing_alpha", self.smoothing_alpha)?;
        check_unit("coordinator.group_blend_weight", self.group_blend_weight)?;
        check_unit("coordinator.escalation_rate", self.escalation_rate)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
