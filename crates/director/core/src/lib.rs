//! Adaptive-difficulty director logic shared by the runtime and offline tools.
//!
//! `director-core` holds the pure control components: the player-state
//! estimator, the macro-state planner ([`mdp::DirectorMdp`]), the group-behavior
//! bandit ([`policy::BehaviorPolicyTable`]) and the spatial agent cache. They
//! never perform I/O; everything outside the director is reached through the
//! traits in [`env`], and every component advances on an explicit `tick`.
pub mod config;
pub mod env;
pub mod error;
pub mod estimator;
pub mod mdp;
pub mod policy;
pub mod profile;
pub mod spatial;

pub use config::{
    CacheConfig, ConfigError, CoordinatorConfig, DirectorConfig, EstimatorConfig, MdpConfig,
    PolicyConfig, RewardWeights, TaskFlags,
};
pub use env::{
    AgentId, AgentRegistry, AgentSnapshot, CurseSink, Difficulty, DirectorRng, Effects,
    EventQueue, LootBiasSink, PlayerTelemetrySource, TelemetryEvent, TelemetrySnapshot, WaveQueue,
};
pub use error::{DirectorError, ErrorSeverity};
pub use estimator::PlayerStateEstimator;
pub use mdp::{
    ConfirmationFilter, DirectorAction, DirectorMdp, Directive, LootBias, MacroState,
    RewardModel, StepOutcome, TransitionError, TransitionModel, WaveType,
};
pub use policy::{
    ActionWeights, BehaviorPolicyTable, CandidateTable, CandidateTableError, GroupBehavior,
    PolicyKey,
};
pub use profile::{
    CategoryTally, InventoryProfile, ItemCategory, MovementStyle, PlayerProfile, Playstyle,
    Rarity, TimePhase,
};
pub use spatial::SpatialAgentCache;
