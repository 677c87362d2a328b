//! Runtime orchestration for the adaptive-difficulty director.
//!
//! This crate wires the pure `director-core` components into a running
//! service: a [`TacticalCoordinator`] that schedules every periodic task, the
//! in-memory collaborators it pushes side effects into, profile repositories,
//! and a worker task driven through [`DirectorHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`coordinator`] schedules the director tasks inside one tick
//! - [`collaborators`] provides the curse, loot, queue and agent sinks
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`repository`] persists player profiles between runs
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod collaborators;
pub mod coordinator;
pub mod events;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{DirectorHandle, DirectorSnapshot, PendingRequests, Result, RuntimeError};
pub use collaborators::{
    AgentRoster, CurseLedger, EventLog, LootTable, QueuedRequest, Upgrade, UpgradeOffer, WaveLog,
};
pub use coordinator::{TacticalCoordinator, TickReport};
pub use events::{AgentEvent, DirectorEvent, Event, EventBus, Topic};
pub use repository::{
    FileProfileRepository, InMemoryProfileRepository, ProfileRepository, RepositoryError,
};
pub use runtime::{DirectorRuntime, RuntimeBuilder, RuntimeConfig};
