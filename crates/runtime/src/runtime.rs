//! High-level runtime orchestrator.
//!
//! The runtime owns the director worker, wires up command and event channels,
//! and exposes a builder-based API for hosts to drive the director.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use director_content::BehaviorTableLoader;
use director_core::{CandidateTable, DirectorConfig, GroupBehavior, env::seeded};

use crate::api::{DirectorHandle, Result, RuntimeError};
use crate::collaborators::AgentRoster;
use crate::coordinator::TacticalCoordinator;
use crate::events::{Event, EventBus, Topic};
use crate::repository::ProfileRepository;
use crate::workers::{Command, DirectorWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub director: DirectorConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Repository slot the player profile is saved under.
    pub profile_slot: String,
}

impl RuntimeConfig {
    pub const DEFAULT_PROFILE_SLOT: &'static str = "default";
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            director: DirectorConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            profile_slot: Self::DEFAULT_PROFILE_SLOT.to_string(),
        }
    }
}

/// Main runtime that hosts one director
///
/// Design: Runtime owns the worker task.
/// [`DirectorHandle`] provides a cloneable façade for clients.
pub struct DirectorRuntime {
    handle: DirectorHandle,
    worker_handle: JoinHandle<()>,
}

impl DirectorRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> DirectorHandle {
        self.handle.clone()
    }

    /// Subscribe to events from one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker exits once every outstanding handle clone is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`DirectorRuntime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    candidates: Option<CandidateTable>,
    repository: Option<Arc<dyn ProfileRepository>>,
    default_behavior: GroupBehavior,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            candidates: None,
            repository: None,
            default_behavior: GroupBehavior::default(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the director configuration
    pub fn director_config(mut self, director: DirectorConfig) -> Self {
        self.config.director = director;
        self
    }

    /// Candidate behaviors per policy key. Defaults to the embedded table.
    pub fn candidates(mut self, candidates: CandidateTable) -> Self {
        self.candidates = Some(candidates);
        self
    }

    /// Persist profiles across runs
    pub fn repository(mut self, repository: Arc<dyn ProfileRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Behavior newly registered agents start with
    pub fn default_behavior(mut self, behavior: GroupBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    /// Build the runtime and spawn its worker
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<DirectorRuntime> {
        let candidates = match self.candidates {
            Some(candidates) => candidates,
            None => BehaviorTableLoader::embedded()
                .map_err(|e| RuntimeError::Content(format!("{:#}", e)))?,
        };

        let director = self.config.director;
        // Upgrade draws get their own stream so they never shift planner samples.
        let rng = seeded(director.mdp.seed.rotate_left(32) ^ director.policy.seed);
        let coordinator = TacticalCoordinator::new(director, candidates)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = DirectorHandle::new(command_tx, event_bus.clone());

        let worker = DirectorWorker::new(
            coordinator,
            AgentRoster::new().with_default_behavior(self.default_behavior),
            rng,
            self.repository,
            self.config.profile_slot,
            command_rx,
            event_bus,
        );

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        tracing::info!("DirectorRuntime: worker spawned");

        Ok(DirectorRuntime {
            handle,
            worker_handle,
        })
    }
}
