//! Cloneable façade for issuing commands to the director worker.
//!
//! [`DirectorHandle`] hides channel plumbing and offers async helpers for
//! ticking the director, reporting gameplay, and streaming events from
//! specific topics.
use glam::Vec2;
use tokio::sync::{broadcast, mpsc, oneshot};

use director_core::{AgentId, PlayerProfile, TaskFlags, TelemetryEvent, TelemetrySnapshot};

use super::errors::{Result, RuntimeError};
use super::snapshot::{DirectorSnapshot, PendingRequests};
use crate::collaborators::UpgradeOffer;
use crate::coordinator::TickReport;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the director
#[derive(Clone)]
pub struct DirectorHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl DirectorHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx)).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Advance the director by `dt` seconds using `telemetry` for the pull
    /// side of this tick.
    pub async fn tick(&self, dt: f32, telemetry: TelemetrySnapshot) -> Result<TickReport> {
        self.request(|reply| Command::Tick {
            dt,
            telemetry,
            reply,
        })
        .await
    }

    /// Report damage, kills or item pickups as they happen
    pub async fn record(&self, event: TelemetryEvent) -> Result<()> {
        self.send(Command::Telemetry { event }).await
    }

    pub async fn register_agent(&self, id: AgentId, position: Vec2) -> Result<()> {
        self.send(Command::RegisterAgent { id, position }).await
    }

    pub async fn unregister_agent(&self, id: AgentId) -> Result<()> {
        self.send(Command::UnregisterAgent { id }).await
    }

    pub async fn move_agent(&self, id: AgentId, position: Vec2) -> Result<()> {
        self.send(Command::MoveAgent { id, position }).await
    }

    /// Report that an agent hit the player
    pub async fn agent_hit(&self, id: AgentId) -> Result<()> {
        self.send(Command::AgentHit { id }).await
    }

    pub async fn agent_death(&self, id: AgentId) -> Result<()> {
        self.send(Command::AgentDeath { id }).await
    }

    /// Start a run. With `continue_from_previous`, the profile kept by the
    /// last run (or the persisted one) is carried over.
    pub async fn start_run(&self, continue_from_previous: bool) -> Result<()> {
        self.request(|reply| Command::StartRun {
            continue_from_previous,
            reply,
        })
        .await?
    }

    /// End the run. With `keep`, the profile is returned and persisted when a
    /// repository is configured.
    pub async fn end_run(&self, keep: bool) -> Result<Option<PlayerProfile>> {
        self.request(|reply| Command::EndRun { keep, reply }).await?
    }

    /// Enable or disable periodic director tasks
    pub async fn set_tasks(&self, tasks: TaskFlags) -> Result<()> {
        self.request(|reply| Command::SetTasks { tasks, reply })
            .await
    }

    /// Query the current director state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<DirectorSnapshot> {
        self.request(|reply| Command::QuerySnapshot { reply }).await
    }

    /// Take every wave and event request issued since the last drain
    pub async fn drain_requests(&self) -> Result<PendingRequests> {
        self.request(|reply| Command::DrainRequests { reply }).await
    }

    /// Draw up to `count` upgrades from `pool`, weighted by the current loot
    /// biases
    pub async fn choose_upgrades(
        &self,
        pool: Vec<UpgradeOffer>,
        count: Option<usize>,
    ) -> Result<Vec<UpgradeOffer>> {
        self.request(|reply| Command::ChooseUpgrades { pool, count, reply })
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Director` - Directives and committed macro-state changes
    /// - `Topic::Agents` - Group behavior broadcasts
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use director_runtime::Topic;
    ///
    /// let mut director_rx = handle.subscribe(Topic::Director);
    /// while let Ok(event) = director_rx.recv().await {
    ///     // Translate directives into spawns and drop tables
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
