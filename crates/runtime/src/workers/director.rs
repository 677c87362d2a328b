//! Director worker that owns the [`TacticalCoordinator`] and its collaborators.
//!
//! Receives commands from [`DirectorHandle`](crate::DirectorHandle), applies
//! them in arrival order and publishes director and agent events on the
//! [`EventBus`].

use std::sync::Arc;

use glam::Vec2;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use director_core::{
    AgentId, AgentRegistry, CurseSink, DirectorRng, Effects, LootBiasSink, PlayerProfile,
    TaskFlags, TelemetryEvent, TelemetrySnapshot,
};

use crate::api::{DirectorSnapshot, PendingRequests, Result};
use crate::collaborators::{AgentRoster, CurseLedger, EventLog, LootTable, UpgradeOffer, WaveLog};
use crate::coordinator::{TacticalCoordinator, TickReport};
use crate::events::{AgentEvent, DirectorEvent, EventBus};
use crate::repository::ProfileRepository;

/// Commands that can be sent to the director worker
pub enum Command {
    /// Advance the director by `dt` seconds with fresh telemetry.
    Tick {
        dt: f32,
        telemetry: TelemetrySnapshot,
        reply: oneshot::Sender<TickReport>,
    },
    /// Push-side player telemetry.
    Telemetry { event: TelemetryEvent },
    RegisterAgent { id: AgentId, position: Vec2 },
    UnregisterAgent { id: AgentId },
    MoveAgent { id: AgentId, position: Vec2 },
    /// An agent landed a hit on the player.
    AgentHit { id: AgentId },
    AgentDeath { id: AgentId },
    /// Start a run, optionally continuing the persisted profile.
    StartRun {
        continue_from_previous: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    /// End the run, persisting the profile when `keep` is set.
    EndRun {
        keep: bool,
        reply: oneshot::Sender<Result<Option<PlayerProfile>>>,
    },
    SetTasks {
        tasks: TaskFlags,
        reply: oneshot::Sender<()>,
    },
    /// Query the current director state (read-only).
    QuerySnapshot {
        reply: oneshot::Sender<DirectorSnapshot>,
    },
    /// Take every pending wave and event request.
    DrainRequests {
        reply: oneshot::Sender<PendingRequests>,
    },
    /// Weighted draw from an upgrade pool using the current loot biases.
    ChooseUpgrades {
        pool: Vec<UpgradeOffer>,
        count: Option<usize>,
        reply: oneshot::Sender<Vec<UpgradeOffer>>,
    },
}

/// Background task that processes director commands.
pub struct DirectorWorker {
    coordinator: TacticalCoordinator,
    roster: AgentRoster,
    curse: CurseLedger,
    loot: LootTable,
    waves: WaveLog,
    scripted: EventLog,
    rng: DirectorRng,
    repository: Option<Arc<dyn ProfileRepository>>,
    profile_slot: String,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl DirectorWorker {
    /// Creates a new director worker.
    pub fn new(
        coordinator: TacticalCoordinator,
        roster: AgentRoster,
        rng: DirectorRng,
        repository: Option<Arc<dyn ProfileRepository>>,
        profile_slot: String,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            coordinator,
            roster,
            curse: CurseLedger::new(),
            loot: LootTable::new(),
            waves: WaveLog::new(),
            scripted: EventLog::new(),
            rng,
            repository,
            profile_slot,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Exits once every handle is dropped.
    pub async fn run(mut self) {
        info!("DirectorWorker: started");
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        info!("DirectorWorker: stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Tick {
                dt,
                telemetry,
                reply,
            } => {
                let report = self.tick(dt, &telemetry);
                let _ = reply.send(report);
            }
            Command::Telemetry { event } => self.coordinator.record_telemetry(event),
            Command::RegisterAgent { id, position } => self.roster.register(id, position),
            Command::UnregisterAgent { id } => self.roster.unregister(id),
            Command::MoveAgent { id, position } => {
                if !self.roster.move_to(id, position) {
                    debug!("DirectorWorker: move for unknown {}", id);
                }
            }
            Command::AgentHit { id } => {
                if self.roster.is_alive(id) {
                    self.coordinator.record_agent_hit();
                } else {
                    debug!("DirectorWorker: hit from unknown or dead {}", id);
                }
            }
            Command::AgentDeath { id } => {
                if self.roster.mark_dead(id) {
                    self.coordinator.record_agent_death();
                }
            }
            Command::StartRun {
                continue_from_previous,
                reply,
            } => {
                let result = self.start_run(continue_from_previous);
                let _ = reply.send(result);
            }
            Command::EndRun { keep, reply } => {
                let result = self.end_run(keep);
                let _ = reply.send(result);
            }
            Command::SetTasks { tasks, reply } => {
                self.coordinator.set_tasks(tasks);
                let _ = reply.send(());
            }
            Command::QuerySnapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::DrainRequests { reply } => {
                let _ = reply.send(PendingRequests {
                    waves: self.waves.drain(),
                    events: self.scripted.drain(),
                });
            }
            Command::ChooseUpgrades { pool, count, reply } => {
                let chosen = self
                    .loot
                    .choose_upgrades(&pool, count, &mut self.rng)
                    .into_iter()
                    .cloned()
                    .collect();
                let _ = reply.send(chosen);
            }
        }
    }

    fn tick(&mut self, dt: f32, telemetry: &TelemetrySnapshot) -> TickReport {
        let state_before = self.coordinator.macro_state();
        let mut effects = Effects::none()
            .with_waves(&mut self.waves)
            .with_events(&mut self.scripted)
            .with_loot(&mut self.loot)
            .with_curse(&mut self.curse);

        let report = self
            .coordinator
            .tick(dt, telemetry, &mut self.roster, &mut effects);
        let session_time = self.coordinator.profile().session_time;

        if let Some(to) = report.committed {
            self.event_bus.publish(DirectorEvent::MacroStateCommitted {
                from: state_before,
                to,
                session_time,
            });
        }
        if let Some(directive) = report.directive {
            self.event_bus.publish(DirectorEvent::DirectiveIssued {
                directive,
                session_time,
                escalation: self.coordinator.escalation(),
            });
        }
        if let Some(behavior) = report.behavior {
            self.event_bus.publish(AgentEvent::BehaviorBroadcast {
                behavior,
                agents: self.roster.alive_count(),
                session_time,
            });
        }
        report
    }

    fn start_run(&mut self, continue_from_previous: bool) -> Result<()> {
        if continue_from_previous && let Some(repository) = &self.repository {
            match repository.load(&self.profile_slot)? {
                Some(profile) => self.coordinator.restore_profile(profile),
                None => warn!(
                    "DirectorWorker: no saved profile in slot {}, starting fresh",
                    self.profile_slot
                ),
            }
        }

        self.coordinator.start_run(continue_from_previous);
        self.curse.reset();
        self.loot.clear_biases();
        self.waves.drain();
        self.scripted.drain();
        Ok(())
    }

    fn end_run(&mut self, keep: bool) -> Result<Option<PlayerProfile>> {
        let profile = self.coordinator.end_run(keep);
        if let (Some(profile), Some(repository)) = (&profile, &self.repository) {
            repository.save(&self.profile_slot, profile)?;
            info!(
                "DirectorWorker: saved profile to slot {} (replays={})",
                self.profile_slot, profile.replay_count
            );
        }
        Ok(profile)
    }

    fn snapshot(&self) -> DirectorSnapshot {
        let mdp = self.coordinator.mdp();
        DirectorSnapshot {
            macro_state: mdp.current_state(),
            observed_state: mdp.observed_state(),
            profile: self.coordinator.profile().clone(),
            directive: self.coordinator.latest_directive().copied(),
            behavior: self.coordinator.current_behavior(),
            escalation: self.coordinator.escalation(),
            curse_multiplier: self.curse.multiplier(),
            smoothed_mdp_reward: self.coordinator.smoothed_mdp_reward(),
            smoothed_group_reward: self.coordinator.smoothed_group_reward(),
            agents_alive: self.roster.alive_count(),
            tasks: self.coordinator.tasks(),
        }
    }
}
