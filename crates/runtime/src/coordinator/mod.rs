//! Top-level scheduler that owns one instance of every director component.
//!
//! [`TacticalCoordinator::tick`] runs the periodic tasks in a fixed order:
//! cache refresh, macro planner, group reward, group behavior, and the
//! late-game curse ramp. No task observes another's half-updated state within
//! a tick, so the coordinator needs no locking of its own; the worker that
//! owns it serializes access.
//!
//! # Modes
//!
//! - **Combined** (`GROUP_REWARD | GROUP_BEHAVIOR` set): the planner runs on
//!   its own timer, blends its reward with the smoothed group reward,
//!   reinterprets the sampled state and escalates the curse term.
//! - **Standalone planner**: the planner only acts when the confirmation
//!   filter commits a new macro-state, without blending.
mod timer;

pub use timer::{IntervalTimer, TaskTimers};

use director_core::{
    AgentRegistry, BehaviorPolicyTable, CandidateTable, ConfigError, CoordinatorConfig,
    DirectorConfig, DirectorMdp, Directive, Effects, GroupBehavior, MacroState,
    PlayerProfile, PlayerStateEstimator, PlayerTelemetrySource, PolicyKey, SpatialAgentCache,
    TaskFlags, TelemetryEvent,
    policy::{DEFAULT_BEHAVIOR, directive_bias, state_bias},
};

/// What one coordinator tick produced.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Whether the telemetry carried HP this tick.
    pub has_signal: bool,
    /// Committed macro-state, when it changed during this tick.
    pub committed: Option<MacroState>,
    /// Directive published this tick.
    pub directive: Option<Directive>,
    /// Raw group reward aggregated this tick.
    pub group_reward: Option<f32>,
    /// Behavior broadcast to the live agents this tick.
    pub behavior: Option<GroupBehavior>,
}

#[derive(Clone, Debug)]
pub struct TacticalCoordinator {
    config: CoordinatorConfig,
    estimator: PlayerStateEstimator,
    mdp: DirectorMdp,
    policy: BehaviorPolicyTable,
    cache: SpatialAgentCache,
    timers: TaskTimers,

    smoothed_mdp_reward: f32,
    smoothed_group_reward: f32,
    last_group_reward: f32,
    escalation: f32,
    hits: u32,
    deaths: u32,

    latest_directive: Option<Directive>,
    last_key: Option<PolicyKey>,
    last_stable: GroupBehavior,
    current_behavior: GroupBehavior,
    stale: bool,
}

impl TacticalCoordinator {
    /// Validates `config` and builds every component from it.
    pub fn new(config: DirectorConfig, candidates: CandidateTable) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            timers: TaskTimers::from_config(&config.coordinator),
            estimator: PlayerStateEstimator::new(config.estimator),
            mdp: DirectorMdp::new(config.mdp),
            policy: BehaviorPolicyTable::new(config.policy, candidates),
            cache: SpatialAgentCache::new(config.cache),
            config: config.coordinator,
            smoothed_mdp_reward: 0.0,
            smoothed_group_reward: 0.0,
            last_group_reward: 0.0,
            escalation: 0.0,
            hits: 0,
            deaths: 0,
            latest_directive: None,
            last_key: None,
            last_stable: DEFAULT_BEHAVIOR,
            current_behavior: DEFAULT_BEHAVIOR,
            stale: false,
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn tasks(&self) -> TaskFlags {
        self.config.tasks
    }

    /// Enables or disables periodic tasks from the next tick on.
    pub fn set_tasks(&mut self, tasks: TaskFlags) {
        tracing::info!("TacticalCoordinator: tasks set to {:?}", tasks);
        self.config.tasks = tasks;
    }

    pub fn estimator(&self) -> &PlayerStateEstimator {
        &self.estimator
    }

    pub fn profile(&self) -> &PlayerProfile {
        self.estimator.profile()
    }

    pub fn mdp(&self) -> &DirectorMdp {
        &self.mdp
    }

    pub fn policy(&self) -> &BehaviorPolicyTable {
        &self.policy
    }

    pub fn cache(&self) -> &SpatialAgentCache {
        &self.cache
    }

    pub fn macro_state(&self) -> MacroState {
        self.mdp.current_state()
    }

    pub fn latest_directive(&self) -> Option<&Directive> {
        self.latest_directive.as_ref()
    }

    pub fn current_behavior(&self) -> GroupBehavior {
        self.current_behavior
    }

    /// Escalation scalar in `[0, 1]`.
    pub fn escalation(&self) -> f32 {
        self.escalation
    }

    pub fn smoothed_mdp_reward(&self) -> f32 {
        self.smoothed_mdp_reward
    }

    pub fn smoothed_group_reward(&self) -> f32 {
        self.smoothed_group_reward
    }

    pub fn last_group_reward(&self) -> f32 {
        self.last_group_reward
    }

    pub fn record_telemetry(&mut self, event: TelemetryEvent) {
        self.estimator.record(event);
    }

    /// An agent landed a hit on the player.
    pub fn record_agent_hit(&mut self) {
        self.hits += 1;
    }

    /// An agent died.
    pub fn record_agent_death(&mut self) {
        self.deaths += 1;
    }

    /// Starts a new run. Learned weights and the committed macro-state
    /// survive; timers, counters and smoothing restart.
    pub fn start_run(&mut self, continue_from_previous: bool) {
        self.estimator.start_run(continue_from_previous);
        self.timers.reset();
        self.smoothed_mdp_reward = 0.0;
        self.smoothed_group_reward = 0.0;
        self.last_group_reward = 0.0;
        self.escalation = 0.0;
        self.hits = 0;
        self.deaths = 0;
        self.latest_directive = None;
        self.stale = false;
        tracing::info!(
            "TacticalCoordinator: run started (continued={})",
            continue_from_previous
        );
    }

    /// Ends the current run, returning the profile to persist when `keep`.
    pub fn end_run(&mut self, keep: bool) -> Option<PlayerProfile> {
        self.estimator.end_run(keep)
    }

    /// Installs a persisted profile as the carry-over for the next continued
    /// run.
    pub fn restore_profile(&mut self, profile: PlayerProfile) {
        self.estimator.restore(profile);
    }

    /// Advances every enabled task by `dt` seconds.
    pub fn tick(
        &mut self,
        dt: f32,
        telemetry: &dyn PlayerTelemetrySource,
        agents: &mut dyn AgentRegistry,
        effects: &mut Effects<'_>,
    ) -> TickReport {
        let tasks = self.config.tasks;
        let state_before = self.mdp.current_state();
        let has_signal = self.estimator.tick(dt, telemetry);
        let mut report = TickReport {
            has_signal,
            ..TickReport::default()
        };

        if has_signal {
            self.stale = false;
        } else if !self.stale {
            self.stale = true;
            tracing::warn!("TacticalCoordinator: no player signal, skipping decisions");
        }

        if tasks.contains(TaskFlags::CACHE) && self.timers.cache.advance(dt) {
            self.cache.refresh(&agents.snapshots(), telemetry.position());
        }

        if tasks.contains(TaskFlags::MDP) && has_signal {
            if tasks.is_combined() {
                let observed = self.mdp.derive_state(self.estimator.profile());
                self.mdp.confirm(observed, dt);
                if self.timers.mdp.advance(dt) {
                    report.directive = Some(self.run_mdp_task(effects));
                }
            } else if let Some(outcome) = self.mdp.update(self.estimator.profile(), dt, effects) {
                tracing::info!(
                    "TacticalCoordinator: directive {:?} after {:?}",
                    outcome.directive.target_state,
                    outcome.directive.last_action
                );
                self.latest_directive = Some(outcome.directive);
                report.directive = Some(outcome.directive);
            }
        }

        if tasks.contains(TaskFlags::GROUP_REWARD) && self.timers.reward.advance(dt) {
            report.group_reward = Some(self.run_reward_task(&*agents));
        }

        if tasks.contains(TaskFlags::GROUP_BEHAVIOR) && has_signal && self.timers.behavior.advance(dt)
        {
            report.behavior = self.run_behavior_task(telemetry, agents);
        }

        if tasks.contains(TaskFlags::LATE_CURSE) {
            self.run_late_curse_task(dt, effects);
        }

        let state_after = self.mdp.current_state();
        if state_after != state_before {
            report.committed = Some(state_after);
        }
        report
    }

    /// Combined-mode planner task: plan, step with blend, then adjust the
    /// directive with the group feedback before publishing it.
    fn run_mdp_task(&mut self, effects: &mut Effects<'_>) -> Directive {
        let profile = self.estimator.profile();
        let observed = self.mdp.derive_state(profile);
        let action = self.mdp.choose_best_action(profile);
        let outcome =
            self.mdp
                .step_and_apply(action, profile, Some(self.smoothed_group_reward), effects);

        let group = self.smoothed_group_reward;
        let blended = outcome.reward + self.config.group_blend_weight * group;
        self.smoothed_mdp_reward = smooth(self.config.smoothing_alpha, blended, self.smoothed_mdp_reward);

        let target = self.reinterpret(outcome.next_state, group);
        if target != outcome.next_state {
            tracing::debug!(
                "TacticalCoordinator: reinterpreted {} as {} (group reward={})",
                outcome.next_state,
                target,
                group
            );
        }

        self.update_escalation();

        let mut directive = outcome.directive;
        directive.target_state = target;
        directive.curse_adjustment += self.escalation * self.config.escalation_curse_weight;

        if let Some(key) = self.last_key {
            self.policy.apply_directive_bias(key, directive.loot_bias);
        }

        tracing::info!(
            "TacticalCoordinator: {} + {:?} -> {} (reward={}, smoothed={}, escalation={})",
            observed,
            action,
            target,
            outcome.reward,
            self.smoothed_mdp_reward,
            self.escalation
        );

        self.latest_directive = Some(directive);
        directive
    }

    /// Pulls the sampled state back toward the middle when the group reward
    /// contradicts it.
    pub fn reinterpret(&self, state: MacroState, group_reward: f32) -> MacroState {
        let c = &self.config;
        match state {
            MacroState::Dominating if group_reward > c.dominating_release => MacroState::Neutral,
            MacroState::Suffering if group_reward < c.suffering_release => MacroState::Neutral,
            MacroState::Relaxed if group_reward > c.relaxed_to_tense => MacroState::Tense,
            MacroState::Tense if group_reward < c.tense_to_relaxed => MacroState::Relaxed,
            other => other,
        }
    }

    fn update_escalation(&mut self) {
        let threshold = self.config.escalation_threshold;
        let (mdp, group) = (self.smoothed_mdp_reward, self.smoothed_group_reward);

        if mdp > threshold || group > threshold {
            self.escalation += self.config.escalation_rate;
        } else if mdp < -threshold || group < -threshold {
            self.escalation -= self.config.escalation_rate;
        }
        self.escalation = self.escalation.clamp(0.0, 1.0);
    }

    /// Aggregates the group reward over the last interval and clears the hit
    /// and death counters.
    fn run_reward_task(&mut self, agents: &dyn AgentRegistry) -> f32 {
        let snapshots = agents.snapshots();
        let reward = if snapshots.is_empty() {
            0.0
        } else {
            let alive = snapshots.iter().filter(|s| s.alive).count() as f32;
            self.config.survival_reward_rate * alive * self.config.reward_interval
                + self.config.hit_reward * self.hits as f32
                - self.config.death_penalty * self.deaths as f32
        };

        self.last_group_reward = reward;
        self.smoothed_group_reward =
            smooth(self.config.smoothing_alpha, reward, self.smoothed_group_reward);

        tracing::debug!(
            "TacticalCoordinator: group reward {} (hits={}, deaths={}, smoothed={})",
            reward,
            self.hits,
            self.deaths,
            self.smoothed_group_reward
        );
        self.hits = 0;
        self.deaths = 0;
        reward
    }

    /// Picks and broadcasts one shared behavior. With the planner enabled the
    /// task waits for its first directive and folds its intent into the
    /// weights before sampling.
    fn run_behavior_task(
        &mut self,
        telemetry: &dyn PlayerTelemetrySource,
        agents: &mut dyn AgentRegistry,
    ) -> Option<GroupBehavior> {
        let planner_enabled = self.config.tasks.contains(TaskFlags::MDP);
        if planner_enabled && self.latest_directive.is_none() {
            tracing::debug!("TacticalCoordinator: no directive yet, skipping behavior task");
            return None;
        }

        let key = PolicyKey::from_profile(self.estimator.profile(), telemetry.inventory_profile());

        if planner_enabled {
            let mut bias = state_bias(self.mdp.observed_state()).to_vec();
            if let Some(directive) = &self.latest_directive {
                bias.extend_from_slice(directive_bias(directive));
            }
            self.policy.apply_strategic_bias(key, &bias);
        }

        let sampled = self.policy.choose_behavior(key);
        let accepted = self.policy.stability_gate(sampled, self.last_stable, key);
        self.last_stable = accepted;
        self.policy
            .update_weights(key, accepted, self.last_group_reward);

        let mut broadcast = 0;
        for snapshot in agents.snapshots().into_iter().filter(|s| s.alive) {
            agents.broadcast_behavior(snapshot.id, accepted);
            broadcast += 1;
        }

        tracing::debug!(
            "TacticalCoordinator: behavior {} for {} (sampled {}, {} agents)",
            accepted,
            key,
            sampled,
            broadcast
        );
        self.last_key = Some(key);
        self.current_behavior = accepted;
        Some(accepted)
    }

    fn run_late_curse_task(&mut self, dt: f32, effects: &mut Effects<'_>) {
        if self.estimator.elapsed() < self.config.late_curse_start_secs {
            return;
        }
        if !self.timers.late_curse.advance(dt) {
            return;
        }
        match effects.curse() {
            Some(curse) => {
                curse.add_bias(self.config.late_curse_increment);
                tracing::debug!(
                    "TacticalCoordinator: late curse ramp, multiplier now {}",
                    curse.multiplier()
                );
            }
            None => tracing::debug!("TacticalCoordinator: no curse sink wired, skipping ramp"),
        }
    }
}

fn smooth(alpha: f32, sample: f32, previous: f32) -> f32 {
    alpha * sample + (1.0 - alpha) * previous
}
