//! Macro director: a five-state pacing MDP with a one-step-lookahead planner.
//!
//! [`DirectorMdp`] tracks the committed [`MacroState`], samples transitions
//! from an immutable [`TransitionModel`], scores them with [`RewardModel`],
//! and pushes the chosen action's side effect into whichever sinks are wired
//! through [`Effects`].
//!
//! # Design
//!
//! - **Sampled lookahead**: each candidate action is scored on a single
//!   Monte-Carlo draw of its next state plus the discounted best immediate
//!   reward from there. Identical inputs can rank actions differently across
//!   calls; the expectation is never computed.
//! - **Stable tie-break**: equal scores resolve to the first action in
//!   [`DirectorAction::ALL`].
//! - **Hysteresis**: observed states reach the committed state only through
//!   the [`ConfirmationFilter`].
//! - **Blend**: in combined mode the group-policy reward nudges the directive
//!   one notch toward Dominating or Suffering. This is the only point where the
//!   macro planner and the group-behavior bandit influence each other.

mod confirm;
mod directive;
mod effects;
mod reward;
mod state;
mod transition;

pub use confirm::ConfirmationFilter;
pub use directive::{Directive, LootBias, WaveType, curse_adjustment_for_state};
pub use effects::{
    apply_loot_bias, curse_steps, event_difficulty_weights, roll_difficulty,
    wave_difficulty_weights,
};
pub use reward::{RewardModel, curse_base, phase_multiplier};
pub use state::{DirectorAction, MacroState};
pub use transition::{StateDistribution, TransitionError, TransitionModel, TransitionModelBuilder};

use crate::config::MdpConfig;
use crate::env::{DirectorRng, Effects, seeded};
use crate::profile::{PlayerProfile, TimePhase};

/// Result of one applied planner step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// Sampled next state, now committed.
    pub next_state: MacroState,
    pub reward: f32,
    pub directive: Directive,
}

#[derive(Clone, Debug)]
pub struct DirectorMdp {
    config: MdpConfig,
    current: MacroState,
    observed: MacroState,
    transitions: TransitionModel,
    rewards: RewardModel,
    filter: ConfirmationFilter,
    rng: DirectorRng,
    last_reward: f32,
    last_directive: Option<Directive>,
}

impl DirectorMdp {
    pub fn new(config: MdpConfig) -> Self {
        Self::with_transitions(config, TransitionModel::standard())
    }

    pub fn with_transitions(config: MdpConfig, transitions: TransitionModel) -> Self {
        Self {
            current: MacroState::Neutral,
            observed: MacroState::Neutral,
            rewards: RewardModel::new(config.rewards.clone()),
            filter: ConfirmationFilter::new(config.confirm_secs),
            rng: seeded(config.seed),
            last_reward: 0.0,
            last_directive: None,
            transitions,
            config,
        }
    }

    pub fn current_state(&self) -> MacroState {
        self.current
    }

    /// Overrides the committed state and drops any pending candidate.
    pub fn set_state(&mut self, state: MacroState) {
        self.current = state;
        self.filter.reset();
    }

    /// Most recent state returned by [`derive_state`](Self::derive_state).
    pub fn observed_state(&self) -> MacroState {
        self.observed
    }

    pub fn last_reward(&self) -> f32 {
        self.last_reward
    }

    pub fn last_directive(&self) -> Option<&Directive> {
        self.last_directive.as_ref()
    }

    pub fn transitions(&self) -> &TransitionModel {
        &self.transitions
    }

    pub fn rewards(&self) -> &RewardModel {
        &self.rewards
    }

    pub fn config(&self) -> &MdpConfig {
        &self.config
    }

    /// Classifies the profile and remembers the result as the latest
    /// observation. The classification itself is a pure function of the
    /// profile's ratios and HP.
    pub fn derive_state(&mut self, profile: &PlayerProfile) -> MacroState {
        self.observed = MacroState::from_profile(profile);
        self.observed
    }

    /// Feeds an observation through the confirmation filter and commits it
    /// once it has persisted for the confirmation interval.
    pub fn confirm(&mut self, observed: MacroState, dt: f32) -> Option<MacroState> {
        let committed = self.filter.observe(self.current, observed, dt)?;
        tracing::info!(
            "DirectorMdp: confirmed state change {} -> {} after {}s",
            self.current,
            committed,
            self.filter.confirm_secs()
        );
        self.current = committed;
        Some(committed)
    }

    /// Picks the action with the highest sampled one-step-lookahead value.
    pub fn choose_best_action(&mut self, profile: &PlayerProfile) -> DirectorAction {
        let state = self.current;
        let mut best_action = DirectorAction::ALL[0];
        let mut best_value = f32::NEG_INFINITY;

        for action in DirectorAction::ALL {
            let next = self.transitions.sample(state, action, &mut self.rng);
            let reward = self.rewards.reward(state, action, next, profile);
            let future = self.best_immediate_reward(next, profile);
            let value = reward + self.config.gamma * future;

            tracing::debug!(
                "  Action {:?}: value={} (next={}, reward={}, future={})",
                action,
                value,
                next,
                reward,
                future
            );

            // In case of tie, first action wins (stable ordering)
            if value > best_value {
                best_value = value;
                best_action = action;
            }
        }

        tracing::debug!(
            "DirectorMdp: best action from {} = {:?} (value={})",
            state,
            best_action,
            best_value
        );
        best_action
    }

    /// Best single-sample reward reachable from `state`.
    fn best_immediate_reward(&mut self, state: MacroState, profile: &PlayerProfile) -> f32 {
        DirectorAction::ALL
            .into_iter()
            .map(|action| {
                let next = self.transitions.sample(state, action, &mut self.rng);
                self.rewards.reward(state, action, next, profile)
            })
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Samples and commits the next state for `action`.
    pub fn step(&mut self, action: DirectorAction, profile: &PlayerProfile) -> (MacroState, f32) {
        let state = self.current;
        let next = self.transitions.sample(state, action, &mut self.rng);
        let reward = self.rewards.reward(state, action, next, profile);

        self.current = next;
        self.filter.reset();
        self.last_reward = reward;
        (next, reward)
    }

    /// Runs [`step`](Self::step), triggers the action's side effect, and
    /// builds the directive.
    ///
    /// `blend` carries the group policy's smoothed reward in combined mode and
    /// is `None` when the planner runs alone.
    pub fn step_and_apply(
        &mut self,
        action: DirectorAction,
        profile: &PlayerProfile,
        blend: Option<f32>,
        effects: &mut Effects<'_>,
    ) -> StepOutcome {
        let (next, reward) = self.step(action, profile);
        self.apply_side_effect(action, next, profile, effects);

        let directive = match blend {
            Some(group_reward) => self.blended_directive(next, action, group_reward),
            None => Directive::for_state(next, action),
        };
        self.last_directive = Some(directive);

        StepOutcome {
            next_state: next,
            reward,
            directive,
        }
    }

    /// Standalone loop: derive, confirm, and only on a confirmed change plan
    /// and apply one action without blending.
    pub fn update(
        &mut self,
        profile: &PlayerProfile,
        dt: f32,
        effects: &mut Effects<'_>,
    ) -> Option<StepOutcome> {
        let observed = self.derive_state(profile);
        self.confirm(observed, dt)?;
        let action = self.choose_best_action(profile);
        Some(self.step_and_apply(action, profile, None, effects))
    }

    fn apply_side_effect(
        &mut self,
        action: DirectorAction,
        next: MacroState,
        profile: &PlayerProfile,
        effects: &mut Effects<'_>,
    ) {
        let phase = TimePhase::classify(profile.session_time);
        match action {
            DirectorAction::SpawnEnemies => match effects.waves() {
                Some(waves) => {
                    let difficulty =
                        roll_difficulty(&mut self.rng, wave_difficulty_weights(next));
                    tracing::debug!("DirectorMdp: queue {} wave for {}", difficulty, next);
                    waves.enqueue(phase, difficulty);
                }
                None => tracing::debug!("DirectorMdp: no wave queue wired, skipping spawn"),
            },
            DirectorAction::TriggerEvent => match effects.events() {
                Some(events) => {
                    let difficulty =
                        roll_difficulty(&mut self.rng, event_difficulty_weights(next, phase));
                    tracing::debug!("DirectorMdp: trigger {} event for {}", difficulty, next);
                    events.enqueue(phase, difficulty);
                }
                None => tracing::debug!("DirectorMdp: no event queue wired, skipping event"),
            },
            DirectorAction::AdjustLoot => match effects.loot() {
                Some(loot) => apply_loot_bias(loot, next, profile),
                None => tracing::debug!("DirectorMdp: no loot sink wired, skipping loot bias"),
            },
            DirectorAction::AdjustCurse => match effects.curse() {
                Some(curse) => {
                    let steps =
                        curse_steps(next, phase, profile.dps_ratio(), profile.hp_percent);
                    if steps != 0 {
                        tracing::debug!("DirectorMdp: curse adjusted by {} for {}", steps, next);
                        curse.adjust_steps(steps);
                    }
                }
                None => tracing::debug!("DirectorMdp: no curse sink wired, skipping curse"),
            },
        }
    }

    fn blended_directive(
        &self,
        next: MacroState,
        action: DirectorAction,
        group_reward: f32,
    ) -> Directive {
        let normalized = group_reward - self.config.blend_neutral;
        let band = self.config.blend_band;
        let nudge = self.config.blend_curse_nudge;

        let (target, curse_delta, loot_bias) = if normalized < -band {
            (next.toward_suffering(), -nudge, LootBias::Survival)
        } else if normalized > band {
            (next.toward_dominating(), nudge, LootBias::Dps)
        } else {
            (next, 0.0, LootBias::Balanced)
        };

        Directive {
            target_state: target,
            loot_bias,
            wave_type: WaveType::for_state(target),
            curse_adjustment: curse_adjustment_for_state(target) + curse_delta,
            last_action: action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{CurseSink, Difficulty, WaveQueue};
    use crate::profile::ItemCategory;

    #[derive(Default)]
    struct StepCounter {
        steps: Vec<i32>,
    }

    impl CurseSink for StepCounter {
        fn adjust_steps(&mut self, steps: i32) {
            self.steps.push(steps);
        }
        fn add_bias(&mut self, _amount: f32) {}
        fn multiplier(&self) -> f32 {
            1.0
        }
    }

    #[derive(Default)]
    struct WaveLog(Vec<(TimePhase, Difficulty)>);

    impl WaveQueue for WaveLog {
        fn enqueue(&mut self, phase: TimePhase, difficulty: Difficulty) {
            self.0.push((phase, difficulty));
        }
    }

    fn mdp(seed: u64) -> DirectorMdp {
        DirectorMdp::new(MdpConfig::new().with_seed(seed))
    }

    #[test]
    fn loot_match_bonus_reaches_step_reward() {
        let mut profile = PlayerProfile::new();
        profile.predicted_item_category = Some(ItemCategory::Tactics);
        profile.favored_item_category = Some(ItemCategory::Tactics);

        let mut director = mdp(42);
        director.set_state(MacroState::Dominating);
        let (next, reward) = director.step(DirectorAction::AdjustLoot, &profile);

        let model = RewardModel::default();
        let expected = model.reward(
            MacroState::Dominating,
            DirectorAction::AdjustLoot,
            next,
            &profile,
        );
        assert_eq!(reward, expected);

        // Same transition without the match earns exactly the bonus gap less.
        profile.favored_item_category = Some(ItemCategory::Survival);
        let unmatched = model.reward(
            MacroState::Dominating,
            DirectorAction::AdjustLoot,
            next,
            &profile,
        );
        assert!((reward - unmatched - 4.0).abs() < 1e-5);
        assert_eq!(director.current_state(), next);
    }

    #[test]
    fn suffering_curse_actions_ease_on_average() {
        let profile = PlayerProfile::new();
        let mut sink = StepCounter::default();

        for seed in 0..200 {
            let mut director = mdp(seed);
            director.set_state(MacroState::Suffering);
            let mut effects = Effects::none().with_curse(&mut sink);
            director.step_and_apply(DirectorAction::AdjustCurse, &profile, None, &mut effects);
        }

        let total: i32 = sink.steps.iter().sum();
        assert!(!sink.steps.is_empty());
        assert!(total < 0);
        assert_eq!(curse_adjustment_for_state(MacroState::Suffering), -1.0);
    }

    #[test]
    fn missing_sink_still_commits_state() {
        let mut director = mdp(9);
        let outcome = director.step_and_apply(
            DirectorAction::SpawnEnemies,
            &PlayerProfile::new(),
            None,
            &mut Effects::none(),
        );
        assert_eq!(director.current_state(), outcome.next_state);
        assert_eq!(outcome.directive.last_action, DirectorAction::SpawnEnemies);
    }

    #[test]
    fn spawn_enqueues_with_phase() {
        let mut director = mdp(1);
        let mut waves = WaveLog::default();
        let profile = PlayerProfile {
            session_time: 200.0,
            ..PlayerProfile::new()
        };
        let mut effects = Effects::none().with_waves(&mut waves);
        director.step_and_apply(DirectorAction::SpawnEnemies, &profile, None, &mut effects);

        assert_eq!(waves.0.len(), 1);
        assert_eq!(waves.0[0].0, TimePhase::Mid);
    }

    #[test]
    fn blend_nudges_directive() {
        let director = mdp(0);

        let low = director.blended_directive(MacroState::Neutral, DirectorAction::AdjustLoot, 5.0);
        assert_eq!(low.target_state, MacroState::Tense);
        assert_eq!(low.loot_bias, LootBias::Survival);
        assert!((low.curse_adjustment + 0.1).abs() < 1e-6);

        let high =
            director.blended_directive(MacroState::Relaxed, DirectorAction::AdjustLoot, 15.0);
        assert_eq!(high.target_state, MacroState::Dominating);
        assert_eq!(high.loot_bias, LootBias::Dps);
        assert!((high.curse_adjustment - 1.1).abs() < 1e-6);

        let flat =
            director.blended_directive(MacroState::Suffering, DirectorAction::AdjustLoot, 10.0);
        assert_eq!(flat.target_state, MacroState::Suffering);
        assert_eq!(flat.loot_bias, LootBias::Balanced);
        assert_eq!(flat.curse_adjustment, -1.0);
    }

    #[test]
    fn planner_is_reproducible_for_a_seed() {
        let profile = PlayerProfile::new();
        let mut a = mdp(77);
        let mut b = mdp(77);
        for _ in 0..20 {
            assert_eq!(a.choose_best_action(&profile), b.choose_best_action(&profile));
        }
    }

    #[test]
    fn self_loop_model_ties_resolve_to_first_action() {
        // Mid-session spawn (6 * 1.0) ties loot (4 * 1.0 + 2); spawn comes first.
        let mut config = MdpConfig::new();
        config.rewards.spawn_base = 6.0;
        let mut director = DirectorMdp::with_transitions(config, TransitionModel::self_loops());
        director.set_state(MacroState::Relaxed);
        let profile = PlayerProfile {
            session_time: 200.0,
            ..PlayerProfile::new()
        };
        for _ in 0..10 {
            assert_eq!(
                director.choose_best_action(&profile),
                DirectorAction::SpawnEnemies
            );
        }
    }

    #[test]
    fn standalone_update_waits_for_confirmation() {
        let mut director = mdp(3);
        // Low HP with no output reads as Tense.
        let struggling = PlayerProfile {
            hp_percent: 0.1,
            ..PlayerProfile::new()
        };

        let mut outcomes = 0;
        for _ in 0..5 {
            if director
                .update(&struggling, 0.1, &mut Effects::none())
                .is_some()
            {
                outcomes += 1;
            }
        }
        assert_eq!(outcomes, 0);
        assert_eq!(director.current_state(), MacroState::Neutral);

        for _ in 0..10 {
            if director
                .update(&struggling, 0.1, &mut Effects::none())
                .is_some()
            {
                outcomes += 1;
                break;
            }
        }
        assert_eq!(outcomes, 1);
    }
}
