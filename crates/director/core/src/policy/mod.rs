//! Group-behavior bandit.
//!
//! [`BehaviorPolicyTable`] keeps one [`ActionWeights`] distribution per
//! [`PolicyKey`], samples a shared behavior from it and adapts it from the
//! group reward.
//!
//! # Design
//!
//! - **Static candidates, lazy weights**: the [`CandidateTable`] is content;
//!   weights are created uniform on first access.
//! - **Balanced fallback**: a key without candidates falls back once to the
//!   same key with a Balanced inventory; past that, callers receive
//!   [`DEFAULT_BEHAVIOR`].
//! - **Exploration floor**: every update adds a fixed bias before
//!   renormalizing, so no weight reaches zero.

mod behavior;
mod bias;
mod candidates;
mod key;
mod weights;

pub use behavior::GroupBehavior;
pub use bias::{directive_bias, loot_bias_nudges, state_bias};
pub use candidates::{CandidateTable, CandidateTableBuilder, CandidateTableError};
pub use key::PolicyKey;
pub use weights::ActionWeights;

use crate::config::PolicyConfig;
use crate::env::{DirectorRng, seeded};
use crate::mdp::LootBias;

/// Behavior used when neither a key nor its Balanced fallback has candidates.
pub const DEFAULT_BEHAVIOR: GroupBehavior = GroupBehavior::Aggressive;

#[derive(Clone, Debug)]
pub struct BehaviorPolicyTable {
    config: PolicyConfig,
    candidates: CandidateTable,
    weights: Vec<Option<ActionWeights>>,
    rng: DirectorRng,
}

impl BehaviorPolicyTable {
    pub fn new(config: PolicyConfig, candidates: CandidateTable) -> Self {
        Self {
            rng: seeded(config.seed),
            weights: vec![None; PolicyKey::COUNT],
            candidates,
            config,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn candidates(&self) -> &CandidateTable {
        &self.candidates
    }

    /// Key whose candidates and weights serve `key`, after the Balanced
    /// fallback.
    pub fn resolve(&self, key: PolicyKey) -> Option<PolicyKey> {
        if self.candidates.contains(key) {
            return Some(key);
        }
        let fallback = key.with_balanced_inventory();
        if fallback != key && self.candidates.contains(fallback) {
            tracing::debug!(
                "BehaviorPolicyTable: no candidates for {}, using {}",
                key,
                fallback
            );
            return Some(fallback);
        }
        None
    }

    /// Current weights for `key`, if they have been initialized.
    pub fn weights(&self, key: PolicyKey) -> Option<&ActionWeights> {
        let resolved = self.resolve(key)?;
        self.weights[resolved.index()].as_ref()
    }

    /// Resolves `key` and lazily creates its uniform weights.
    fn ensure(&mut self, key: PolicyKey) -> Option<usize> {
        let resolved = self.resolve(key)?;
        let index = resolved.index();
        if self.weights[index].is_none() {
            let behaviors = self.candidates.get(resolved).unwrap_or(&[]);
            self.weights[index] = Some(ActionWeights::uniform(behaviors));
        }
        Some(index)
    }

    /// Weighted draw for `key`, or [`DEFAULT_BEHAVIOR`] when the key is unknown.
    pub fn choose_behavior(&mut self, key: PolicyKey) -> GroupBehavior {
        let Some(index) = self.ensure(key) else {
            tracing::debug!(
                "BehaviorPolicyTable: no candidates for {} or its fallback, using {}",
                key,
                DEFAULT_BEHAVIOR
            );
            return DEFAULT_BEHAVIOR;
        };

        let chosen = self.weights[index]
            .as_ref()
            .and_then(|weights| weights.sample(&mut self.rng))
            .unwrap_or(DEFAULT_BEHAVIOR);
        tracing::debug!("BehaviorPolicyTable: sampled {} for {}", chosen, key);
        chosen
    }

    /// One-step bandit update from an observed group reward.
    ///
    /// The reward is centered into `[-1, 1]`; the learning rate grows with its
    /// magnitude. A positive reward moves mass toward `chosen`, a negative one
    /// spreads it over the others, and zero leaves the shape alone. The
    /// exploration bias is then added to every entry before renormalizing.
    pub fn update_weights(&mut self, key: PolicyKey, chosen: GroupBehavior, reward: f32) {
        if !reward.is_finite() {
            tracing::warn!(
                "BehaviorPolicyTable: ignoring non-finite reward {} for {}",
                reward,
                key
            );
            return;
        }
        let Some(index) = self.ensure(key) else {
            return;
        };
        let config = &self.config;
        let Some(weights) = self.weights[index].as_mut() else {
            return;
        };

        weights.insert(chosen, config.unknown_behavior_weight);

        let centered = (reward / config.reward_scale).clamp(-1.0, 1.0);
        let rate = config.min_learning_rate
            + (config.max_learning_rate - config.min_learning_rate) * centered.abs();
        let others = weights.len().saturating_sub(1);
        let share = if others > 0 {
            rate / others as f32
        } else {
            0.0
        };

        for (behavior, weight) in weights.entries_mut() {
            let is_chosen = *behavior == chosen;
            if centered > 0.0 {
                *weight = (1.0 - rate) * *weight + if is_chosen { rate } else { 0.0 };
            } else if centered < 0.0 {
                *weight = (1.0 - rate) * *weight + if is_chosen { 0.0 } else { share };
            }
            *weight += config.exploration_bias;
        }
        weights.normalize();

        tracing::debug!(
            "BehaviorPolicyTable: updated {} (chosen={}, reward={}, rate={})",
            key,
            chosen,
            reward,
            rate
        );
    }

    /// Adds each nudge to behaviors present under `key`, then renormalizes.
    /// Keys without weights yet are left alone.
    pub fn apply_strategic_bias(&mut self, key: PolicyKey, bias: &[(GroupBehavior, f32)]) {
        if bias.is_empty() {
            return;
        }
        let Some(weights) = self
            .resolve(key)
            .and_then(|resolved| self.weights[resolved.index()].as_mut())
        else {
            tracing::debug!(
                "BehaviorPolicyTable: skipping strategic bias, no weights for {}",
                key
            );
            return;
        };
        for &(behavior, amount) in bias {
            weights.nudge(behavior, amount);
        }
        weights.normalize();
    }

    /// Nudges already-initialized weights for `key` toward the directive's
    /// loot intent.
    pub fn apply_directive_bias(&mut self, key: PolicyKey, loot_bias: LootBias) {
        let nudges = loot_bias_nudges(loot_bias);
        let Some(weights) = self
            .resolve(key)
            .and_then(|resolved| self.weights[resolved.index()].as_mut())
        else {
            tracing::debug!(
                "BehaviorPolicyTable: skipping directive bias, no weights for {}",
                key
            );
            return;
        };
        for &(behavior, amount) in nudges {
            weights.nudge(behavior, amount);
        }
        weights.normalize();
    }

    /// Accepts `candidate` only if its weight beats `last_stable`'s by the
    /// relative improvement threshold. Missing weights accept the candidate.
    pub fn stability_gate(
        &self,
        candidate: GroupBehavior,
        last_stable: GroupBehavior,
        key: PolicyKey,
    ) -> GroupBehavior {
        let Some(weights) = self.weights(key) else {
            return candidate;
        };
        let (Some(new_weight), Some(stable_weight)) =
            (weights.get(candidate), weights.get(last_stable))
        else {
            return candidate;
        };

        let improvement =
            (new_weight - stable_weight) / stable_weight.max(self.config.stability_floor);
        if improvement >= self.config.stability_threshold {
            candidate
        } else {
            tracing::debug!(
                "BehaviorPolicyTable: kept {} over {} (improvement={})",
                last_stable,
                candidate,
                improvement
            );
            last_stable
        }
    }

    /// Drops all learned weights.
    pub fn reset(&mut self) {
        self.weights.iter_mut().for_each(|w| *w = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{InventoryProfile, MovementStyle, Playstyle, TimePhase};
    use rand::Rng;

    fn key(inventory: InventoryProfile) -> PolicyKey {
        PolicyKey::new(
            TimePhase::Mid,
            Playstyle::Balanced,
            MovementStyle::Erratic,
            inventory,
        )
    }

    fn table() -> BehaviorPolicyTable {
        let candidates = CandidateTable::builder()
            .entry(
                key(InventoryProfile::Balanced),
                &[
                    GroupBehavior::Encircle,
                    GroupBehavior::Scatter,
                    GroupBehavior::Cluster,
                ],
            )
            .entry(
                key(InventoryProfile::Brutality),
                &[GroupBehavior::Aggressive, GroupBehavior::CounterOffense],
            )
            .build()
            .unwrap();
        BehaviorPolicyTable::new(PolicyConfig::new(), candidates)
    }

    fn assert_distribution(weights: &ActionWeights) {
        assert!((weights.sum() - 1.0).abs() < 1e-4, "sum={}", weights.sum());
        assert!(weights.min() > 0.0);
    }

    #[test]
    fn weights_stay_normalized_and_positive() {
        let mut table = table();
        let mut rng = crate::env::seeded(99);
        let keys = [
            key(InventoryProfile::Balanced),
            key(InventoryProfile::Brutality),
            key(InventoryProfile::Tactics),
        ];

        for i in 0..2000 {
            let k = keys[i % keys.len()];
            let chosen = table.choose_behavior(k);
            let reward = rng.gen_range(-60.0..60.0);
            table.update_weights(k, chosen, reward);
            if i % 7 == 0 {
                table.apply_strategic_bias(k, state_bias(crate::mdp::MacroState::Suffering));
            }
            assert_distribution(table.weights(k).unwrap());
        }
    }

    #[test]
    fn zero_reward_update_is_deterministic() {
        let mut a = table();
        let k = key(InventoryProfile::Balanced);
        a.update_weights(k, GroupBehavior::Scatter, 15.0);
        let mut b = a.clone();

        a.update_weights(k, GroupBehavior::Scatter, 0.0);
        b.update_weights(k, GroupBehavior::Scatter, 0.0);

        let wa: Vec<u32> = a.weights(k).unwrap().iter().map(|(_, w)| w.to_bits()).collect();
        let wb: Vec<u32> = b.weights(k).unwrap().iter().map(|(_, w)| w.to_bits()).collect();
        assert_eq!(wa, wb);
    }

    #[test]
    fn positive_reward_favors_chosen() {
        let mut table = table();
        let k = key(InventoryProfile::Balanced);
        table.update_weights(k, GroupBehavior::Cluster, 40.0);

        let weights = table.weights(k).unwrap();
        let cluster = weights.get(GroupBehavior::Cluster).unwrap();
        let scatter = weights.get(GroupBehavior::Scatter).unwrap();
        assert!(cluster > scatter);
        // rate 0.5: (1/6 + 0.5 + 0.02) / 1.06
        assert!((cluster - (1.0 / 6.0 + 0.52) / 1.06).abs() < 1e-5);
    }

    #[test]
    fn negative_reward_spreads_mass() {
        let mut table = table();
        let k = key(InventoryProfile::Balanced);
        table.update_weights(k, GroupBehavior::Cluster, -40.0);

        let weights = table.weights(k).unwrap();
        assert!(weights.get(GroupBehavior::Cluster).unwrap() < weights.get(GroupBehavior::Scatter).unwrap());
        assert_distribution(weights);
    }

    #[test]
    fn unknown_chosen_behavior_is_added() {
        let mut table = table();
        let k = key(InventoryProfile::Balanced);
        table.update_weights(k, GroupBehavior::Aggressive, 0.0);

        let weights = table.weights(k).unwrap();
        assert_eq!(weights.len(), 4);
        assert!(weights.get(GroupBehavior::Aggressive).unwrap() > 0.0);
        assert_distribution(weights);
    }

    #[test]
    fn falls_back_to_balanced_then_default() {
        let mut table = table();
        let survival = key(InventoryProfile::Survival);
        assert_eq!(table.resolve(survival), Some(key(InventoryProfile::Balanced)));

        let chosen = table.choose_behavior(survival);
        assert!(matches!(
            chosen,
            GroupBehavior::Encircle | GroupBehavior::Scatter | GroupBehavior::Cluster
        ));

        let unknown = PolicyKey::new(
            TimePhase::Early,
            Playstyle::Defensive,
            MovementStyle::Static,
            InventoryProfile::Tactics,
        );
        assert_eq!(table.resolve(unknown), None);
        assert_eq!(table.choose_behavior(unknown), DEFAULT_BEHAVIOR);
        table.update_weights(unknown, GroupBehavior::Scatter, 10.0);
        assert!(table.weights(unknown).is_none());
    }

    #[test]
    fn stability_gate_requires_relative_improvement() {
        let mut table = table();
        let k = key(InventoryProfile::Balanced);
        table.choose_behavior(k);

        // Uniform weights: no improvement, keep the stable behavior.
        assert_eq!(
            table.stability_gate(GroupBehavior::Scatter, GroupBehavior::Encircle, k),
            GroupBehavior::Encircle
        );

        table.update_weights(k, GroupBehavior::Scatter, 20.0);
        assert_eq!(
            table.stability_gate(GroupBehavior::Scatter, GroupBehavior::Encircle, k),
            GroupBehavior::Scatter
        );

        // Last stable not in the distribution: accept.
        assert_eq!(
            table.stability_gate(GroupBehavior::Cluster, GroupBehavior::Aggressive, k),
            GroupBehavior::Cluster
        );
    }

    #[test]
    fn strategic_bias_ignores_absent_behaviors() {
        let mut table = table();
        let k = key(InventoryProfile::Brutality);
        table.choose_behavior(k);
        table.apply_strategic_bias(
            k,
            &[(GroupBehavior::Aggressive, 0.5), (GroupBehavior::Scatter, 5.0)],
        );

        let weights = table.weights(k).unwrap();
        assert_eq!(weights.len(), 2);
        assert!((weights.get(GroupBehavior::Aggressive).unwrap() - 1.0 / 1.5).abs() < 1e-5);
    }

    #[test]
    fn strategic_bias_needs_existing_weights() {
        let mut table = table();
        let k = key(InventoryProfile::Balanced);
        table.apply_strategic_bias(k, state_bias(crate::mdp::MacroState::Dominating));
        assert!(table.weights(k).is_none());

        table.choose_behavior(k);
        table.apply_strategic_bias(k, state_bias(crate::mdp::MacroState::Dominating));
        let weights = table.weights(k).unwrap();
        assert!(weights.get(GroupBehavior::Scatter).unwrap() > weights.get(GroupBehavior::Cluster).unwrap());
        assert_distribution(weights);
    }

    #[test]
    fn directive_bias_needs_existing_weights() {
        let mut table = table();
        let k = key(InventoryProfile::Balanced);
        table.apply_directive_bias(k, LootBias::Dps);
        assert!(table.weights(k).is_none());

        table.choose_behavior(k);
        table.apply_directive_bias(k, LootBias::Dps);
        let weights = table.weights(k).unwrap();
        assert!(weights.get(GroupBehavior::Scatter).unwrap() > weights.get(GroupBehavior::Cluster).unwrap());
        assert_distribution(weights);
    }
}
