//! Normalized bandit weights over a small behavior set.

use arrayvec::ArrayVec;
use rand::Rng;
use strum::EnumCount;

use super::behavior::GroupBehavior;
use crate::env::roulette;

type Entries = ArrayVec<(GroupBehavior, f32), { GroupBehavior::COUNT }>;

/// Probability distribution over the behaviors allowed for one policy key.
///
/// Entries keep their insertion order, which is also the roulette order.
/// After every public mutation the weights sum to 1 and each is positive as
/// long as the inputs were.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionWeights {
    entries: Entries,
}

impl ActionWeights {
    /// Uniform distribution over `behaviors`. Duplicates are ignored.
    ///
    /// An empty list yields a single-entry Aggressive distribution.
    pub fn uniform(behaviors: &[GroupBehavior]) -> Self {
        let mut entries = Entries::new();
        for &behavior in behaviors {
            if !entries.iter().any(|(b, _)| *b == behavior) {
                entries.push((behavior, 0.0));
            }
        }
        if entries.is_empty() {
            entries.push((GroupBehavior::default(), 0.0));
        }

        let mut weights = Self { entries };
        weights.reset_uniform();
        weights
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, behavior: GroupBehavior) -> Option<f32> {
        self.entries
            .iter()
            .find(|(b, _)| *b == behavior)
            .map(|(_, w)| *w)
    }

    pub fn contains(&self, behavior: GroupBehavior) -> bool {
        self.get(behavior).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupBehavior, f32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn sum(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn min(&self) -> f32 {
        self.entries
            .iter()
            .map(|(_, w)| *w)
            .fold(f32::INFINITY, f32::min)
    }

    /// Weighted draw; `None` only when every weight is zero.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GroupBehavior> {
        roulette(rng, self.entries.iter().map(|(_, w)| *w)).map(|i| self.entries[i].0)
    }

    /// Adds `amount` to `behavior` if it is part of the distribution.
    /// Call [`normalize`](Self::normalize) afterwards.
    pub(crate) fn nudge(&mut self, behavior: GroupBehavior, amount: f32) -> bool {
        match self.entries.iter_mut().find(|(b, _)| *b == behavior) {
            Some((_, weight)) => {
                *weight += amount;
                true
            }
            None => false,
        }
    }

    /// Appends a behavior with a raw weight. Existing entries are left alone.
    pub(crate) fn insert(&mut self, behavior: GroupBehavior, weight: f32) {
        if !self.contains(behavior) && !self.entries.is_full() {
            self.entries.push((behavior, weight));
        }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [(GroupBehavior, f32)] {
        &mut self.entries
    }

    /// Rescales to sum 1. A non-positive or non-finite sum resets to uniform.
    pub fn normalize(&mut self) {
        let total = self.sum();
        if !(total > 0.0) || !total.is_finite() {
            tracing::warn!(
                "ActionWeights: degenerate distribution (sum={}), resetting to uniform",
                total
            );
            self.reset_uniform();
            return;
        }
        for (_, weight) in self.entries.iter_mut() {
            *weight /= total;
        }
    }

    fn reset_uniform(&mut self) {
        let share = 1.0 / self.entries.len().max(1) as f32;
        for (_, weight) in self.entries.iter_mut() {
            *weight = share;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::seeded;

    #[test]
    fn uniform_dedupes() {
        let weights = ActionWeights::uniform(&[
            GroupBehavior::Scatter,
            GroupBehavior::Cluster,
            GroupBehavior::Scatter,
        ]);
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.get(GroupBehavior::Scatter), Some(0.5));
        assert_eq!(weights.get(GroupBehavior::Aggressive), None);
    }

    #[test]
    fn empty_list_defaults_to_aggressive() {
        let weights = ActionWeights::uniform(&[]);
        assert_eq!(weights.get(GroupBehavior::Aggressive), Some(1.0));
    }

    #[test]
    fn degenerate_sum_resets_uniform() {
        let mut weights =
            ActionWeights::uniform(&[GroupBehavior::Encircle, GroupBehavior::Cluster]);
        for (_, w) in weights.entries_mut() {
            *w = 0.0;
        }
        weights.normalize();
        assert_eq!(weights.get(GroupBehavior::Encircle), Some(0.5));

        weights.entries_mut()[0].1 = f32::NAN;
        weights.normalize();
        assert_eq!(weights.get(GroupBehavior::Encircle), Some(0.5));
    }

    #[test]
    fn sample_only_returns_members() {
        let weights = ActionWeights::uniform(&[GroupBehavior::Scatter, GroupBehavior::Cluster]);
        let mut rng = seeded(11);
        for _ in 0..100 {
            let b = weights.sample(&mut rng);
            assert!(matches!(
                b,
                Some(GroupBehavior::Scatter | GroupBehavior::Cluster)
            ));
        }
    }
}
