//! Seeded randomness shared by the planner, the bandit and side effects.
//!
//! Every stochastic component owns its own [`DirectorRng`] seeded from config,
//! so two directors built from the same config replay the same decisions.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic generator used across the director.
pub type DirectorRng = ChaCha8Rng;

/// Builds a generator from a config seed.
pub fn seeded(seed: u64) -> DirectorRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Roulette-wheel draw over non-negative weights.
///
/// Returns the index of the selected weight, or `None` when the weights sum to
/// zero or are not finite. Floating-point shortfall at the end of the wheel
/// lands on the last positive weight.
pub fn roulette<R, I>(rng: &mut R, weights: I) -> Option<usize>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = f32>,
    I::IntoIter: Clone,
{
    let weights = weights.into_iter();
    if weights.clone().any(|w| !w.is_finite()) {
        return None;
    }
    let total: f32 = weights.clone().map(|w| w.max(0.0)).sum();
    if !(total > 0.0) || !total.is_finite() {
        return None;
    }

    let pick = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (index, weight) in weights.enumerate() {
        let weight = weight.max(0.0);
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = Some(index);
        if pick < cumulative {
            return Some(index);
        }
    }
    last_positive
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = seeded(7);
        let mut b = seeded(7);
        for _ in 0..16 {
            assert_eq!(
                roulette(&mut a, [0.2, 0.5, 0.3]),
                roulette(&mut b, [0.2, 0.5, 0.3])
            );
        }
    }

    #[test]
    fn zero_weights_are_never_picked() {
        let mut rng = seeded(1);
        for _ in 0..200 {
            assert_eq!(roulette(&mut rng, [0.0, 1.0, 0.0]), Some(1));
        }
    }

    #[test]
    fn degenerate_weights_yield_none() {
        let mut rng = seeded(1);
        assert_eq!(roulette(&mut rng, [0.0, 0.0]), None);
        assert_eq!(roulette(&mut rng, [f32::NAN, 1.0]), None);
        assert_eq!(roulette(&mut rng, Vec::<f32>::new()), None);
    }

    #[test]
    fn any_non_finite_weight_rejects_the_wheel() {
        let mut rng = seeded(3);
        assert_eq!(roulette(&mut rng, [1.0, f32::NAN]), None);
        assert_eq!(roulette(&mut rng, [f32::INFINITY, 1.0]), None);
        assert_eq!(roulette(&mut rng, [0.5, f32::NEG_INFINITY, 0.5]), None);
    }
}
