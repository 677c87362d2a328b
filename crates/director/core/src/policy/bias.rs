//! Additive nudges that carry macro-director intent into the bandit.

use super::behavior::GroupBehavior;
use crate::mdp::{DirectorAction, Directive, LootBias, MacroState};

/// Bias keyed off the last committed macro-state.
pub const fn state_bias(state: MacroState) -> &'static [(GroupBehavior, f32)] {
    use GroupBehavior::*;
    match state {
        MacroState::Dominating => &[(Scatter, 0.3), (CounterOffense, 0.3)],
        MacroState::Relaxed => &[(Scatter, 0.2), (CounterOffense, 0.2)],
        MacroState::Neutral => &[],
        MacroState::Tense => &[(Aggressive, 0.3), (Cluster, 0.2), (Encircle, 0.2)],
        MacroState::Suffering => &[(Aggressive, 0.4), (Cluster, 0.3), (Encircle, 0.3)],
    }
}

/// Bias keyed off the last directive's action and payload.
pub fn directive_bias(directive: &Directive) -> &'static [(GroupBehavior, f32)] {
    use GroupBehavior::*;
    match (directive.last_action, directive.loot_bias) {
        (DirectorAction::AdjustCurse, _) if directive.curse_adjustment > 1.0 => {
            &[(Aggressive, 0.1), (Encircle, 0.1)]
        }
        (DirectorAction::AdjustLoot, LootBias::Dps) => &[(Scatter, 0.1), (CounterOffense, 0.1)],
        (DirectorAction::AdjustLoot, LootBias::Survival) => &[(Aggressive, 0.1), (Cluster, 0.1)],
        _ => &[],
    }
}

/// Bias applied when a directive is published, keyed off its loot bias.
pub const fn loot_bias_nudges(bias: LootBias) -> &'static [(GroupBehavior, f32)] {
    use GroupBehavior::*;
    match bias {
        LootBias::Dps => &[(Scatter, 0.2), (Encircle, 0.1)],
        LootBias::Survival => &[(Aggressive, 0.2), (Cluster, 0.1)],
        LootBias::Balanced => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curse_bias_needs_strong_adjustment() {
        let mut directive = Directive::for_state(MacroState::Dominating, DirectorAction::AdjustCurse);
        assert!(directive_bias(&directive).is_empty());

        directive.curse_adjustment = 1.2;
        assert_eq!(
            directive_bias(&directive),
            &[(GroupBehavior::Aggressive, 0.1), (GroupBehavior::Encircle, 0.1)]
        );
    }

    #[test]
    fn loot_directive_bias_follows_loot_bias() {
        let directive = Directive::for_state(MacroState::Suffering, DirectorAction::AdjustLoot);
        assert_eq!(
            directive_bias(&directive),
            &[(GroupBehavior::Aggressive, 0.1), (GroupBehavior::Cluster, 0.1)]
        );

        let directive = Directive::for_state(MacroState::Neutral, DirectorAction::AdjustLoot);
        assert!(directive_bias(&directive).is_empty());
    }
}
