//! Read-only views returned by worker queries.

use serde::{Deserialize, Serialize};

use director_core::{Directive, GroupBehavior, MacroState, PlayerProfile, TaskFlags};

use crate::collaborators::QueuedRequest;

/// Point-in-time copy of the director's externally visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorSnapshot {
    pub macro_state: MacroState,
    /// Latest unconfirmed classification.
    pub observed_state: MacroState,
    pub profile: PlayerProfile,
    pub directive: Option<Directive>,
    pub behavior: GroupBehavior,
    pub escalation: f32,
    pub curse_multiplier: f32,
    pub smoothed_mdp_reward: f32,
    pub smoothed_group_reward: f32,
    pub agents_alive: usize,
    pub tasks: TaskFlags,
}

/// Wave and event requests issued since the last drain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingRequests {
    pub waves: Vec<QueuedRequest>,
    pub events: Vec<QueuedRequest>,
}

impl PendingRequests {
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty() && self.events.is_empty()
    }
}
