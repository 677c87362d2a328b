//! Hostile agent population access.

use glam::Vec2;

use crate::policy::GroupBehavior;

/// Stable handle for one hostile agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Point-in-time view of one agent, as consumed by the spatial cache.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Vec2,
    pub alive: bool,
}

impl AgentSnapshot {
    pub const fn new(id: AgentId, position: Vec2, alive: bool) -> Self {
        Self {
            id,
            position,
            alive,
        }
    }
}

/// Registry of hostile agents.
///
/// Every registered live agent holds exactly one current [`GroupBehavior`];
/// implementations assign one at registration.
pub trait AgentRegistry {
    fn register(&mut self, id: AgentId, position: Vec2);

    fn unregister(&mut self, id: AgentId);

    /// Assigns `behavior` to one agent. Unknown or dead agents are ignored.
    fn broadcast_behavior(&mut self, id: AgentId, behavior: GroupBehavior);

    fn is_alive(&self, id: AgentId) -> bool;

    fn position(&self, id: AgentId) -> Option<Vec2>;

    fn behavior(&self, id: AgentId) -> Option<GroupBehavior>;

    /// All registered agents, alive or not.
    fn snapshots(&self) -> Vec<AgentSnapshot>;

    fn alive_count(&self) -> usize {
        self.snapshots().iter().filter(|s| s.alive).count()
    }
}
