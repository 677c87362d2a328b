//! Registry of hostile agents and their shared behavior.

use std::collections::BTreeMap;

use glam::Vec2;

use director_core::{AgentId, AgentRegistry, AgentSnapshot, GroupBehavior};

/// Per-agent record kept by the roster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RosterEntry {
    pub position: Vec2,
    pub alive: bool,
    pub behavior: GroupBehavior,
}

/// Agents keyed by id. Iteration follows id order, so snapshots are stable
/// across runs.
#[derive(Clone, Debug, Default)]
pub struct AgentRoster {
    agents: BTreeMap<AgentId, RosterEntry>,
    default_behavior: GroupBehavior,
}

impl AgentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behavior assigned to agents at registration.
    pub fn with_default_behavior(mut self, behavior: GroupBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    pub fn default_behavior(&self) -> GroupBehavior {
        self.default_behavior
    }

    pub fn get(&self, id: AgentId) -> Option<&RosterEntry> {
        self.agents.get(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Updates a live agent's position. Returns whether the agent was known.
    pub fn move_to(&mut self, id: AgentId, position: Vec2) -> bool {
        match self.agents.get_mut(&id) {
            Some(entry) => {
                entry.position = position;
                true
            }
            None => false,
        }
    }

    /// Marks an agent dead without removing it. Returns whether a live agent
    /// was killed.
    pub fn mark_dead(&mut self, id: AgentId) -> bool {
        match self.agents.get_mut(&id) {
            Some(entry) if entry.alive => {
                entry.alive = false;
                true
            }
            _ => false,
        }
    }

    /// Drops every dead agent.
    pub fn prune_dead(&mut self) -> usize {
        let before = self.agents.len();
        self.agents.retain(|_, entry| entry.alive);
        before - self.agents.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.keys().copied()
    }
}

impl AgentRegistry for AgentRoster {
    fn register(&mut self, id: AgentId, position: Vec2) {
        let entry = RosterEntry {
            position,
            alive: true,
            behavior: self.default_behavior,
        };
        if self.agents.insert(id, entry).is_some() {
            tracing::debug!("AgentRoster: {} re-registered", id);
        }
    }

    fn unregister(&mut self, id: AgentId) {
        self.agents.remove(&id);
    }

    fn broadcast_behavior(&mut self, id: AgentId, behavior: GroupBehavior) {
        if let Some(entry) = self.agents.get_mut(&id).filter(|e| e.alive) {
            entry.behavior = behavior;
        }
    }

    fn is_alive(&self, id: AgentId) -> bool {
        self.agents.get(&id).is_some_and(|e| e.alive)
    }

    fn position(&self, id: AgentId) -> Option<Vec2> {
        self.agents.get(&id).map(|e| e.position)
    }

    fn behavior(&self, id: AgentId) -> Option<GroupBehavior> {
        self.agents.get(&id).map(|e| e.behavior)
    }

    fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents
            .iter()
            .map(|(&id, e)| AgentSnapshot::new(id, e.position, e.alive))
            .collect()
    }

    fn alive_count(&self) -> usize {
        self.agents.values().filter(|e| e.alive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agents_start_with_default_behavior() {
        let mut roster = AgentRoster::new().with_default_behavior(GroupBehavior::Cluster);
        roster.register(AgentId(1), Vec2::ZERO);
        assert_eq!(roster.behavior(AgentId(1)), Some(GroupBehavior::Cluster));
        assert_eq!(
            AgentRoster::new().default_behavior(),
            GroupBehavior::Aggressive
        );
    }

    #[test]
    fn broadcast_skips_dead_agents() {
        let mut roster = AgentRoster::new();
        roster.register(AgentId(1), Vec2::ZERO);
        roster.register(AgentId(2), Vec2::ONE);
        assert!(roster.mark_dead(AgentId(2)));
        assert!(!roster.mark_dead(AgentId(2)));

        for id in [AgentId(1), AgentId(2), AgentId(9)] {
            roster.broadcast_behavior(id, GroupBehavior::Scatter);
        }
        assert_eq!(roster.behavior(AgentId(1)), Some(GroupBehavior::Scatter));
        assert_eq!(roster.behavior(AgentId(2)), Some(GroupBehavior::Aggressive));
        assert_eq!(roster.alive_count(), 1);
        assert_eq!(roster.snapshots().len(), 2);

        assert_eq!(roster.prune_dead(), 1);
        assert!(!roster.is_alive(AgentId(2)));
        assert_eq!(roster.position(AgentId(2)), None);
    }
}
