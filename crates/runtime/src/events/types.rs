//! Event types for each topic.

use serde::{Deserialize, Serialize};

use director_core::{Directive, GroupBehavior, MacroState};

/// Macro-director output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DirectorEvent {
    /// A directive was published to downstream systems.
    DirectiveIssued {
        directive: Directive,
        /// Session time in seconds.
        session_time: f32,
        /// Escalation scalar at the time of issue.
        escalation: f32,
    },

    /// The committed macro-state changed.
    MacroStateCommitted {
        from: MacroState,
        to: MacroState,
        session_time: f32,
    },
}

/// Group-behavior output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AgentEvent {
    /// One behavior was assigned to every live agent.
    BehaviorBroadcast {
        behavior: GroupBehavior,
        agents: usize,
        session_time: f32,
    },
}
