//! Topic-based event bus for director events.
//!
//! The worker publishes every directive, committed macro-state and behavior
//! broadcast; consumers subscribe only to the topics they need. Publishing is
//! best-effort and never blocks the tick.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{AgentEvent, DirectorEvent};
