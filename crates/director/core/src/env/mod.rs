//! Traits describing everything outside the director.
//!
//! Telemetry flows in through [`PlayerTelemetrySource`] and
//! [`TelemetryEvent`]; side effects flow out through the sink traits. The
//! [`Effects`] aggregate bundles the sinks so the planner can reach whichever
//! are wired without hard coupling to concrete implementations.
mod agents;
mod rng;
mod sinks;
mod telemetry;

pub use agents::{AgentId, AgentRegistry, AgentSnapshot};
pub use rng::{DirectorRng, roulette, seeded};
pub use sinks::{CurseSink, Difficulty, EventQueue, LootBiasSink, WaveQueue};
pub use telemetry::{PlayerTelemetrySource, TelemetryEvent, TelemetrySnapshot};

/// Mutable borrows of the side-effect sinks for one planner step.
///
/// A missing sink skips its side effect; the planner still updates its own
/// state.
#[derive(Default)]
pub struct Effects<'a> {
    waves: Option<&'a mut dyn WaveQueue>,
    events: Option<&'a mut dyn EventQueue>,
    loot: Option<&'a mut dyn LootBiasSink>,
    curse: Option<&'a mut dyn CurseSink>,
}

impl<'a> Effects<'a> {
    /// Creates an aggregate with no sinks wired.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_waves(mut self, waves: &'a mut dyn WaveQueue) -> Self {
        self.waves = Some(waves);
        self
    }

    pub fn with_events(mut self, events: &'a mut dyn EventQueue) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_loot(mut self, loot: &'a mut dyn LootBiasSink) -> Self {
        self.loot = Some(loot);
        self
    }

    pub fn with_curse(mut self, curse: &'a mut dyn CurseSink) -> Self {
        self.curse = Some(curse);
        self
    }

    pub fn waves(&mut self) -> Option<&mut (dyn WaveQueue + 'a)> {
        self.waves.as_deref_mut()
    }

    pub fn events(&mut self) -> Option<&mut (dyn EventQueue + 'a)> {
        self.events.as_deref_mut()
    }

    pub fn loot(&mut self) -> Option<&mut (dyn LootBiasSink + 'a)> {
        self.loot.as_deref_mut()
    }

    pub fn curse(&mut self) -> Option<&mut (dyn CurseSink + 'a)> {
        self.curse.as_deref_mut()
    }
}
