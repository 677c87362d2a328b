//! Recording wave and event queues.

use serde::{Deserialize, Serialize};

use director_core::{Difficulty, EventQueue, TimePhase, WaveQueue};

/// One spawn or event request as the director issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedRequest {
    pub phase: TimePhase,
    pub difficulty: Difficulty,
}

/// Pending wave requests, drained by whatever spawns units.
#[derive(Clone, Debug, Default)]
pub struct WaveLog {
    pending: Vec<QueuedRequest>,
    total: usize,
}

impl WaveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[QueuedRequest] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Requests issued since creation, drained or not.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn drain(&mut self) -> Vec<QueuedRequest> {
        std::mem::take(&mut self.pending)
    }
}

impl WaveQueue for WaveLog {
    fn enqueue(&mut self, phase: TimePhase, difficulty: Difficulty) {
        self.pending.push(QueuedRequest { phase, difficulty });
        self.total += 1;
    }
}

/// Pending scripted-event triggers.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pending: Vec<QueuedRequest>,
    total: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[QueuedRequest] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn drain(&mut self) -> Vec<QueuedRequest> {
        std::mem::take(&mut self.pending)
    }
}

impl EventQueue for EventLog {
    fn enqueue(&mut self, phase: TimePhase, difficulty: Difficulty) {
        self.pending.push(QueuedRequest { phase, difficulty });
        self.total += 1;
    }
}
