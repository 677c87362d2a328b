//! In-memory implementations of the director's outbound collaborators.
//!
//! Hosts that own real spawners, drop tables or enemies implement the
//! `director-core` sink traits themselves; these versions keep the state the
//! director needs and record every request so headless drivers and tests can
//! inspect it.
mod curse;
mod loot;
mod queues;
mod roster;

pub use curse::CurseLedger;
pub use loot::{LootTable, Upgrade, UpgradeOffer};
pub use queues::{EventLog, QueuedRequest, WaveLog};
pub use roster::{AgentRoster, RosterEntry};
