//! Worker tasks that back the runtime orchestration.
//!
//! The director worker owns the coordinator and every collaborator; the only
//! way in is its command channel, so one whole tick is applied before the
//! next command is read.

mod director;

pub use director::{Command, DirectorWorker};
