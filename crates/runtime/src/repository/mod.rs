//! Repository layer for player profiles carried across runs.
//!
//! Only the flat [`PlayerProfile`](director_core::PlayerProfile) snapshot is
//! persisted. Learned bandit weights and macro-state are session state and are
//! never written out.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileProfileRepository;
pub use memory::InMemoryProfileRepository;
pub use traits::ProfileRepository;
