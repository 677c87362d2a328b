//! In-memory ProfileRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use director_core::PlayerProfile;

use crate::repository::error::validate_slot;
use crate::repository::{ProfileRepository, RepositoryError, Result};

/// In-memory implementation of ProfileRepository.
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<String, PlayerProfile>>,
}

impl InMemoryProfileRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn save(&self, slot: &str, profile: &PlayerProfile) -> Result<()> {
        validate_slot(slot)?;
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        profiles.insert(slot.to_string(), profile.clone());
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<PlayerProfile>> {
        validate_slot(slot)?;
        let profiles = self
            .profiles
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(profiles.get(slot).cloned())
    }

    fn exists(&self, slot: &str) -> bool {
        self.profiles
            .read()
            .map(|profiles| profiles.contains_key(slot))
            .unwrap_or(false)
    }

    fn delete(&self, slot: &str) -> Result<()> {
        validate_slot(slot)?;
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        profiles.remove(slot);
        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut slots: Vec<String> = profiles.keys().cloned().collect();
        slots.sort_unstable();
        Ok(slots)
    }
}
