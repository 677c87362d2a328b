//! Repository contract for persisted player profiles.

use director_core::PlayerProfile;

use super::Result;

/// Repository for profile snapshots, indexed by a slot name.
///
/// Slot names are ASCII alphanumerics, `-` and `_`.
pub trait ProfileRepository: Send + Sync {
    /// Save a profile, replacing any previous snapshot in the slot.
    fn save(&self, slot: &str, profile: &PlayerProfile) -> Result<()>;

    /// Load the profile stored in a slot.
    fn load(&self, slot: &str) -> Result<Option<PlayerProfile>>;

    /// Check if a slot holds a profile.
    fn exists(&self, slot: &str) -> bool;

    /// Delete a slot. Deleting an empty slot is not an error.
    fn delete(&self, slot: &str) -> Result<()>;

    /// List all occupied slots, sorted.
    fn list_slots(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}
