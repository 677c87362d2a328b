//! File-based ProfileRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use director_core::PlayerProfile;

use crate::repository::error::validate_slot;
use crate::repository::{ProfileRepository, RepositoryError, Result};

/// File-based implementation of ProfileRepository.
///
/// # File Format
///
/// Profiles are stored as `profile_{slot}.json`. The profile is a flat record
/// whose fields all default, so snapshots written by older builds keep
/// loading after fields are added.
pub struct FileProfileRepository {
    base_dir: PathBuf,
}

impl FileProfileRepository {
    /// Create a new file-based profile repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    /// Repository under the platform data directory.
    pub fn in_default_dir() -> Result<Self> {
        Self::new(Self::default_dir())
    }

    /// Platform data directory for profiles, falling back to
    /// `./save_data/profiles` when no home directory is available.
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "director")
            .map(|dirs| dirs.data_dir().join("profiles"))
            .unwrap_or_else(|| PathBuf::from("./save_data/profiles"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn profile_path(&self, slot: &str) -> PathBuf {
        self.base_dir.join(format!("profile_{}.json", slot))
    }
}

impl ProfileRepository for FileProfileRepository {
    fn save(&self, slot: &str, profile: &PlayerProfile) -> Result<()> {
        validate_slot(slot)?;
        let path = self.profile_path(slot);
        let temp_path = path.with_extension("json.tmp");

        let bytes =
            serde_json::to_vec_pretty(profile).map_err(|e| RepositoryError::Json(e.to_string()))?;

        // Write to temp file, then rename so readers never see a partial file
        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved profile[{}] to {}", slot, path.display());

        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<PlayerProfile>> {
        validate_slot(slot)?;
        let path = self.profile_path(slot);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(RepositoryError::Io)?;
        let profile: PlayerProfile =
            serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Json(e.to_string()))?;

        tracing::debug!("Loaded profile[{}] from {}", slot, path.display());

        Ok(Some(profile))
    }

    fn exists(&self, slot: &str) -> bool {
        validate_slot(slot).is_ok() && self.profile_path(slot).exists()
    }

    fn delete(&self, slot: &str) -> Result<()> {
        validate_slot(slot)?;
        let path = self.profile_path(slot);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted profile[{}]", slot);
        }

        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let mut slots = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(slot) = filename
                    .strip_prefix("profile_")
                    .and_then(|s| s.strip_suffix(".json"))
                && validate_slot(slot).is_ok()
            {
                slots.push(slot.to_string());
            }
        }

        slots.sort_unstable();
        Ok(slots)
    }
}
