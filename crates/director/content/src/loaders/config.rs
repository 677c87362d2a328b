//! Director configuration loader.

use std::path::Path;

use director_core::DirectorConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for director configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing sections and fields keep their defaults. The result is
    /// validated before it is returned.
    pub fn load(path: &Path) -> LoadResult<DirectorConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config TOML from a string.
    pub fn parse(content: &str) -> LoadResult<DirectorConfig> {
        let config: DirectorConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid director config: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use director_core::TaskFlags;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
            [mdp]
            gamma = 0.8
            seed = 7

            [coordinator]
            mdp_interval = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(config.mdp.gamma, 0.8);
        assert_eq!(config.mdp.seed, 7);
        assert_eq!(config.mdp.confirm_secs, 0.8);
        assert_eq!(config.coordinator.mdp_interval, 1.5);
        assert_eq!(config.coordinator.tasks, TaskFlags::all());
        assert_eq!(config.cache.nearby_cap, 3);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = ConfigLoader::parse("[estimator]\ndps_alpha = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("estimator.dps_alpha"));
    }

    #[test]
    fn loads_shipped_sample() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/director.toml");
        let config = ConfigLoader::load(&path).unwrap();
        assert!(config.coordinator.tasks.is_combined());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[policy]\nexploration_bias = 0.05").unwrap();
        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.policy.exploration_bias, 0.05);

        assert!(ConfigLoader::load(Path::new("/nonexistent/director.toml")).is_err());
    }
}
