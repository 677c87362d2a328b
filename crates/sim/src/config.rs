//! Simulation configuration read from the environment.
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use director_content::ConfigLoader;
use director_core::DirectorConfig;

/// Settings for one headless run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub director: DirectorConfig,
    /// Simulated seconds to run.
    pub duration_secs: f32,
    /// Fixed step fed to every director tick.
    pub tick_secs: f32,
    /// Agents alive at the start of the run.
    pub agents: u32,
    pub seed: u64,
    /// Seconds between level-up upgrade draws.
    pub upgrade_interval_secs: f32,
    /// Continue from the profile saved by the previous run.
    pub continue_run: bool,
    pub profile_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl SimConfig {
    pub const DEFAULT_DURATION_SECS: f32 = 600.0;
    pub const DEFAULT_TICK_SECS: f32 = 0.1;
    pub const DEFAULT_AGENTS: u32 = 12;
    pub const DEFAULT_SEED: u64 = 0x5EED;
    pub const DEFAULT_UPGRADE_INTERVAL_SECS: f32 = 30.0;

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DIRECTOR_CONFIG` - TOML director configuration (default: built-in)
    /// - `SIM_DURATION_SECS` - simulated run length (default: 600)
    /// - `SIM_TICK_SECS` - tick step (default: 0.1)
    /// - `SIM_AGENTS` - starting agent count (default: 12)
    /// - `SIM_SEED` - seed for the world and the director (default: 0x5EED)
    /// - `SIM_UPGRADE_SECS` - seconds between upgrade draws (default: 30)
    /// - `SIM_CONTINUE` - continue from the saved profile (default: false)
    /// - `DIRECTOR_PROFILE_DIR` - profile directory (default: platform data dir)
    /// - `DIRECTOR_LOG_DIR` - write logs to `sim.log` here instead of stderr
    pub fn from_env() -> Result<Self> {
        let mut director = match env::var_os("DIRECTOR_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                ConfigLoader::load(&path)
                    .with_context(|| format!("loading director config {}", path.display()))?
            }
            None => DirectorConfig::default(),
        };

        let seed = read_env::<u64>("SIM_SEED").unwrap_or(Self::DEFAULT_SEED);
        if env::var_os("SIM_SEED").is_some() {
            director.mdp.seed = seed;
            director.policy.seed = seed.rotate_left(17);
        }

        let tick_secs = read_env::<f32>("SIM_TICK_SECS")
            .filter(|dt| *dt > 0.0)
            .unwrap_or(Self::DEFAULT_TICK_SECS);

        Ok(Self {
            director,
            duration_secs: read_env("SIM_DURATION_SECS").unwrap_or(Self::DEFAULT_DURATION_SECS),
            tick_secs,
            agents: read_env("SIM_AGENTS").unwrap_or(Self::DEFAULT_AGENTS),
            seed,
            upgrade_interval_secs: read_env::<f32>("SIM_UPGRADE_SECS")
                .filter(|secs| *secs > 0.0)
                .unwrap_or(Self::DEFAULT_UPGRADE_INTERVAL_SECS),
            continue_run: read_env_bool("SIM_CONTINUE").unwrap_or(false),
            profile_dir: env::var_os("DIRECTOR_PROFILE_DIR").map(PathBuf::from),
            log_dir: env::var_os("DIRECTOR_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Number of fixed steps covering the run.
    pub fn steps(&self) -> u32 {
        (self.duration_secs.max(0.0) / self.tick_secs).ceil() as u32
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
