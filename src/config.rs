//! # Engine Configuration
//!
//! Every tunable of the engine in one serde document. All fields have defaults, so a
//! config file only needs the values it changes:
//!
//! ```json
//! { "seed": 7, "view_distance": 2, "player": { "reach": 6.0 } }
//! ```
//!
//! The file path comes from the first command line argument or the `BUCKLAND_CONFIG`
//! environment variable. A missing file means defaults.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine_state::{
    orchestrator::VIEW_DISTANCE,
    overlay::OverlayConfig,
    player_state::PlayerConfig,
    voxels::{chunk::ChunkDimensions, generation::terrain::TerrainConfig},
};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "BUCKLAND_CONFIG";
pub const DEFAULT_SEED: u32 = 12345;
/// Ticks the headless driver simulates.
pub const DEFAULT_SIMULATED_TICKS: u32 = 600;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u32,
    /// Chunks rendered in each direction around the viewer
    pub view_distance: i32,
    pub chunk: ChunkDimensions,
    pub terrain: TerrainConfig,
    pub player: PlayerConfig,
    /// Real-world footprints; `None` generates plain terrain
    pub overlay: Option<OverlayConfig>,
    pub save_path: Option<PathBuf>,
    /// Background task workers; `0` runs every task inline
    pub worker_threads: usize,
    pub simulated_ticks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            view_distance: VIEW_DISTANCE,
            chunk: ChunkDimensions::default(),
            terrain: TerrainConfig::default(),
            player: PlayerConfig::default(),
            overlay: None,
            save_path: None,
            worker_threads: 4,
            simulated_ticks: DEFAULT_SIMULATED_TICKS,
        }
    }
}

impl EngineConfig {
    /// Reads a config file.
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, `ConfigError::Parse` if it is not a
    /// valid config document.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads the config named by `path`, falling back to defaults when there is no
    /// path or no file at it.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Config path from the command line, then the environment.
    pub fn path_from_env() -> Option<PathBuf> {
        std::env::args_os()
            .nth(1)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR))
            .map(PathBuf::from)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
