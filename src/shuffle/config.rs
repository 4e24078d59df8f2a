//! Shuffle configuration
//!
//! Loaded from an optional JSON file, then overridden by command-line
//! flags. All fields have defaults, so an empty object `{}` is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{ShuffleError, ShuffleResult};

/// Default number of lines held in memory per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

/// Configuration for a single shuffle run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShuffleConfig {
    /// Upper bound on lines held in memory at once (must be > 0)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Parent directory for the run's temporary chunk directory.
    /// Falls back to the system temp directory.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// RNG seed; the same seed on the same input gives the same output
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            temp_dir: None,
            seed: None,
        }
    }
}

impl ShuffleConfig {
    /// Config with the given chunk size and defaults elsewhere
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ShuffleResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ShuffleError::io_at_path("Failed to read config", path, e))?;

        let config: ShuffleConfig = serde_json::from_str(&content).map_err(|e| {
            ShuffleError::invalid_config(format!("Invalid config JSON in {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ShuffleResult<()> {
        if self.chunk_size == 0 {
            return Err(ShuffleError::invalid_config("chunk_size must be > 0"));
        }

        if let Some(dir) = &self.temp_dir {
            if !dir.is_dir() {
                return Err(ShuffleError::invalid_config(format!(
                    "temp_dir is not a directory: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}
