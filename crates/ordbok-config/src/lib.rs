use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::generator::{GeneratorConfig, RetryConfig};
use self::lookup::LookupConfig;
use self::storage::StorageConfig;

pub mod generator;
pub mod lookup;
pub mod storage;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub retry: RetryConfig,
    pub lookup: LookupConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Build a config from environment variables, defaults for everything unset
    pub fn new() -> Self {
        Config {
            generator: GeneratorConfig::new(),
            retry: RetryConfig::new(),
            lookup: LookupConfig::new(),
            storage: StorageConfig::new(),
        }
    }

    /// Load a JSON profile. Missing sections take their defaults; an empty
    /// API key in the file is filled from the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&data)?;

        if config.generator.api_key.is_empty() {
            config.generator.api_key = GeneratorConfig::new().api_key;
        }

        Ok(config)
    }

    /// Write the profile, leaving the API key out of the file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut stored = self.clone();
        stored.generator.api_key.clear();
        fs::write(path, serde_json::to_string_pretty(&stored)?)?;
        Ok(())
    }
}
