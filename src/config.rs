use config::{Config, ConfigError};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub storage: StorageConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
    pub snapshot_file: String,
}

/// Backoff budget for the second phase of compound operations.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RetryConfig {
    pub attempts: u32,
    pub base_delay_ms: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name("config/default.yaml"))
            .add_source(config::Environment::with_prefix("APP"));

        let config = builder.build()?;
        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: "data".to_string(),
                snapshot_file: "marketplace.json".to_string(),
            },
            retry: RetryConfig {
                attempts: 2,
                base_delay_ms: 100,
            },
        }
    }
}
