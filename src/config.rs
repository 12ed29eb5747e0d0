//! Configuration management for MediLedger

use crate::error::{LedgerError, Result};
use crate::miner::{SearchLimits, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Leading hex zeros a proof hash needs.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    #[serde(default = "default_genesis_proof")]
    pub genesis_proof: u64,
    #[serde(default = "default_genesis_previous_hash")]
    pub genesis_previous_hash: String,
    #[serde(default)]
    pub max_attempts: Option<u64>,
    #[serde(default)]
    pub max_search_millis: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            genesis_proof: default_genesis_proof(),
            genesis_previous_hash: default_genesis_previous_hash(),
            max_attempts: None,
            max_search_millis: None,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.difficulty == 0 || self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::InvalidDifficulty(self.difficulty));
        }
        if self.genesis_previous_hash.is_empty() {
            return Err(LedgerError::Config(
                "ledger.genesis_previous_hash must not be empty".to_string(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(LedgerError::Config(
                "ledger.max_attempts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_attempts: self.max_attempts,
            max_duration: self.max_search_millis.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

fn default_genesis_proof() -> u64 {
    crate::blockchain::GENESIS_PROOF
}

fn default_genesis_previous_hash() -> String {
    crate::blockchain::GENESIS_PREVIOUS_HASH.to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse and validate a configuration document.
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)?;

    config.ledger.validate()?;
    if config.api.port == 0 {
        return Err(LedgerError::Config("api.port must be set".to_string()));
    }

    Ok(config)
}

/// Load `path`, falling back to defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}
