//! Configuration module for the Makai Trie Server.
//!
//! This module provides a configuration system that can load the server
//! document from files (TOML, YAML, JSON) and override values with
//! environment variables. All configuration values are validated for
//! correctness before use.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError as ExternalConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::config::ConfigError;

pub mod aof;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A trait for types that can be validated.
pub trait Validate {
    /// Validates that the configuration is correct.
    fn validate(&self) -> ConfigResult<()>;
}

/// Main configuration document for the Makai Trie Server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakaiConfig {
    /// Bind address handed to the front-end.
    pub addr: SocketAddr,

    /// Append-only file configuration.
    pub aof: aof::AofConfig,

    /// Whether to expose debug facilities.
    pub debug: bool,

    /// Log configuration.
    pub log: LogConfig,
}

impl Default for MakaiConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            aof: aof::AofConfig::default(),
            debug: false,
            log: LogConfig::default(),
        }
    }
}

impl Validate for MakaiConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.aof.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Whether to log in JSON format.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "Invalid log level: {other}"
            ))),
        }
    }
}

/// Configuration loader for the Makai Trie Server.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to the configuration file
    /// * `env_prefix` - Prefix for environment variables that override configuration values
    pub fn new<P: AsRef<Path>>(config_path: Option<P>, env_prefix: &str) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Loads the configuration from a file and environment variables.
    pub fn load(&self) -> ConfigResult<MakaiConfig> {
        let mut builder = Config::builder();

        // Add default configuration values
        builder = builder.add_source(
            Config::try_from(&MakaiConfig::default())
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
        );

        // Add configuration from file if provided
        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }

            let Some(path_str) = path.to_str() else {
                return Err(ConfigError::ParseError(format!(
                    "Configuration path is not valid UTF-8: {path:?}"
                )));
            };

            builder = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => builder.add_source(File::with_name(path_str)),
                Some("json") => builder
                    .add_source(File::with_name(path_str).format(config::FileFormat::Json)),
                Some("yaml" | "yml") => builder
                    .add_source(File::with_name(path_str).format(config::FileFormat::Yaml)),
                _ => {
                    return Err(ConfigError::ParseError(format!(
                        "Unsupported file extension for: {path:?}"
                    )))
                }
            };
        }

        // Add environment variables with prefix
        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        // Build the configuration
        let config = builder.build().map_err(|e| match e {
            ExternalConfigError::NotFound(path) => ConfigError::FileNotFound(PathBuf::from(path)),
            ExternalConfigError::PathParse(path) => {
                ConfigError::ParseError(format!("Invalid path: {path:?}"))
            }
            ExternalConfigError::FileParse { .. } => {
                ConfigError::ParseError("Error parsing config file".to_string())
            }
            ExternalConfigError::Foreign(err) => ConfigError::ParseError(err.to_string()),
            ExternalConfigError::Frozen => {
                ConfigError::ParseError("Configuration is frozen".to_string())
            }
            ExternalConfigError::Message(msg) => ConfigError::ParseError(msg),
            ExternalConfigError::Type { .. } => {
                ConfigError::ParseError("Type conversion error".to_string())
            }
        })?;

        // Deserialize the configuration
        let makai_config: MakaiConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Validate the configuration
        makai_config.validate()?;

        Ok(makai_config)
    }
}
