// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Node configuration module
//!
//! This module provides configuration structures and logic for the node
//! daemon, supporting different environments and validation of configuration
//! parameters.

use std::{path::PathBuf, time::Duration};

use anyhow::{Result, anyhow, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File};
use http_host::{Endpoint, GracePolicy};
use serde::{Deserialize, Deserializer, Serialize, de};

/// A validated API listen address in `/ip4/<host>/tcp/<port>` notation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenAddr {
    addr: String,
    environment: Environment,
}

impl ListenAddr {
    /// Create a new `ListenAddr`, ensuring it's valid for the given environment
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor does not parse, or if it requests
    /// an OS-assigned port (port 0) outside the testing environment
    pub fn new(addr: impl Into<String>, environment: Environment) -> Result<Self> {
        let addr = addr.into();
        let endpoint: Endpoint = addr
            .parse()
            .map_err(|e| anyhow!("invalid api address: {e}"))?;
        if endpoint.port() == 0 && environment != Environment::Testing {
            return Err(anyhow!(
                "api address port cannot be 0 outside the testing environment"
            ));
        }
        Ok(Self { addr, environment })
    }

    /// Create a safe default address for development
    pub fn default_development() -> Self {
        Self {
            addr: "/ip4/127.0.0.1/tcp/5001".to_owned(),
            environment: Environment::Development,
        }
    }

    /// Create a testing address that lets the OS choose the port
    pub fn testing() -> Self {
        Self {
            addr: "/ip4/127.0.0.1/tcp/0".to_owned(),
            environment: Environment::Testing,
        }
    }

    /// Get the descriptor string
    pub fn value(&self) -> &str {
        &self.addr
    }
}

impl<'de> Deserialize<'de> for ListenAddr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let addr = String::deserialize(deserializer)?;
        addr.parse::<Endpoint>()
            .map_err(|e| de::Error::custom(e.to_string()))?;
        // The environment check happens during configuration loading when we
        // know the environment.
        Ok(Self {
            addr,
            environment: Environment::Development, // temporary, fixed during load
        })
    }
}

/// A validated shutdown-progress cadence in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressIntervalSeconds(Duration);

impl ProgressIntervalSeconds {
    /// Create a new `ProgressIntervalSeconds`, ensuring the value is within
    /// valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if the interval is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "progress interval must be greater than 0");
        ensure!(seconds <= 300, "progress interval cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Create the default cadence (5 seconds)
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Get the cadence as a duration
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for ProgressIntervalSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for ProgressIntervalSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}

/// Node configuration for different environments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// API listen address (validated for environment compatibility)
    pub api_addr: ListenAddr,
    /// Environment type
    pub environment: Environment,
    /// Cadence of "still waiting" records during shutdown (validated range: 1-300)
    pub progress_interval_seconds: ProgressIntervalSeconds,
    /// Where the node's key-value config store is persisted; in-memory if unset
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_addr: ListenAddr::default_development(),
            environment: Environment::Development,
            progress_interval_seconds: ProgressIntervalSeconds::default(),
            store_path: None,
        }
    }
}

impl NodeConfig {
    /// Create configuration from environment variables and optional
    /// configuration files
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or cannot be loaded.
    pub fn from_env() -> Result<Self> {
        Self::load().map_err(|e| anyhow!("failed to load configuration: {e}"))
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override
    /// earlier ones):
    /// 1. Default values
    /// 2. Configuration file (config.json)
    /// 3. Environment-specific files (config.{env}.json)
    /// 4. Environment variables with NODE_ prefix
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let env_var = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut config_builder = Config::builder()
            // Start with default values
            .set_default("api_addr", "/ip4/127.0.0.1/tcp/5001")?
            .set_default("environment", "development")?
            .set_default("progress_interval_seconds", 5)?
            // Add optional configuration files
            .add_source(File::with_name("config.json").required(false))
            // Add environment-specific config file
            .add_source(
                File::with_name(&format!("config.{}.json", env_var.to_lowercase())).required(false),
            )
            // Add environment variables with NODE_ prefix
            .add_source(
                ConfigEnv::with_prefix("NODE")
                    .separator("_")
                    .try_parsing(true),
            );

        if std::env::var("ENVIRONMENT").is_ok() {
            config_builder = config_builder.set_override("environment", env_var.to_lowercase())?;
        }

        let config = config_builder.build()?;
        let mut node_config: Self = config.try_deserialize()?;

        // Fix the ListenAddr to have the correct environment context
        node_config.api_addr = ListenAddr::new(node_config.api_addr.value(), node_config.environment)
            .map_err(|e| ConfigError::Message(format!("invalid api address: {e}")))?;

        Ok(node_config)
    }

    /// Create configuration optimized for testing
    pub fn for_testing() -> Self {
        Self {
            api_addr: ListenAddr::testing(), // let OS choose available port
            environment: Environment::Testing,
            progress_interval_seconds: ProgressIntervalSeconds::default(),
            store_path: None,
        }
    }

    /// Shutdown-progress cadence as a coordinator policy
    pub fn grace_policy(&self) -> GracePolicy {
        GracePolicy {
            progress_interval: self.progress_interval_seconds.value(),
        }
    }
}
