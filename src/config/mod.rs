use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::FixtureError;
use crate::lifecycle::{DEFAULT_NAME_PREFIX, DEFAULT_READY_TOKEN, DEFAULT_REPOSITORY, DEFAULT_TAG};
use crate::runtime::DEFAULT_CEILING;
use crate::services::ServiceSet;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "localstack-fixture.toml";

/// Main configuration for localstack-fixture
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Services started by default, in readiness order
    pub services: Vec<String>,
    /// Localstack image
    pub image: ImageConfig,
    /// Readiness wait settings
    pub readiness: ReadinessConfig,
    /// Created container settings
    pub container: ContainerConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            services: vec!["s3".to_string(), "sqs".to_string()],
            image: ImageConfig::default(),
            readiness: ReadinessConfig::default(),
            container: ContainerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Image configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Docker repository
    pub repository: String,
    /// Image tag
    pub tag: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            tag: DEFAULT_TAG.to_string(),
        }
    }
}

/// Readiness configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Marker searched for in the container logs
    pub token: String,
    /// Give up waiting for a service after this many seconds
    pub timeout_secs: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_READY_TOKEN.to_string(),
            timeout_secs: DEFAULT_CEILING.as_secs(),
        }
    }
}

/// Container configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Prefix for container names
    pub name_prefix: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl FixtureConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse localstack-fixture.toml")
    }

    /// Load configuration
    ///
    /// An explicit path wins. Otherwise `localstack-fixture.toml` in the
    /// working directory, then the one in the user config directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::from_file(&local);
        }

        match Self::user_config_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Config file in the per-user config directory
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "localstack-fixture")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Configured services as a [`ServiceSet`]
    pub fn service_set(&self) -> crate::error::Result<ServiceSet> {
        ServiceSet::from_names(&self.services)
    }

    /// Check values the file format cannot express
    pub fn validate(&self) -> crate::error::Result<()> {
        let reason = if self.image.repository.trim().is_empty() {
            "image.repository must not be empty"
        } else if self.image.tag.trim().is_empty() {
            "image.tag must not be empty"
        } else if self.readiness.token.is_empty() {
            "readiness.token must not be empty"
        } else if self.readiness.timeout_secs == 0 {
            "readiness.timeout_secs must be greater than zero"
        } else {
            return self.service_set().map(|_| ());
        };

        Err(FixtureError::Config {
            reason: reason.to_string(),
        })
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Generate a default config file content
    pub fn default_config_string() -> String {
        r#"# localstack-fixture configuration

# Services to start, in the order they are waited for.
# Run `localstack-fixture services` for the full list.
services = ["s3", "sqs"]

[image]
# Docker repository
repository = "localstack/localstack"
# Image tag (0.9.1 is the last tested release)
tag = "latest"

[readiness]
# Marker Localstack prints once its services are up
token = "Ready."
# Maximum wait per service in seconds
timeout_secs = 300

[container]
# Created containers are named <prefix>-<8 hex chars>
name_prefix = "localstack-fixture"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"
"#
        .to_string()
    }
}
