// Configuration management for Courier

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log level names accepted in `logging.level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

/// Format names accepted in `logging.format`
pub const LOG_FORMATS: &[&str] = &["json", "plain", "pretty", "compact"];

/// Top-level Courier configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    pub queue: QueueSettings,
    pub logging: LoggingSettings,
}

/// Queued event delivery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Channel capacity; `None` keeps the queue unbounded
    pub capacity: Option<usize>,

    /// Keep consuming after a subscriber fails
    pub continue_on_error: bool,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: None,
            continue_on_error: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
    /// Include the module path of each record
    pub targets: bool,
    /// Filter directive overriding `level`
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            targets: true,
            filter: None,
        }
    }
}

impl CourierConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `COURIER_*` environment overrides. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        EnvLoader::default().apply(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Read a `.env` file into the process environment, then [`load`](Self::load).
    ///
    /// A missing default `.env` file is not an error; an explicit path that
    /// cannot be read is.
    pub fn load_dotenv(dotenv: Option<&Path>, path: Option<&Path>) -> Result<Self> {
        match dotenv {
            Some(dotenv) => {
                dotenvy::from_path(dotenv).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::load(path)
    }

    /// Parse a JSON or TOML file, without environment overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        serde_json::from_value(value).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }
}

impl Validate for CourierConfig {
    fn validate(&self) -> Result<()> {
        self.queue.validate()?;
        self.logging.validate()
    }
}

impl Validate for QueueSettings {
    fn validate(&self) -> Result<()> {
        if let Some(capacity) = self.capacity {
            ConfigValidator::positive(capacity, "queue.capacity")?;
        }
        Ok(())
    }
}

impl Validate for LoggingSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::one_of(&self.level, LOG_LEVELS, "logging.level")?;
        ConfigValidator::one_of(&self.format, LOG_FORMATS, "logging.format")
    }
}
