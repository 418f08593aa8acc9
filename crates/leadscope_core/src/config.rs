//! Layered configuration for the CRM core.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`LEADSCOPE_*`, `__` separates sections)
//! 2. `leadscope.toml` in the working directory (or an explicit file)
//! 3. Built-in defaults
//!
//! `LEADSCOPE_DATABASE__PATH` maps to `database.path`,
//! `LEADSCOPE_INVITE__SENDER` to `invite.sender`, and so on.

use crate::model::identity::is_plausible_email;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "leadscope.toml";
pub const ENV_PREFIX: &str = "LEADSCOPE_";

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_sender() -> String {
    "admin@test.com".to_string()
}

fn default_invite_subject() -> String {
    "You are invited to be an agent.".to_string()
}

fn default_invite_message() -> String {
    "You were added as an agent on LeadScope. Login to start working.".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub invite: InviteConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file. `None` keeps the store in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Falls back to `default_log_level()` when unset.
    #[serde(default)]
    pub level: Option<String>,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    #[serde(default)]
    pub dir: Option<String>,
}

/// Copy for the agent invitation sent after provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InviteConfig {
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_invite_subject")]
    pub subject: String,
    #[serde(default = "default_invite_message")]
    pub message: String,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            subject: default_invite_subject(),
            message: default_invite_message(),
        }
    }
}

impl CoreConfig {
    /// Loads defaults, `leadscope.toml` from the working directory, then env.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment(Path::new(CONFIG_FILE_NAME)))
    }

    /// Same as [`CoreConfig::load`] with an explicit TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::extract(Self::figment(path.as_ref()))
    }

    /// Provider chain; public so tests can layer extra providers on top.
    pub fn figment(toml_path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if toml_path.exists() {
            figment = figment.merge(Toml::file(toml_path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.busy_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.busy_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if !is_plausible_email(self.invite.sender.trim()) {
            return Err(ConfigError::InvalidValue {
                field: "invite.sender".to_string(),
                reason: format!("`{}` is not an email address", self.invite.sender),
            });
        }
        if self.invite.subject.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "invite.subject".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }
}
