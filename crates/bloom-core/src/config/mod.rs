//! Configuration types for Bloom agent authentication.
//!
//! Configuration is loaded from a single YAML file (`bloom.yaml`). Every
//! section has defaults, so an absent file yields a usable configuration as
//! long as the token secret is supplied through the environment.
//!
//! # Sections
//!
//! - **auth**: token secret source, issuer/audience pair, token lifetime
//! - **wallet**: wallet storage directory and network
//! - **dashboard**: dashboard base URL used when rendering token links

pub mod auth;
pub mod dashboard;
pub mod wallet;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use auth::AuthConfig;
pub use dashboard::DashboardConfig;
pub use wallet::{Network, WalletConfig};

/// Complete Bloom configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BloomConfig {
    /// Token issuance and verification settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Agent wallet settings.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Dashboard settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BloomConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Check values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.issuer.trim().is_empty() {
            return Err(ConfigError::Config("auth.issuer must not be empty".into()));
        }
        if self.auth.audience.trim().is_empty() {
            return Err(ConfigError::Config("auth.audience must not be empty".into()));
        }
        let lifetime = parse_duration(&self.auth.token_lifetime)?;
        if lifetime <= chrono::Duration::zero() {
            return Err(ConfigError::Config(
                "auth.token_lifetime must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Parse a duration string like "24h", "7d", "30m" or "60s".
///
/// A bare number is read as hours.
pub fn parse_duration(s: &str) -> Result<chrono::Duration, ConfigError> {
    let s = s.trim().to_lowercase();
    let invalid = || ConfigError::Config(format!("invalid duration: '{}'", s));

    let (digits, unit) = match s.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&s[..idx], Some(c)),
        Some(_) => (s.as_str(), None),
        None => return Err(invalid()),
    };
    let value: i64 = digits.trim().parse().map_err(|_| invalid())?;

    let duration = match unit {
        Some('d') => chrono::Duration::try_days(value),
        Some('h') | None => chrono::Duration::try_hours(value),
        Some('m') => chrono::Duration::try_minutes(value),
        Some('s') => chrono::Duration::try_seconds(value),
        Some(_) => return Err(invalid()),
    };
    duration.ok_or_else(|| ConfigError::Config(format!("duration out of range: '{}'", s)))
}
