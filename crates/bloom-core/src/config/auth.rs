//! Agent token configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for agent token issuance and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable containing the symmetric token secret.
    #[serde(default = "default_secret_env")]
    pub secret_env: Option<String>,

    /// Path to a file containing the symmetric token secret.
    #[serde(default)]
    pub secret_file: Option<PathBuf>,

    /// Envelope issuer (`iss`).
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Envelope audience (`aud`).
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Lifetime of newly issued tokens (e.g., "24h", "7d").
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime: String,

    /// Clock skew tolerated on the envelope `exp`, in seconds.
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_env: default_secret_env(),
            secret_file: None,
            issuer: default_issuer(),
            audience: default_audience(),
            token_lifetime: default_token_lifetime(),
            leeway_secs: default_leeway_secs(),
        }
    }
}

impl AuthConfig {
    /// Resolve the token secret from environment or file.
    ///
    /// Empty values are treated as absent.
    pub fn resolve_secret(&self) -> Result<Option<String>, std::io::Error> {
        // Try environment variable first
        if let Some(env_var) = &self.secret_env {
            if let Ok(secret) = std::env::var(env_var) {
                if !secret.trim().is_empty() {
                    return Ok(Some(secret));
                }
            }
        }

        if let Some(path) = &self.secret_file {
            if path.exists() {
                let secret = std::fs::read_to_string(path)?;
                let secret = secret.trim();
                if !secret.is_empty() {
                    return Ok(Some(secret.to_string()));
                }
            }
        }

        Ok(None)
    }
}

fn default_secret_env() -> Option<String> {
    Some("JWT_SECRET".to_string())
}

fn default_issuer() -> String {
    "bloom-protocol".to_string()
}

fn default_audience() -> String {
    "bloom-dashboard".to_string()
}

fn default_token_lifetime() -> String {
    "24h".to_string()
}

fn default_leeway_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_secret_from_env() {
        // SAFETY: We're in a test and the variable name is unique to it
        unsafe {
            std::env::set_var("BLOOM_TEST_RESOLVE_ENV_SECRET", "from-env");
        }
        let config = AuthConfig {
            secret_env: Some("BLOOM_TEST_RESOLVE_ENV_SECRET".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_secret().unwrap().as_deref(), Some("from-env"));
    }

    #[test]
    fn test_resolve_secret_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  from-file  ").unwrap();

        let config = AuthConfig {
            secret_env: Some("BLOOM_TEST_UNSET_SECRET_VAR".to_string()),
            secret_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_secret().unwrap().as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_resolve_secret_absent() {
        let config = AuthConfig {
            secret_env: Some("BLOOM_TEST_UNSET_SECRET_VAR".to_string()),
            secret_file: Some(PathBuf::from("/nonexistent/bloom/secret")),
            ..Default::default()
        };
        assert!(config.resolve_secret().unwrap().is_none());
    }
}
