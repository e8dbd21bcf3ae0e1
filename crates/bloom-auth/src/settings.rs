//! Immutable runtime settings shared by the token builder and verifier.

use crate::error::AuthError;
use crate::keys::TokenSecret;
use bloom_core::{AuthConfig, parse_duration};
use chrono::Duration;

/// Secret, issuer/audience pair and lifetime policy for agent tokens.
///
/// Built once at startup; a missing secret fails here rather than per call.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    secret: TokenSecret,
    issuer: String,
    audience: String,
    token_lifetime: Duration,
    leeway_secs: u64,
}

impl AuthSettings {
    /// Create settings with a 24h token lifetime and 60s envelope leeway.
    pub fn new(
        secret: TokenSecret,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let issuer = issuer.into();
        let audience = audience.into();
        if issuer.trim().is_empty() {
            return Err(AuthError::Configuration("issuer must not be empty".into()));
        }
        if audience.trim().is_empty() {
            return Err(AuthError::Configuration("audience must not be empty".into()));
        }
        Ok(Self {
            secret,
            issuer,
            audience,
            token_lifetime: Duration::hours(24),
            leeway_secs: 60,
        })
    }

    /// Build settings from configuration.
    ///
    /// `secret_override` (e.g. a CLI flag) takes precedence over the
    /// configured secret sources.
    pub fn from_config(
        config: &AuthConfig,
        secret_override: Option<&str>,
    ) -> Result<Self, AuthError> {
        let secret = match secret_override.filter(|s| !s.trim().is_empty()) {
            Some(s) => s.to_string(),
            None => config.resolve_secret()?.ok_or_else(|| {
                AuthError::Configuration(format!(
                    "token secret not found; set {} or auth.secret_file",
                    config.secret_env.as_deref().unwrap_or("auth.secret_env")
                ))
            })?,
        };
        let lifetime = parse_duration(&config.token_lifetime)
            .map_err(|e| AuthError::Configuration(e.to_string()))?;

        Self::new(TokenSecret::new(secret)?, &config.issuer, &config.audience)?
            .with_token_lifetime(lifetime)
            .map(|s| s.with_leeway_secs(config.leeway_secs))
    }

    /// Override the lifetime of issued envelopes.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Result<Self, AuthError> {
        if lifetime <= Duration::zero() {
            return Err(AuthError::Configuration(
                "token lifetime must be positive".into(),
            ));
        }
        self.token_lifetime = lifetime;
        Ok(self)
    }

    /// Override the envelope clock skew leeway.
    pub fn with_leeway_secs(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn secret(&self) -> &TokenSecret {
        &self.secret
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    pub fn leeway_secs(&self) -> u64 {
        self.leeway_secs
    }
}
