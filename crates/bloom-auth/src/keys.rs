//! Symmetric secret management for token envelopes.

use crate::error::AuthError;
use rand::RngCore;
use std::fmt;
use std::path::Path;

/// The shared HMAC secret that signs and verifies token envelopes.
///
/// The secret's UTF-8 bytes are the HMAC key. `Debug` never prints it.
#[derive(Clone)]
pub struct TokenSecret {
    value: String,
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

impl TokenSecret {
    /// Wrap an existing secret. Empty secrets are a configuration error.
    pub fn new(value: impl Into<String>) -> Result<Self, AuthError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AuthError::Configuration(
                "token secret must not be empty".into(),
            ));
        }
        Ok(Self { value })
    }

    /// Generate a new random secret (32 bytes, hex-encoded).
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self {
            value: hex::encode(bytes),
        }
    }

    /// HMAC key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.value.as_bytes()
    }

    /// The secret text, for writing it out after generation.
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Save the secret to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), AuthError> {
        std::fs::write(path, &self.value)?;
        Ok(())
    }

    /// Load a secret from a file, ignoring surrounding whitespace.
    pub fn load_from_file(path: &Path) -> Result<Self, AuthError> {
        let value = std::fs::read_to_string(path)?;
        Self::new(value.trim())
    }
}
