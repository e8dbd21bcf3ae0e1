//! Token claims and the signed payload carried inside the envelope.

use crate::error::AuthError;
use crate::wallet::{is_valid_address, normalize_address};
use bloom_core::IdentityData;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the payload `type` field.
pub const TOKEN_TYPE: &str = "agent";

/// Value of the payload `version` field.
pub const TOKEN_VERSION: &str = "1.0";

/// Facts an agent token asserts about its wallet, before signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentClaims {
    /// Wallet address (0x-prefixed hex).
    pub address: String,

    /// Random per-token nonce.
    pub nonce: String,

    /// Issuance time, ms since epoch.
    pub timestamp: i64,

    /// Expiry time, ms since epoch.
    pub expires_at: i64,

    /// Granted scopes, in order.
    pub scope: Vec<String>,

    /// The agent's user id on the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    /// Identity profile shown on the dashboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityData>,
}

impl AgentClaims {
    /// Create claims issued now with a fresh nonce.
    ///
    /// `expires_at` saturates at `i64::MAX` for lifetimes beyond that.
    pub fn new(address: impl Into<String>, scope: Vec<String>, lifetime: Duration) -> Self {
        let timestamp = Utc::now().timestamp_millis();
        Self {
            address: address.into().to_lowercase(),
            nonce: Uuid::new_v4().to_string(),
            timestamp,
            expires_at: timestamp.saturating_add(lifetime.num_milliseconds()),
            scope,
            agent_id: None,
            identity: None,
        }
    }

    /// Attach an identity profile.
    pub fn with_identity(mut self, identity: IdentityData) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Attach the agent's platform user id.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Check the claims can be issued.
    pub fn validate(&self) -> Result<(), AuthError> {
        if !is_valid_address(&self.address) {
            return Err(AuthError::InvalidClaims(format!(
                "address '{}' is not a 0x-prefixed 20-byte hex address",
                self.address
            )));
        }
        if self.nonce.trim().is_empty() {
            return Err(AuthError::InvalidClaims("nonce must not be empty".into()));
        }
        if self.scope.is_empty() {
            return Err(AuthError::NoScope);
        }
        if self.expires_at <= self.timestamp {
            return Err(AuthError::InvalidClaims(format!(
                "expiresAt ({}) must be after timestamp ({})",
                self.expires_at, self.timestamp
            )));
        }
        Ok(())
    }

    /// Whether the claims are expired at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Whether `address` is the same wallet as the claims' address.
    pub fn is_address(&self, address: &str) -> bool {
        match (normalize_address(&self.address), normalize_address(address)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Claims plus the wallet proof, as embedded in the token envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
    /// Always [`TOKEN_TYPE`].
    #[serde(rename = "type")]
    pub token_type: String,

    /// Always [`TOKEN_VERSION`].
    pub version: String,

    #[serde(flatten)]
    pub claims: AgentClaims,

    /// EIP-191 wallet signature over `signed_message` (0x-prefixed hex).
    pub signature: String,

    /// The exact message the wallet signed.
    pub signed_message: String,
}

impl SignedPayload {
    pub fn new(claims: AgentClaims, signature: String, signed_message: String) -> Self {
        Self {
            token_type: TOKEN_TYPE.to_string(),
            version: TOKEN_VERSION.to_string(),
            claims,
            signature,
            signed_message,
        }
    }
}
