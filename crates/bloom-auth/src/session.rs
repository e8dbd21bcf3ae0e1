//! Sessions derived from verified tokens.

use crate::claims::SignedPayload;
use crate::wallet::normalize_address;
use serde::Serialize;
use uuid::Uuid;

/// The trust projection of a verified agent token.
///
/// Only [`crate::TokenVerifier`] constructs sessions, and only after every
/// check passed. Sessions live in memory; each verification yields a new
/// `session_id`. Authorization is a membership test on `scope` done by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    /// Wallet address, lowercase.
    pub address: String,
    pub scope: Vec<String>,
    /// Verification time, ms since epoch.
    pub created_at: i64,
    /// The claims' `expiresAt`, ms since epoch.
    pub expires_at: i64,
}

impl Session {
    pub(crate) fn from_payload(payload: &SignedPayload, now_ms: i64) -> Self {
        let claims = &payload.claims;
        Self {
            session_id: Uuid::new_v4().to_string(),
            address: normalize_address(&claims.address)
                .unwrap_or_else(|| claims.address.to_lowercase()),
            scope: claims.scope.clone(),
            created_at: now_ms,
            expires_at: claims.expires_at,
        }
    }
}
