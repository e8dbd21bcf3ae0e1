//! Error types for agent token operations.

use thiserror::Error;

/// Errors that can occur while issuing or verifying agent tokens.
///
/// Verification failures are the six variants from [`AuthError::EnvelopeInvalid`]
/// to [`AuthError::NoScope`]; they are returned to the caller and never carry
/// the token secret or full signature bytes.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or invalid secret, issuer or audience.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Claims rejected before signing.
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// The wallet signer failed during issuance.
    #[error("wallet signer unavailable: {0}")]
    SignerUnavailable(String),

    /// Failed to encode the token envelope.
    #[error("failed to create token: {0}")]
    TokenCreationFailed(String),

    /// Envelope signature, algorithm, issuer, audience or expiry rejected.
    #[error("token envelope invalid: {0}")]
    EnvelopeInvalid(String),

    /// Payload fields missing or of the wrong shape.
    #[error("malformed token payload: {0}")]
    MalformedPayload(String),

    /// The embedded signed message differs from the one rendered from the claims.
    #[error("signed message does not match token claims")]
    MessageMismatch,

    /// The wallet signature was not produced by the token's address.
    #[error("wallet signature invalid: {0}")]
    SignatureInvalid(String),

    /// The claims' `expiresAt` has passed.
    #[error("token expired at {expired_at} (ms since epoch)")]
    Expired { expired_at: i64 },

    /// The token grants no scope.
    #[error("token grants no scope")]
    NoScope,

    /// Failed to parse a token for inspection.
    #[error("failed to parse token: {0}")]
    TokenParseFailed(String),

    /// IO error (reading/writing secrets).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Stable machine-readable code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Configuration(_) => "configuration_error",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::SignerUnavailable(_) => "signer_unavailable",
            AuthError::TokenCreationFailed(_) => "token_creation_failed",
            AuthError::EnvelopeInvalid(_) => "envelope_invalid",
            AuthError::MalformedPayload(_) => "malformed_payload",
            AuthError::MessageMismatch => "message_mismatch",
            AuthError::SignatureInvalid(_) => "signature_invalid",
            AuthError::Expired { .. } => "expired",
            AuthError::NoScope => "no_scope",
            AuthError::TokenParseFailed(_) => "token_parse_failed",
            AuthError::IoError(_) => "io_error",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Whether this is one of the per-call verification failures.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            AuthError::EnvelopeInvalid(_)
                | AuthError::MalformedPayload(_)
                | AuthError::MessageMismatch
                | AuthError::SignatureInvalid(_)
                | AuthError::Expired { .. }
                | AuthError::NoScope
        )
    }
}
