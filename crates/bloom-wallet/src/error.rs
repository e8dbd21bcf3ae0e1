//! Error types for the wallet crate.

use bloom_auth::AuthError;
use thiserror::Error;

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// `initialize` has not been called.
    #[error("wallet for user '{0}' is not initialized")]
    NotInitialized(String),

    /// A stored record cannot be turned back into a wallet.
    #[error("stored wallet for user '{user_id}' is corrupt: {reason}")]
    CorruptRecord { user_id: String, reason: String },

    /// Storage lock poisoned.
    #[error("wallet storage lock poisoned")]
    LockError,

    /// Token or signing error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
