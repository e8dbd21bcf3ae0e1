//! # bloom-wallet
//!
//! Agent wallet custody for Bloom.
//!
//! Each platform user owns one local secp256k1 wallet. Keys are persisted by a
//! [`WalletStorage`] implementation and the wallet signs agent tokens through
//! [`bloom_auth::TokenBuilder`].

pub mod agent;
pub mod error;
pub mod storage;

pub use agent::{AgentWallet, AuthTokenOptions, WalletInfo, dashboard_url};
pub use error::WalletError;
pub use storage::{FileWalletStorage, STORAGE_FILE, WalletRecord, WalletStorage};
