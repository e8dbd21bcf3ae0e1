//! # bloom-auth
//!
//! Agent token handling for the Bloom dashboard.
//!
//! This crate provides functionality for:
//! - Rendering the canonical message an agent wallet signs
//! - Signing that message with a wallet (EIP-191) and recovering the signer
//! - Wrapping claims and the wallet signature in an HS256 envelope
//! - Verifying tokens and projecting them into sessions
//!
//! ## Two-Layer Token Model
//!
//! | Layer | Signed by | Proves | Checked with |
//! |-------|-----------|--------|--------------|
//! | **Envelope** | Shared secret (HS256) | Issued by this deployment, for this audience | [`AuthSettings`] |
//! | **Wallet proof** | Agent wallet (secp256k1) | The address's owner approved these claims | Signature recovery |
//!
//! Tampering with either layer fails verification. The verifier runs, in
//! order: envelope, schema, message re-derivation, wallet signature, expiry,
//! scope. No state is kept between calls, so a token can be verified any
//! number of times until it expires.

pub mod claims;
pub mod error;
pub mod keys;
pub mod message;
pub mod session;
pub mod settings;
pub mod token;
pub mod wallet;

pub use claims::{AgentClaims, SignedPayload, TOKEN_TYPE, TOKEN_VERSION};
pub use error::AuthError;
pub use keys::TokenSecret;
pub use message::build_message;
pub use session::Session;
pub use settings::AuthSettings;
pub use token::{TokenBuilder, TokenInfo, TokenVerifier, inspect_token_unverified};
pub use wallet::{LocalWallet, WalletSigner};
