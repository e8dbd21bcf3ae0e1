//! Wallet signatures over canonical messages.
//!
//! Agent wallets sign with EIP-191 `personal_sign`: the keccak256 digest of
//! `"\x19Ethereum Signed Message:\n" || len(message) || message`, signed with
//! secp256k1 and encoded as 65 bytes `r || s || v`. Verification recovers the
//! signer's public key from the signature and compares the derived address.

use crate::error::AuthError;
use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::RngCore;
use sha3::{Digest, Keccak256};
use std::fmt;

/// Signing capability of an agent wallet.
///
/// Implementations may call out to custody services or hardware; the call is
/// made once per issued token and is not retried.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Address of the signing key.
    fn address(&self) -> String;

    /// Sign `message` with EIP-191 and return the 0x-prefixed hex signature.
    async fn sign_message(&self, message: &str) -> anyhow::Result<String>;
}

/// A secp256k1 wallet whose private key is held in process.
#[derive(Clone)]
pub struct LocalWallet {
    signing_key: SigningKey,
    address: String,
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalWallet {
    /// Generate a new random wallet.
    pub fn generate() -> Result<Self, AuthError> {
        let mut rng = rand::rng();
        // A random scalar is out of range with negligible probability; retry a few times.
        for _ in 0..8 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Ok(signing_key) = SigningKey::from_slice(&bytes) {
                return Ok(Self::from_signing_key(signing_key));
            }
        }
        Err(AuthError::Internal(anyhow::anyhow!(
            "failed to generate a valid secp256k1 key"
        )))
    }

    /// Load a wallet from a hex-encoded private key (with or without `0x`).
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, AuthError> {
        let bytes = decode_hex(hex_key)
            .map_err(|e| AuthError::Configuration(format!("invalid wallet private key: {}", e)))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| AuthError::Configuration(format!("invalid wallet private key: {}", e)))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// The wallet address, lowercase and 0x-prefixed.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The private key as 0x-prefixed hex.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.to_bytes()))
    }

    /// Sign `message` with EIP-191.
    pub fn sign(&self, message: &str) -> Result<String, AuthError> {
        let prehash = personal_message_hash(message);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("signing failed: {}", e)))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

#[async_trait]
impl WalletSigner for LocalWallet {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn sign_message(&self, message: &str) -> anyhow::Result<String> {
        Ok(self.sign(message)?)
    }
}

/// Digest signed by EIP-191 `personal_sign`.
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let bytes = message.as_bytes();
    let prefix = format!("\x19Ethereum Signed Message:\n{}", bytes.len());
    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_address(message: &str, signature: &str) -> Result<String, AuthError> {
    let bytes = decode_hex(signature)
        .map_err(|e| AuthError::SignatureInvalid(format!("signature is not hex: {}", e)))?;
    if bytes.len() != 65 {
        return Err(AuthError::SignatureInvalid(format!(
            "signature must decode to 65 bytes, got {}",
            bytes.len()
        )));
    }

    let sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| AuthError::SignatureInvalid(format!("invalid ECDSA signature: {}", e)))?;
    let recovery_id = normalize_recovery_id(bytes[64])?;
    let prehash = personal_message_hash(message);
    let verifying_key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|e| AuthError::SignatureInvalid(format!("failed to recover signer: {}", e)))?;

    Ok(address_from_verifying_key(&verifying_key))
}

/// Check that `signature` over `message` was produced by `expected_address`.
pub fn verify_wallet_signature(
    message: &str,
    signature: &str,
    expected_address: &str,
) -> Result<(), AuthError> {
    let expected = normalize_address(expected_address).ok_or_else(|| {
        AuthError::SignatureInvalid("expected address is not a valid EVM address".into())
    })?;
    let recovered = recover_address(message, signature)?;
    if recovered != expected {
        return Err(AuthError::SignatureInvalid(
            "signature does not match address".into(),
        ));
    }
    Ok(())
}

/// Whether `address` is `0x` followed by 40 hex digits (any case).
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Lowercase a valid address; `None` if it is not one.
pub fn normalize_address(address: &str) -> Option<String> {
    let address = address.trim();
    if is_valid_address(address) {
        Some(address.to_lowercase())
    } else {
        None
    }
}

fn normalize_recovery_id(raw: u8) -> Result<RecoveryId, AuthError> {
    let id = match raw {
        27 | 28 => raw - 27,
        0 | 1 => raw,
        _ => {
            return Err(AuthError::SignatureInvalid(
                "signature recovery id must be 0/1 or 27/28".into(),
            ));
        }
    };
    RecoveryId::try_from(id)
        .map_err(|_| AuthError::SignatureInvalid("signature recovery id is invalid".into()))
}

fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let encoded = key.to_encoded_point(false);
    // Uncompressed SEC1: 0x04 || X || Y
    let digest = Keccak256::digest(&encoded.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = value.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
}
