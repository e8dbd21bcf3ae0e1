//! Token issuance and verification.

use crate::claims::{AgentClaims, SignedPayload, TOKEN_TYPE, TOKEN_VERSION};
use crate::error::AuthError;
use crate::message::build_message;
use crate::session::Session;
use crate::settings::AuthSettings;
use crate::wallet::{WalletSigner, is_valid_address, normalize_address, verify_wallet_signature};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;

/// The only envelope algorithm issued or accepted.
pub const ENVELOPE_ALGORITHM: Algorithm = Algorithm::HS256;

/// Envelope claims: the signed payload plus registered JWT claims.
#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(flatten)]
    payload: &'a SignedPayload,
    iss: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Builder for agent tokens.
pub struct TokenBuilder {
    settings: AuthSettings,
}

impl TokenBuilder {
    /// Create a new token builder with the given settings.
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Have `signer` sign the canonical message for `claims` and encode the result.
    ///
    /// The signer is awaited once; its failure surfaces as
    /// [`AuthError::SignerUnavailable`].
    pub async fn issue<S>(&self, claims: AgentClaims, signer: &S) -> Result<String, AuthError>
    where
        S: WalletSigner + ?Sized,
    {
        claims.validate()?;
        let signer_address = signer.address();
        if !claims.is_address(&signer_address) {
            return Err(AuthError::InvalidClaims(format!(
                "claims address {} does not belong to signer {}",
                claims.address, signer_address
            )));
        }

        let message = build_message(&claims);
        let signature = signer
            .sign_message(&message)
            .await
            .map_err(|e| AuthError::SignerUnavailable(e.to_string()))?;

        let payload = SignedPayload::new(claims, signature, message);
        let token = self.encode(&payload)?;

        tracing::debug!(
            address = %payload.claims.address,
            scope = ?payload.claims.scope,
            expires_at = payload.claims.expires_at,
            "Issued agent token"
        );
        Ok(token)
    }

    /// Encode an already signed payload into an HS256 envelope.
    ///
    /// The envelope expires at the payload's `expiresAt` (rounded up to the
    /// second), and no sooner than `token_lifetime` after now. Verification
    /// still enforces both expiries.
    pub fn encode(&self, payload: &SignedPayload) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let envelope = Envelope {
            payload,
            iss: self.settings.issuer(),
            aud: self.settings.audience(),
            iat,
            exp: envelope_expiry(iat, self.settings.token_lifetime(), payload.claims.expires_at),
        };

        encode(
            &Header::new(ENVELOPE_ALGORITHM),
            &envelope,
            &EncodingKey::from_secret(self.settings.secret().as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreationFailed(e.to_string()))
    }
}

/// Envelope `exp` in seconds: the claims expiry, floored at `iat + lifetime`.
fn envelope_expiry(iat: i64, lifetime: Duration, expires_at_ms: i64) -> i64 {
    let claims_exp = expires_at_ms / 1000 + i64::from(expires_at_ms % 1000 > 0);
    iat.saturating_add(lifetime.num_seconds()).max(claims_exp)
}

/// Verifier for agent tokens.
pub struct TokenVerifier {
    settings: AuthSettings,
}

impl TokenVerifier {
    /// Create a new token verifier with the given settings.
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Session, AuthError> {
        self.verify_at(token, Utc::now().timestamp_millis())
    }

    /// Verify a token, judging the claims' expiry against `now_ms`.
    ///
    /// The envelope `exp` is always judged against the system clock.
    pub fn verify_at(&self, token: &str, now_ms: i64) -> Result<Session, AuthError> {
        match self.run_checks(token, now_ms) {
            Ok(session) => {
                tracing::debug!(
                    session_id = %session.session_id,
                    address = %session.address,
                    scope = ?session.scope,
                    "Verified agent token"
                );
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(code = e.code(), "Agent token rejected: {}", e);
                Err(e)
            }
        }
    }

    // Order is part of the contract: each check assumes the previous ones passed.
    fn run_checks(&self, token: &str, now_ms: i64) -> Result<Session, AuthError> {
        let raw = self.check_envelope(token)?;
        let payload = check_schema(raw)?;
        check_message(&payload)?;
        verify_wallet_signature(
            &payload.signed_message,
            &payload.signature,
            &payload.claims.address,
        )?;
        if payload.claims.is_expired_at(now_ms) {
            return Err(AuthError::Expired {
                expired_at: payload.claims.expires_at,
            });
        }
        if payload.claims.scope.is_empty() {
            return Err(AuthError::NoScope);
        }

        Ok(Session::from_payload(&payload, now_ms))
    }

    fn check_envelope(&self, token: &str) -> Result<serde_json::Value, AuthError> {
        let mut validation = Validation::new(ENVELOPE_ALGORITHM);
        validation.algorithms = vec![ENVELOPE_ALGORITHM];
        validation.set_issuer(&[self.settings.issuer()]);
        validation.set_audience(&[self.settings.audience()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = self.settings.leeway_secs();

        let data = decode::<serde_json::Value>(
            token,
            &DecodingKey::from_secret(self.settings.secret().as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::EnvelopeInvalid(e.to_string()))?;

        Ok(data.claims)
    }
}

fn check_schema(raw: serde_json::Value) -> Result<SignedPayload, AuthError> {
    let payload: SignedPayload =
        serde_json::from_value(raw).map_err(|e| AuthError::MalformedPayload(e.to_string()))?;

    if payload.token_type != TOKEN_TYPE {
        return Err(AuthError::MalformedPayload(format!(
            "unexpected token type '{}'",
            payload.token_type
        )));
    }
    if payload.version != TOKEN_VERSION {
        return Err(AuthError::MalformedPayload(format!(
            "unsupported token version '{}'",
            payload.version
        )));
    }
    if !is_valid_address(&payload.claims.address) {
        return Err(AuthError::MalformedPayload(
            "address is not a valid EVM address".into(),
        ));
    }
    if payload.claims.nonce.trim().is_empty() {
        return Err(AuthError::MalformedPayload("nonce is empty".into()));
    }
    if payload.signature.trim().is_empty() {
        return Err(AuthError::MalformedPayload("signature is empty".into()));
    }
    if payload.signed_message.is_empty() {
        return Err(AuthError::MalformedPayload("signedMessage is empty".into()));
    }
    Ok(payload)
}

fn check_message(payload: &SignedPayload) -> Result<(), AuthError> {
    if build_message(&payload.claims) != payload.signed_message {
        return Err(AuthError::MessageMismatch);
    }
    Ok(())
}

/// Decoded header and payload of a token, unverified.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub header: serde_json::Value,
    pub payload: serde_json::Value,
}

impl TokenInfo {
    /// The `alg` header value.
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get("alg").and_then(|v| v.as_str())
    }

    /// The payload address, normalized, if present and well-formed.
    pub fn address(&self) -> Option<String> {
        self.payload
            .get("address")
            .and_then(|v| v.as_str())
            .and_then(normalize_address)
    }
}

/// Inspect a token without verification (for debugging).
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, AuthError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::TokenParseFailed(format!(
            "expected 3 dot-separated segments, found {}",
            parts.len()
        )));
    }

    let decode_part = |name: &str, part: &str| -> Result<serde_json::Value, AuthError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(part)
            .map_err(|e| AuthError::TokenParseFailed(format!("{} is not base64url: {}", name, e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::TokenParseFailed(format!("{} is not JSON: {}", name, e)))
    };

    Ok(TokenInfo {
        header: decode_part("header", parts[0])?,
        payload: decode_part("payload", parts[1])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::TokenSecret;
    use crate::wallet::LocalWallet;

    fn settings(secret: &str) -> AuthSettings {
        AuthSettings::new(
            TokenSecret::new(secret).unwrap(),
            "bloom-protocol",
            "bloom-dashboard",
        )
        .unwrap()
    }

    fn signed_payload(wallet: &LocalWallet, scope: Vec<String>) -> SignedPayload {
        let claims = AgentClaims::new(wallet.address(), scope, Duration::hours(1));
        let message = build_message(&claims);
        let signature = wallet.sign(&message).unwrap();
        SignedPayload::new(claims, signature, message)
    }

    #[tokio::test]
    async fn test_issue_and_verify() {
        let wallet = LocalWallet::generate().unwrap();
        let builder = TokenBuilder::new(settings("s3cret"));
        let claims = AgentClaims::new(
            wallet.address(),
            vec!["read:identity".into()],
            Duration::hours(24),
        );

        let token = builder.issue(claims.clone(), &wallet).await.unwrap();
        assert_eq!(token.split('.').count(), 3);

        let verifier = TokenVerifier::new(settings("s3cret"));
        let session = verifier.verify(&token).unwrap();
        assert_eq!(session.address, wallet.address());
        assert_eq!(session.scope, vec!["read:identity".to_string()]);
        assert_eq!(session.expires_at, claims.expires_at);
    }

    #[tokio::test]
    async fn test_issue_rejects_foreign_signer() {
        let wallet = LocalWallet::generate().unwrap();
        let other = LocalWallet::generate().unwrap();
        let builder = TokenBuilder::new(settings("s3cret"));
        let claims = AgentClaims::new(
            other.address(),
            vec!["read:identity".into()],
            Duration::hours(1),
        );

        let err = builder.issue(claims, &wallet).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClaims(_)));
    }

    #[test]
    fn test_empty_scope_encoded_directly_yields_no_scope() {
        let wallet = LocalWallet::generate().unwrap();
        let builder = TokenBuilder::new(settings("s3cret"));
        let token = builder.encode(&signed_payload(&wallet, Vec::new())).unwrap();

        let err = TokenVerifier::new(settings("s3cret"))
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, AuthError::NoScope));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let wallet = LocalWallet::generate().unwrap();
        let builder = TokenBuilder::new(settings("s3cret"));
        let mut payload = signed_payload(&wallet, vec!["read:identity".into()]);
        payload.token_type = "user".into();
        let token = builder.encode(&payload).unwrap();

        let err = TokenVerifier::new(settings("s3cret"))
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, AuthError::MalformedPayload(_)));
    }

    #[test]
    fn test_inspect_unverified() {
        let wallet = LocalWallet::generate().unwrap();
        let builder = TokenBuilder::new(settings("s3cret"));
        let token = builder
            .encode(&signed_payload(&wallet, vec!["read:skills".into()]))
            .unwrap();

        let info = inspect_token_unverified(&token).unwrap();
        assert_eq!(info.algorithm(), Some("HS256"));
        assert_eq!(info.payload["type"], "agent");
        assert_eq!(info.payload["iss"], "bloom-protocol");
        assert_eq!(info.payload["aud"], "bloom-dashboard");
        assert_eq!(info.address().as_deref(), Some(wallet.address()));
    }

    #[test]
    fn test_envelope_expiry() {
        // Claims outliving the configured lifetime extend the envelope.
        assert_eq!(envelope_expiry(1_000, Duration::hours(1), 8_200_000), 8_200);
        // Sub-second claims expiry rounds up.
        assert_eq!(envelope_expiry(1_000, Duration::hours(1), 8_200_001), 8_201);
        // Shorter claims keep the configured floor.
        assert_eq!(envelope_expiry(1_000, Duration::hours(1), 1_500_000), 4_600);
        assert_eq!(envelope_expiry(1_000, Duration::hours(1), i64::MAX), i64::MAX / 1000 + 1);
    }

    #[tokio::test]
    async fn test_long_claims_lifetime_carries_into_envelope() {
        let wallet = LocalWallet::generate().unwrap();
        let builder = TokenBuilder::new(settings("s3cret"));
        let claims = AgentClaims::new(
            wallet.address(),
            vec!["read:identity".into()],
            Duration::days(7),
        );
        let claims_secs = (claims.expires_at - claims.timestamp) / 1000;

        let token = builder.issue(claims, &wallet).await.unwrap();
        let payload = inspect_token_unverified(&token).unwrap().payload;
        let iat = payload["iat"].as_i64().unwrap();
        let exp = payload["exp"].as_i64().unwrap();

        // Issuance and encoding may straddle a second boundary.
        assert!((exp - iat - claims_secs).abs() <= 1, "exp - iat = {}", exp - iat);
        assert!(TokenVerifier::new(settings("s3cret")).verify(&token).is_ok());
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        assert!(matches!(
            inspect_token_unverified("not-a-token"),
            Err(AuthError::TokenParseFailed(_))
        ));
        assert!(inspect_token_unverified("a.b.c").is_err());
    }
}
