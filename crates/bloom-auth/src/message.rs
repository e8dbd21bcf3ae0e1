//! Canonical message rendering.
//!
//! The wallet signs the UTF-8 bytes of this message and the verifier renders
//! it again from the token's claims, so the layout is part of the wire
//! contract: changing it requires a new [`crate::claims::TOKEN_VERSION`].

use crate::claims::AgentClaims;

/// First line of every canonical message.
pub const MESSAGE_LABEL: &str = "Bloom Agent Authentication";

/// Render the message a wallet signs for `claims`.
pub fn build_message(claims: &AgentClaims) -> String {
    render(
        &claims.address,
        &claims.nonce,
        claims.timestamp,
        claims.expires_at,
        &claims.scope,
    )
}

fn render(address: &str, nonce: &str, timestamp: i64, expires_at: i64, scope: &[String]) -> String {
    [
        MESSAGE_LABEL.to_string(),
        format!("Address: {}", address),
        format!("Nonce: {}", nonce),
        format!("Timestamp: {}", timestamp),
        format!("Expires: {}", expires_at),
        format!("Scope: {}", scope.join(",")),
    ]
    .join("\n")
}
