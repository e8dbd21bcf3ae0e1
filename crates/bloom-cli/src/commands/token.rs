//! Token commands.
//!
//! `bloom token issue` - Issue a token signed by a user's agent wallet.
//! `bloom token verify` - Verify a token and print the session.
//! `bloom token inspect` - Decode a token without verification.

use super::read_token;
use anyhow::Context;
use bloom_auth::{AuthSettings, TokenBuilder, TokenVerifier, inspect_token_unverified};
use bloom_core::{AgentScope, BloomConfig, IdentityData, parse_duration};
use bloom_wallet::{AgentWallet, AuthTokenOptions, FileWalletStorage, dashboard_url};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments of `bloom token issue`.
#[derive(Debug, Default)]
pub struct IssueArgs {
    pub user: String,
    pub scopes: Vec<String>,
    pub expires: Option<String>,
    pub identity: Option<PathBuf>,
    pub agent_id: Option<String>,
    pub output: Option<PathBuf>,
}

fn load_identity(path: &Path) -> anyhow::Result<IdentityData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read identity file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid identity profile in {}", path.display()))
}

/// Issue an agent token for `args.user`, creating the wallet on first use.
pub async fn issue(
    config: &BloomConfig,
    secret: Option<&str>,
    args: IssueArgs,
) -> anyhow::Result<()> {
    let settings = AuthSettings::from_config(&config.auth, secret)?;
    let builder = TokenBuilder::new(settings);

    let storage = FileWalletStorage::new(&config.wallet.storage_dir)?;
    let mut agent = AgentWallet::new(&args.user, config.wallet.network, Arc::new(storage));
    let info = agent.initialize()?;

    for scope in &args.scopes {
        if AgentScope::parse(scope).is_none() {
            tracing::warn!(scope = %scope, "Granting scope unknown to the dashboard");
        }
    }

    let options = AuthTokenOptions {
        scope: (!args.scopes.is_empty()).then_some(args.scopes),
        lifetime: args.expires.as_deref().map(parse_duration).transpose()?,
        identity: args.identity.as_deref().map(load_identity).transpose()?,
        agent_id: args.agent_id,
    };

    let token = agent.generate_auth_token(&builder, options).await?;
    let url = dashboard_url(&config.dashboard.resolve_url(), &token);

    if let Some(output_path) = args.output {
        fs::write(&output_path, &token)?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  User:    {}", args.user);
        println!("  Address: {}", info.address);
        if let Some(e) = &args.expires {
            println!("  Expires: {}", e);
        }
        println!("  Dashboard: {}", url);
    } else {
        println!("{}", token);
        println!();
        println!("Dashboard: {}", url);
    }

    Ok(())
}

/// Verify a token, then check the session carries every required scope.
///
/// Failures are returned as errors prefixed with their stable code, so the
/// process exits non-zero.
pub fn verify(
    config: &BloomConfig,
    secret: Option<&str>,
    token: String,
    require_scopes: &[String],
) -> anyhow::Result<()> {
    let settings = AuthSettings::from_config(&config.auth, secret)?;
    let verifier = TokenVerifier::new(settings);
    let token_str = read_token(token)?;

    let session = match verifier.verify(&token_str) {
        Ok(session) => session,
        Err(e) => {
            println!("✖ Token verification failed: {}", e);
            anyhow::bail!("{}: {}", e.code(), e);
        }
    };

    let missing: Vec<&String> = require_scopes
        .iter()
        .filter(|s| !session.scope.contains(*s))
        .collect();
    if !missing.is_empty() {
        println!("✖ Token lacks required scope");
        anyhow::bail!(
            "missing_scope: {}",
            missing
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    println!("✔ Token is valid");
    println!();
    println!("Session:");
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

/// Decode a token without verification.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token_str = read_token(token)?;
    let info = inspect_token_unverified(&token_str)?;

    println!("Token Information (unverified):");
    println!("  Algorithm: {}", info.algorithm().unwrap_or("(none)"));
    if let Some(address) = info.address() {
        println!("  Address:   {}", address);
    }
    println!();
    println!("Header:");
    println!("{}", serde_json::to_string_pretty(&info.header)?);
    println!();
    println!("Payload:");
    println!("{}", serde_json::to_string_pretty(&info.payload)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SECRET: &str = "cli-test-secret";

    fn config_in(dir: &std::path::Path) -> BloomConfig {
        let mut config = BloomConfig::default();
        config.wallet.storage_dir = dir.join("wallets");
        config
    }

    async fn issue_to_file(config: &BloomConfig, dir: &std::path::Path, scopes: &[&str]) -> PathBuf {
        let token_path = dir.join("agent.token");
        issue(
            config,
            Some(SECRET),
            IssueArgs {
                user: "alice".to_string(),
                scopes: scopes.iter().map(|s| s.to_string()).collect(),
                expires: Some("1h".to_string()),
                output: Some(token_path.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        token_path
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let token_path = issue_to_file(&config, dir.path(), &[]).await;

        let token = token_path.to_string_lossy().to_string();
        verify(&config, Some(SECRET), token.clone(), &["read:wallet".to_string()]).unwrap();
        inspect(token).unwrap();
    }

    #[tokio::test]
    async fn test_verify_rejects_missing_scope() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let token_path = issue_to_file(&config, dir.path(), &["read:identity"]).await;

        let err = verify(
            &config,
            Some(SECRET),
            token_path.to_string_lossy().to_string(),
            &["read:wallet".to_string()],
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("missing_scope"));
    }

    #[tokio::test]
    async fn test_verify_with_wrong_secret_fails() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let token_path = issue_to_file(&config, dir.path(), &[]).await;

        let err = verify(
            &config,
            Some("another-secret"),
            token_path.to_string_lossy().to_string(),
            &[],
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("envelope_invalid"));
    }

    #[tokio::test]
    async fn test_issue_with_identity_file() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let identity_path = dir.path().join("identity.json");
        fs::write(
            &identity_path,
            r#"{
                "personalityType": "The Optimizer",
                "tagline": "Yield first",
                "description": "Always rebalancing",
                "mainCategories": ["DeFi"],
                "subCategories": ["Lending"]
            }"#,
        )
        .unwrap();
        let token_path = dir.path().join("agent.token");

        issue(
            &config,
            Some(SECRET),
            IssueArgs {
                user: "bob".to_string(),
                identity: Some(identity_path),
                agent_id: Some("agent-42".to_string()),
                output: Some(token_path.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        let payload = inspect_token_unverified(&token).unwrap().payload;
        assert_eq!(payload["identity"]["personalityType"], "The Optimizer");
        assert_eq!(payload["agentId"], "agent-42");
    }

    #[tokio::test]
    async fn test_issue_without_secret_fails() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.auth.secret_env = Some("BLOOM_CLI_TEST_UNSET_SECRET".to_string());
        config.auth.secret_file = None;

        let result = issue(
            &config,
            None,
            IssueArgs {
                user: "alice".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_issue_with_week_lifetime() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let token_path = dir.path().join("agent.token");

        issue(
            &config,
            Some(SECRET),
            IssueArgs {
                user: "alice".to_string(),
                expires: Some("7d".to_string()),
                output: Some(token_path.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        let payload = inspect_token_unverified(&token).unwrap().payload;
        let lifetime = payload["exp"].as_i64().unwrap() - payload["iat"].as_i64().unwrap();
        assert!((lifetime - 7 * 86_400).abs() <= 1);
    }

    #[tokio::test]
    async fn test_issue_with_out_of_range_expiry_fails() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let result = issue(
            &config,
            Some(SECRET),
            IssueArgs {
                user: "alice".to_string(),
                expires: Some("999999999999999d".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_inspect_garbage_fails() {
        assert!(inspect("not-a-token".to_string()).is_err());
    }
}
