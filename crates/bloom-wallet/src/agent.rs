//! Agent wallet bound to a platform user.

use crate::error::WalletError;
use crate::storage::WalletStorage;
use bloom_auth::{AgentClaims, LocalWallet, TokenBuilder};
use bloom_core::{AgentScope, IdentityData, Network};
use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;

/// Public view of an initialized wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    pub network: Network,
}

/// Options for [`AgentWallet::generate_auth_token`].
#[derive(Debug, Clone, Default)]
pub struct AuthTokenOptions {
    /// Defaults to every [`AgentScope`].
    pub scope: Option<Vec<String>>,
    /// Defaults to the builder's token lifetime.
    pub lifetime: Option<Duration>,
    pub identity: Option<IdentityData>,
    pub agent_id: Option<String>,
}

/// A user's agent wallet, loaded from or persisted to [`WalletStorage`].
pub struct AgentWallet {
    user_id: String,
    network: Network,
    storage: Arc<dyn WalletStorage>,
    wallet: Option<LocalWallet>,
}

impl AgentWallet {
    pub fn new(user_id: impl Into<String>, network: Network, storage: Arc<dyn WalletStorage>) -> Self {
        Self {
            user_id: user_id.into(),
            network,
            storage,
            wallet: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Load the user's wallet, creating and storing a new one on first use.
    ///
    /// Repeated calls return the same address.
    pub fn initialize(&mut self) -> Result<WalletInfo, WalletError> {
        if let Some(wallet) = &self.wallet {
            return Ok(WalletInfo {
                address: wallet.address().to_string(),
                network: self.network,
            });
        }

        let wallet = match self.storage.get_user_wallet(&self.user_id)? {
            Some(record) => {
                let wallet = LocalWallet::from_private_key_hex(&record.wallet_data).map_err(|e| {
                    WalletError::CorruptRecord {
                        user_id: self.user_id.clone(),
                        reason: e.to_string(),
                    }
                })?;
                if !wallet.address().eq_ignore_ascii_case(&record.wallet_address) {
                    return Err(WalletError::CorruptRecord {
                        user_id: self.user_id.clone(),
                        reason: format!(
                            "key derives {} but record says {}",
                            wallet.address(),
                            record.wallet_address
                        ),
                    });
                }
                self.network = record.network;
                self.storage.update_last_used(&self.user_id)?;
                tracing::debug!(user_id = %self.user_id, address = wallet.address(), "Loaded agent wallet");
                wallet
            }
            None => {
                let wallet = LocalWallet::generate()?;
                self.storage.save_user_wallet(
                    &self.user_id,
                    &wallet.private_key_hex(),
                    wallet.address(),
                    self.network,
                )?;
                tracing::info!(user_id = %self.user_id, address = wallet.address(), "Created agent wallet");
                wallet
            }
        };

        let info = WalletInfo {
            address: wallet.address().to_string(),
            network: self.network,
        };
        self.wallet = Some(wallet);
        Ok(info)
    }

    /// Wallet info, if initialized.
    pub fn info(&self) -> Option<WalletInfo> {
        self.wallet.as_ref().map(|w| WalletInfo {
            address: w.address().to_string(),
            network: self.network,
        })
    }

    /// The underlying signer.
    pub fn signer(&self) -> Result<&LocalWallet, WalletError> {
        self.wallet
            .as_ref()
            .ok_or_else(|| WalletError::NotInitialized(self.user_id.clone()))
    }

    /// Issue an agent token signed by this wallet.
    pub async fn generate_auth_token(
        &self,
        builder: &TokenBuilder,
        options: AuthTokenOptions,
    ) -> Result<String, WalletError> {
        let wallet = self.signer()?;

        let scope = options.scope.unwrap_or_else(AgentScope::default_scope);
        let lifetime = options
            .lifetime
            .unwrap_or_else(|| builder.settings().token_lifetime());

        let mut claims = AgentClaims::new(wallet.address(), scope, lifetime);
        if let Some(identity) = options.identity {
            claims = claims.with_identity(identity);
        }
        if let Some(agent_id) = options.agent_id {
            claims = claims.with_agent_id(agent_id);
        }

        let token = builder.issue(claims, wallet).await?;
        self.storage.update_last_used(&self.user_id)?;
        Ok(token)
    }
}

/// Dashboard link carrying an agent token.
pub fn dashboard_url(base: &str, token: &str) -> String {
    format!("{}/dashboard?token={}", base.trim_end_matches('/'), token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_url() {
        assert_eq!(
            dashboard_url("http://localhost:3001", "abc.def.ghi"),
            "http://localhost:3001/dashboard?token=abc.def.ghi"
        );
        assert_eq!(
            dashboard_url("https://bloom.example/", "t"),
            "https://bloom.example/dashboard?token=t"
        );
    }
}
