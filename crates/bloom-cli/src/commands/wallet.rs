//! Wallet commands.
//!
//! `bloom wallet create` - Create or load a user's agent wallet.
//! `bloom wallet show` - Show a stored wallet.
//! `bloom wallet list` - List stored wallets.

use anyhow::Context;
use bloom_core::BloomConfig;
use bloom_wallet::{AgentWallet, FileWalletStorage, WalletStorage};
use std::sync::Arc;

fn open_storage(config: &BloomConfig) -> anyhow::Result<Arc<FileWalletStorage>> {
    let storage = FileWalletStorage::new(&config.wallet.storage_dir).with_context(|| {
        format!(
            "Failed to open wallet storage at {}",
            config.wallet.storage_dir.display()
        )
    })?;
    Ok(Arc::new(storage))
}

/// Create the user's wallet, or load the existing one.
pub fn create(config: &BloomConfig, user: &str) -> anyhow::Result<()> {
    let mut agent = AgentWallet::new(user, config.wallet.network, open_storage(config)?);
    let info = agent.initialize()?;

    println!("✔ Agent wallet ready");
    println!("  User:    {}", user);
    println!("  Address: {}", info.address);
    println!("  Network: {}", info.network);
    Ok(())
}

/// Show a stored wallet. The key material is never printed.
pub fn show(config: &BloomConfig, user: &str) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let record = storage
        .get_user_wallet(user)?
        .with_context(|| format!("No wallet stored for user '{}'", user))?;

    println!("User:      {}", record.user_id);
    println!("Address:   {}", record.wallet_address);
    println!("Network:   {}", record.network);
    println!("Created:   {}", record.created_at.to_rfc3339());
    println!("Last used: {}", record.last_used_at.to_rfc3339());
    Ok(())
}

/// List stored wallets.
pub fn list(config: &BloomConfig) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let users = storage.list_users()?;

    if users.is_empty() {
        println!("No wallets stored in {}", config.wallet.storage_dir.display());
        return Ok(());
    }

    for user in &users {
        if let Some(record) = storage.get_user_wallet(user)? {
            println!("{}  {}  {}", record.wallet_address, record.network, user);
        }
    }
    println!();
    println!("{} wallet(s)", users.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> BloomConfig {
        let mut config = BloomConfig::default();
        config.wallet.storage_dir = dir.join("wallets");
        config
    }

    #[test]
    fn test_create_show_list() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        create(&config, "alice").unwrap();
        create(&config, "alice").unwrap();
        show(&config, "alice").unwrap();
        list(&config).unwrap();

        let storage = FileWalletStorage::new(&config.wallet.storage_dir).unwrap();
        assert_eq!(storage.list_users().unwrap(), vec!["alice"]);
    }

    #[test]
    fn test_show_unknown_user_fails() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        assert!(show(&config, "nobody").is_err());
        list(&config).unwrap();
    }
}
