//! Per-user wallet storage.
//!
//! Records live in a single JSON object keyed by user id
//! (`<dir>/user-wallets.json`), rewritten in full on every change. The file is
//! small (one entry per user) and human-inspectable with standard tools.

use crate::error::WalletError;
use bloom_core::Network;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the wallet records inside the storage directory.
pub const STORAGE_FILE: &str = "user-wallets.json";

/// A persisted agent wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub user_id: String,
    /// Custody-specific wallet material; for local wallets the private key hex.
    pub wallet_data: String,
    pub wallet_address: String,
    pub network: Network,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

/// Key-value store of wallet records keyed by user id.
pub trait WalletStorage: Send + Sync {
    /// Get the wallet record for a user.
    fn get_user_wallet(&self, user_id: &str) -> Result<Option<WalletRecord>, WalletError>;

    /// Create or replace a user's wallet record. An existing `created_at` is kept.
    fn save_user_wallet(
        &self,
        user_id: &str,
        wallet_data: &str,
        wallet_address: &str,
        network: Network,
    ) -> Result<WalletRecord, WalletError>;

    /// Touch `last_used_at`. Unknown users are ignored.
    fn update_last_used(&self, user_id: &str) -> Result<(), WalletError>;

    /// Remove a user's wallet record.
    fn delete_user_wallet(&self, user_id: &str) -> Result<(), WalletError>;

    /// User ids with a stored wallet, sorted.
    fn list_users(&self) -> Result<Vec<String>, WalletError>;

    /// Number of stored wallets.
    fn wallet_count(&self) -> Result<usize, WalletError> {
        Ok(self.list_users()?.len())
    }
}

/// File-based wallet storage.
pub struct FileWalletStorage {
    /// Directory containing the records file.
    directory: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileWalletStorage {
    /// Open storage in `directory`, creating it and an empty records file
    /// if needed.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, WalletError> {
        let storage = Self {
            directory: directory.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        };
        storage.ensure_storage_exists()?;
        Ok(storage)
    }

    /// Path of the records file.
    pub fn file_path(&self) -> PathBuf {
        self.directory.join(STORAGE_FILE)
    }

    fn ensure_storage_exists(&self) -> Result<(), WalletError> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory)?;
        }
        let path = self.file_path();
        if !path.exists() {
            fs::write(&path, "{}")?;
            tracing::debug!("Created wallet storage at {}", path.display());
        }
        Ok(())
    }

    fn load_records(&self) -> Result<BTreeMap<String, WalletRecord>, WalletError> {
        self.ensure_storage_exists()?;
        let path = self.file_path();
        let content = fs::read_to_string(&path)?;

        match serde_json::from_str(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse wallet storage {}: {}; treating as empty",
                    path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn save_records(&self, records: &BTreeMap<String, WalletRecord>) -> Result<(), WalletError> {
        self.ensure_storage_exists()?;
        let json = serde_json::to_string_pretty(records)?;
        fs::write(self.file_path(), json)?;
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, WalletError> {
        self.lock.lock().map_err(|_| WalletError::LockError)
    }
}

impl WalletStorage for FileWalletStorage {
    fn get_user_wallet(&self, user_id: &str) -> Result<Option<WalletRecord>, WalletError> {
        let _guard = self.guard()?;
        Ok(self.load_records()?.remove(user_id))
    }

    fn save_user_wallet(
        &self,
        user_id: &str,
        wallet_data: &str,
        wallet_address: &str,
        network: Network,
    ) -> Result<WalletRecord, WalletError> {
        let _guard = self.guard()?;
        let mut records = self.load_records()?;
        let now = Utc::now();

        let record = WalletRecord {
            user_id: user_id.to_string(),
            wallet_data: wallet_data.to_string(),
            wallet_address: wallet_address.to_string(),
            network,
            created_at: records.get(user_id).map(|r| r.created_at).unwrap_or(now),
            last_used_at: now,
        };
        records.insert(user_id.to_string(), record.clone());
        self.save_records(&records)?;

        tracing::debug!(user_id, address = wallet_address, "Saved user wallet");
        Ok(record)
    }

    fn update_last_used(&self, user_id: &str) -> Result<(), WalletError> {
        let _guard = self.guard()?;
        let mut records = self.load_records()?;
        if let Some(record) = records.get_mut(user_id) {
            record.last_used_at = Utc::now();
            self.save_records(&records)?;
        }
        Ok(())
    }

    fn delete_user_wallet(&self, user_id: &str) -> Result<(), WalletError> {
        let _guard = self.guard()?;
        let mut records = self.load_records()?;
        if records.remove(user_id).is_some() {
            self.save_records(&records)?;
        }
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<String>, WalletError> {
        let _guard = self.guard()?;
        Ok(self.load_records()?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_creates_directory_and_empty_file() {
        let dir = tempdir().unwrap();
        let storage = FileWalletStorage::new(dir.path().join("nested")).unwrap();

        assert_eq!(fs::read_to_string(storage.file_path()).unwrap(), "{}");
        assert_eq!(storage.wallet_count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_get() {
        let dir = tempdir().unwrap();
        let storage = FileWalletStorage::new(dir.path()).unwrap();

        storage
            .save_user_wallet("alice", "0xkey", ADDRESS, Network::BaseSepolia)
            .unwrap();

        let record = storage.get_user_wallet("alice").unwrap().unwrap();
        assert_eq!(record.wallet_address, ADDRESS);
        assert_eq!(record.network, Network::BaseSepolia);
        assert!(storage.get_user_wallet("bob").unwrap().is_none());
    }

    #[test]
    fn test_overwrite_keeps_created_at() {
        let dir = tempdir().unwrap();
        let storage = FileWalletStorage::new(dir.path()).unwrap();

        let first = storage
            .save_user_wallet("alice", "0xkey", ADDRESS, Network::BaseMainnet)
            .unwrap();
        let second = storage
            .save_user_wallet("alice", "0xkey2", ADDRESS, Network::BaseMainnet)
            .unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.wallet_data, "0xkey2");
        assert_eq!(storage.wallet_count().unwrap(), 1);
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileWalletStorage::new(dir.path()).unwrap();

        for user in ["carol", "alice", "bob"] {
            storage
                .save_user_wallet(user, "0xkey", ADDRESS, Network::BaseMainnet)
                .unwrap();
        }
        assert_eq!(storage.list_users().unwrap(), vec!["alice", "bob", "carol"]);

        storage.delete_user_wallet("bob").unwrap();
        storage.delete_user_wallet("nobody").unwrap();
        assert_eq!(storage.list_users().unwrap(), vec!["alice", "carol"]);
    }

    #[test]
    fn test_update_last_used() {
        let dir = tempdir().unwrap();
        let storage = FileWalletStorage::new(dir.path()).unwrap();

        let saved = storage
            .save_user_wallet("alice", "0xkey", ADDRESS, Network::BaseMainnet)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        storage.update_last_used("alice").unwrap();
        storage.update_last_used("nobody").unwrap();

        let record = storage.get_user_wallet("alice").unwrap().unwrap();
        assert!(record.last_used_at > saved.last_used_at);
        assert_eq!(record.created_at, saved.created_at);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let storage = FileWalletStorage::new(dir.path()).unwrap();
        fs::write(storage.file_path(), "not json").unwrap();

        assert!(storage.list_users().unwrap().is_empty());
        storage
            .save_user_wallet("alice", "0xkey", ADDRESS, Network::BaseMainnet)
            .unwrap();
        assert_eq!(storage.wallet_count().unwrap(), 1);
    }

    #[test]
    fn test_wire_format() {
        let dir = tempdir().unwrap();
        let storage = FileWalletStorage::new(dir.path()).unwrap();
        storage
            .save_user_wallet("alice", "0xkey", ADDRESS, Network::BaseMainnet)
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(storage.file_path()).unwrap()).unwrap();
        let record = &raw["alice"];
        assert_eq!(record["userId"], "alice");
        assert_eq!(record["walletAddress"], ADDRESS);
        assert_eq!(record["network"], "base-mainnet");
        assert!(record["createdAt"].is_string());
        assert!(record["lastUsedAt"].is_string());
    }
}
