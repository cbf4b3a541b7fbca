//! Encryption key storage and lookup
//!
//! Message encryption itself is delegated to a [`MessageCipher`] supplied by
//! the application. This module only decides where keys come from and
//! whether a thread's messages can be opened.

use crate::error::{Result, SdkError};
use crate::storage::{KeyValueStorage, StoreSelector};
use crate::wallet::{PublicKey, WalletAdapter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Diffie-Hellman key pair derived from a wallet
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionKeys {
    pub public_key: Vec<u8>,
    pub secret_key: Vec<u8>,
}

impl fmt::Debug for EncryptionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKeys")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Encrypts and decrypts thread messages
pub trait MessageCipher: Send + Sync {
    fn seal(&self, plaintext: &[u8], keys: &EncryptionKeys, members: &[PublicKey]) -> Result<Vec<u8>>;

    fn open(&self, ciphertext: &[u8], keys: &EncryptionKeys, members: &[PublicKey]) -> Result<Vec<u8>>;
}

/// Persistence for a wallet's encryption keys
pub trait EncryptionKeysStore: Send + Sync {
    /// Store name reported in configuration summaries
    fn name(&self) -> &str {
        "custom"
    }

    fn get(&self, owner: &PublicKey) -> Result<Option<EncryptionKeys>>;

    fn save(&self, owner: &PublicKey, keys: &EncryptionKeys) -> Result<()>;

    fn delete(&self, owner: &PublicKey) -> Result<()>;
}

/// Encryption keys store on top of a named backing
pub struct StorageEncryptionKeysStore {
    storage: Box<dyn KeyValueStorage>,
}

impl StorageEncryptionKeysStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn from_selector(selector: StoreSelector) -> Self {
        Self::new(selector.open())
    }

    fn key(owner: &PublicKey) -> String {
        format!("dialect-encryption-keys-{}", owner)
    }
}

impl EncryptionKeysStore for StorageEncryptionKeysStore {
    fn name(&self) -> &str {
        self.storage.name()
    }

    fn get(&self, owner: &PublicKey) -> Result<Option<EncryptionKeys>> {
        match self.storage.get(&Self::key(owner))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, owner: &PublicKey, keys: &EncryptionKeys) -> Result<()> {
        self.storage.set(&Self::key(owner), &serde_json::to_string(keys)?)
    }

    fn delete(&self, owner: &PublicKey) -> Result<()> {
        self.storage.remove(&Self::key(owner))
    }
}

/// Supplies the wallet's encryption keys, caching them in the store
pub struct EncryptionKeysProvider {
    wallet: Arc<dyn WalletAdapter>,
    store: Arc<dyn EncryptionKeysStore>,
    cipher: Option<Arc<dyn MessageCipher>>,
}

impl EncryptionKeysProvider {
    pub fn new(
        wallet: Arc<dyn WalletAdapter>,
        store: Arc<dyn EncryptionKeysStore>,
        cipher: Option<Arc<dyn MessageCipher>>,
    ) -> Self {
        Self {
            wallet,
            store,
            cipher,
        }
    }

    /// Whether encrypted threads can be read and written at all
    pub fn is_available(&self) -> bool {
        self.cipher.is_some() && self.wallet.can_encrypt()
    }

    /// Keys already in the store, without asking the wallet
    pub fn get_cached(&self) -> Result<Option<EncryptionKeys>> {
        self.store.get(&self.wallet.public_key())
    }

    /// Stored keys, or keys freshly derived by the wallet
    pub async fn get_or_fail(&self) -> Result<EncryptionKeys> {
        let owner = self.wallet.public_key();
        if let Some(keys) = self.store.get(&owner)? {
            return Ok(keys);
        }
        if !self.wallet.can_encrypt() {
            return Err(SdkError::Encryption(
                "wallet does not support encryption".to_string(),
            ));
        }
        debug!(wallet = %owner, "deriving encryption keys from wallet");
        let keys = self.wallet.diffie_hellman().await?;
        self.store.save(&owner, &keys)?;
        Ok(keys)
    }

    fn cipher(&self) -> Result<&Arc<dyn MessageCipher>> {
        self.cipher
            .as_ref()
            .ok_or_else(|| SdkError::Encryption("no message cipher configured".to_string()))
    }

    /// Encrypt outgoing message bytes for the given members
    pub async fn seal(&self, plaintext: &[u8], members: &[PublicKey]) -> Result<Vec<u8>> {
        let cipher = self.cipher()?;
        let keys = self.get_or_fail().await?;
        cipher.seal(plaintext, &keys, members)
    }

    /// Decrypt incoming message bytes from the given members
    pub async fn open(&self, ciphertext: &[u8], members: &[PublicKey]) -> Result<Vec<u8>> {
        let cipher = self.cipher()?;
        let keys = self.get_or_fail().await?;
        cipher.open(ciphertext, &keys, members)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// XOR with the first key byte; enough to prove bytes pass through
    pub(crate) struct XorCipher;

    impl MessageCipher for XorCipher {
        fn seal(&self, plaintext: &[u8], keys: &EncryptionKeys, _: &[PublicKey]) -> Result<Vec<u8>> {
            Ok(plaintext.iter().map(|b| b ^ keys.secret_key[0]).collect())
        }

        fn open(&self, ciphertext: &[u8], keys: &EncryptionKeys, _: &[PublicKey]) -> Result<Vec<u8>> {
            Ok(ciphertext.iter().map(|b| b ^ keys.secret_key[0]).collect())
        }
    }

    struct EncryptingWallet {
        derivations: AtomicUsize,
    }

    #[async_trait]
    impl WalletAdapter for EncryptingWallet {
        fn public_key(&self) -> PublicKey {
            PublicKey::new([3u8; 32])
        }

        fn can_encrypt(&self) -> bool {
            true
        }

        async fn diffie_hellman(&self) -> Result<EncryptionKeys> {
            self.derivations.fetch_add(1, Ordering::SeqCst);
            Ok(EncryptionKeys {
                public_key: vec![1, 2, 3],
                secret_key: vec![42],
            })
        }
    }

    fn store() -> Arc<dyn EncryptionKeysStore> {
        Arc::new(StorageEncryptionKeysStore::new(Box::new(InMemoryStorage::new())))
    }

    #[tokio::test]
    async fn test_keys_derived_once_then_cached() {
        let wallet = Arc::new(EncryptingWallet {
            derivations: AtomicUsize::new(0),
        });
        let provider = EncryptionKeysProvider::new(wallet.clone(), store(), None);

        assert!(provider.get_cached().unwrap().is_none());
        provider.get_or_fail().await.unwrap();
        provider.get_or_fail().await.unwrap();

        assert_eq!(wallet.derivations.load(Ordering::SeqCst), 1);
        assert!(provider.get_cached().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_seal_without_cipher_fails() {
        let wallet = Arc::new(EncryptingWallet {
            derivations: AtomicUsize::new(0),
        });
        let provider = EncryptionKeysProvider::new(wallet, store(), None);
        assert!(!provider.is_available());
        let err = provider.seal(b"hi", &[]).await.unwrap_err();
        assert!(matches!(err, SdkError::Encryption(_)));
    }

    #[tokio::test]
    async fn test_seal_open_through_cipher() {
        let wallet = Arc::new(EncryptingWallet {
            derivations: AtomicUsize::new(0),
        });
        let provider = EncryptionKeysProvider::new(wallet, store(), Some(Arc::new(XorCipher)));
        let sealed = provider.seal(b"hello", &[]).await.unwrap();
        assert_ne!(sealed, b"hello".to_vec());
        assert_eq!(provider.open(&sealed, &[]).await.unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let keys = EncryptionKeys {
            public_key: vec![1],
            secret_key: vec![9, 9, 9],
        };
        assert!(!format!("{:?}", keys).contains("9, 9"));
    }
}
