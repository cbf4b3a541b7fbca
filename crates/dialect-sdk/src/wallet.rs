//! Wallet handle consumed by the SDK
//!
//! The wallet is an external collaborator: it owns the signing key and
//! reports which operations it supports. The SDK only depends on this trait.

use crate::encryption::EncryptionKeys;
use crate::error::{Result, SdkError};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte account key, displayed in base58
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for PublicKey {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SdkError::IllegalArgument(format!("invalid public key {}: {}", s, e)))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            SdkError::IllegalArgument(format!(
                "invalid public key {}: expected 32 bytes, got {}",
                s,
                v.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Wallet capabilities the SDK relies on.
///
/// Only `public_key` is mandatory. A wallet that can sign arbitrary messages
/// gets a direct token signer; one that can only sign transactions gets a
/// transaction-wrapping signer.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    fn public_key(&self) -> PublicKey;

    fn can_sign_message(&self) -> bool {
        false
    }

    fn can_sign_transaction(&self) -> bool {
        false
    }

    fn can_encrypt(&self) -> bool {
        false
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Vec<u8>> {
        Err(SdkError::Wallet("wallet cannot sign messages".to_string()))
    }

    /// Sign a serialized transaction and return the signed bytes
    async fn sign_transaction(&self, _transaction: &[u8]) -> Result<Vec<u8>> {
        Err(SdkError::Wallet("wallet cannot sign transactions".to_string()))
    }

    /// Derive the wallet's Diffie-Hellman encryption keys
    async fn diffie_hellman(&self) -> Result<EncryptionKeys> {
        Err(SdkError::Wallet("wallet cannot derive encryption keys".to_string()))
    }
}
