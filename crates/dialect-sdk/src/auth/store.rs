//! Token persistence

use super::token::Token;
use crate::error::Result;
use crate::storage::{KeyValueStorage, StoreSelector};
use crate::wallet::PublicKey;

/// Persistence for issued tokens, one per wallet
pub trait TokenStore: Send + Sync {
    /// Store name reported in configuration summaries
    fn name(&self) -> &str {
        "custom"
    }

    fn get(&self, subject: &PublicKey) -> Result<Option<Token>>;

    fn save(&self, subject: &PublicKey, token: &Token) -> Result<()>;

    fn delete(&self, subject: &PublicKey) -> Result<()>;
}

/// Token store on top of a named backing
pub struct StorageTokenStore {
    storage: Box<dyn KeyValueStorage>,
}

impl StorageTokenStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn from_selector(selector: StoreSelector) -> Self {
        Self::new(selector.open())
    }

    fn key(subject: &PublicKey) -> String {
        format!("dialect-auth-token-{}", subject)
    }
}

impl TokenStore for StorageTokenStore {
    fn name(&self) -> &str {
        self.storage.name()
    }

    fn get(&self, subject: &PublicKey) -> Result<Option<Token>> {
        self.storage
            .get(&Self::key(subject))?
            .map(|raw| Token::parse(&raw))
            .transpose()
    }

    fn save(&self, subject: &PublicKey, token: &Token) -> Result<()> {
        self.storage.set(&Self::key(subject), &token.raw)
    }

    fn delete(&self, subject: &PublicKey) -> Result<()> {
        self.storage.remove(&Self::key(subject))
    }
}
