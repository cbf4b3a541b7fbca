//! SDK configuration
//!
//! [`ConfigInput`] is the partial configuration an application supplies.
//! [`resolve`] folds it over environment presets into a [`ResolvedConfig`]
//! where every field has a concrete value. [`ConfigSummary`] is the
//! redacted, comparable view of a resolved configuration used for logging
//! and inspection.

pub mod presets;
pub mod reporter;
pub mod resolver;

pub use reporter::{ConfigReporter, TracingConfigReporter};
pub use resolver::resolve;

use crate::auth::TokenStore;
use crate::backend::BackendKind;
use crate::encryption::{EncryptionKeysStore, MessageCipher};
use crate::error::{Result, SdkError};
use crate::identity::IdentityProvider;
use crate::storage::StoreSelector;
use crate::wallet::{PublicKey, WalletAdapter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Deployment environment selecting a whole set of endpoint presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    #[default]
    Production,
    Development,
    LocalDevelopment,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::LocalDevelopment => "local-development",
        }
    }

    /// Solana network an environment runs against
    pub fn solana_network(&self) -> SolanaNetwork {
        match self {
            Self::Production => SolanaNetwork::MainnetBeta,
            Self::Development => SolanaNetwork::Devnet,
            Self::LocalDevelopment => SolanaNetwork::Localnet,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            "local-development" => Ok(Self::LocalDevelopment),
            _ => Err(SdkError::IllegalArgument(format!("unknown environment {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolanaNetwork {
    MainnetBeta,
    Devnet,
    Localnet,
}

impl SolanaNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Localnet => "localnet",
        }
    }
}

impl fmt::Display for SolanaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolanaNetwork {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mainnet-beta" => Ok(Self::MainnetBeta),
            "devnet" => Ok(Self::Devnet),
            "localnet" => Ok(Self::Localnet),
            _ => Err(SdkError::IllegalArgument(format!("unknown solana network {}", s))),
        }
    }
}

/// A store given either by backing name or as a ready instance
pub enum StoreInput<T: ?Sized> {
    Selector(StoreSelector),
    Instance(Arc<T>),
}

impl<T: ?Sized> Clone for StoreInput<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Selector(selector) => Self::Selector(*selector),
            Self::Instance(store) => Self::Instance(store.clone()),
        }
    }
}

impl<T: ?Sized> From<StoreSelector> for StoreInput<T> {
    fn from(selector: StoreSelector) -> Self {
        Self::Selector(selector)
    }
}

pub type TokenStoreInput = StoreInput<dyn TokenStore>;
pub type EncryptionKeysStoreInput = StoreInput<dyn EncryptionKeysStore>;

/// Cloud backend settings; each field independently optional
#[derive(Clone, Default)]
pub struct DialectCloudConfigInput {
    /// Selects the URL preset, independent of the top-level environment
    pub environment: Option<Environment>,
    /// Overrides any preset URL
    pub url: Option<String>,
    pub token_store: Option<TokenStoreInput>,
    pub token_lifetime_minutes: Option<u32>,
}

/// Ledger backend settings; each field independently optional
#[derive(Debug, Clone, Default)]
pub struct SolanaConfigInput {
    /// Selects the program and RPC preset, independent of the top-level environment
    pub network: Option<SolanaNetwork>,
    pub dialect_program_address: Option<PublicKey>,
    pub rpc_url: Option<String>,
}

#[derive(Clone, Default)]
pub struct IdentityConfigInput {
    /// `first-found`, `first-found-fast` or `aggregate-sequential`
    pub strategy: Option<String>,
    /// Providers in priority order
    pub resolvers: Option<Vec<Arc<dyn IdentityProvider>>>,
}

/// Partial configuration supplied by the application
///
/// # Example
///
/// ```rust,ignore
/// let input = ConfigInput::new(wallet)
///     .with_environment(Environment::Development)
///     .with_backends(vec![BackendKind::Cloud]);
/// ```
#[derive(Clone)]
pub struct ConfigInput {
    pub environment: Option<Environment>,
    pub wallet: Arc<dyn WalletAdapter>,
    pub backends: Option<Vec<BackendKind>>,
    pub dialect_cloud: Option<DialectCloudConfigInput>,
    pub solana: Option<SolanaConfigInput>,
    pub encryption_keys_store: Option<EncryptionKeysStoreInput>,
    pub identity: Option<IdentityConfigInput>,
    pub message_cipher: Option<Arc<dyn MessageCipher>>,
}

impl ConfigInput {
    pub fn new(wallet: Arc<dyn WalletAdapter>) -> Self {
        Self {
            environment: None,
            wallet,
            backends: None,
            dialect_cloud: None,
            solana: None,
            encryption_keys_store: None,
            identity: None,
            message_cipher: None,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_backends(mut self, backends: Vec<BackendKind>) -> Self {
        self.backends = Some(backends);
        self
    }

    pub fn with_dialect_cloud(mut self, dialect_cloud: DialectCloudConfigInput) -> Self {
        self.dialect_cloud = Some(dialect_cloud);
        self
    }

    pub fn with_solana(mut self, solana: SolanaConfigInput) -> Self {
        self.solana = Some(solana);
        self
    }

    pub fn with_encryption_keys_store(mut self, store: impl Into<EncryptionKeysStoreInput>) -> Self {
        self.encryption_keys_store = Some(store.into());
        self
    }

    pub fn with_identity(mut self, identity: IdentityConfigInput) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_message_cipher(mut self, cipher: Arc<dyn MessageCipher>) -> Self {
        self.message_cipher = Some(cipher);
        self
    }
}

#[derive(Clone)]
pub struct ResolvedDialectCloudConfig {
    pub environment: Environment,
    pub url: String,
    pub token_store: Arc<dyn TokenStore>,
    pub token_lifetime_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSolanaConfig {
    pub network: SolanaNetwork,
    pub dialect_program_address: PublicKey,
    pub rpc_url: String,
}

#[derive(Clone)]
pub struct ResolvedIdentityConfig {
    pub strategy: String,
    pub resolvers: Vec<Arc<dyn IdentityProvider>>,
}

/// Fully specified configuration; immutable once resolved
#[derive(Clone)]
pub struct ResolvedConfig {
    pub environment: Environment,
    pub wallet: Arc<dyn WalletAdapter>,
    pub backends: Vec<BackendKind>,
    pub dialect_cloud: ResolvedDialectCloudConfig,
    pub solana: ResolvedSolanaConfig,
    pub encryption_keys_store: Arc<dyn EncryptionKeysStore>,
    pub identity: ResolvedIdentityConfig,
    pub message_cipher: Option<Arc<dyn MessageCipher>>,
}

impl ResolvedConfig {
    /// Redacted view safe to log or print
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            environment: self.environment,
            wallet: self.wallet.public_key().to_string(),
            backends: self.backends.clone(),
            dialect_cloud: CloudSummary {
                environment: self.dialect_cloud.environment,
                url: redact_url(&self.dialect_cloud.url),
                token_store: self.dialect_cloud.token_store.name().to_string(),
                token_lifetime_minutes: self.dialect_cloud.token_lifetime_minutes,
            },
            solana: SolanaSummary {
                network: self.solana.network,
                dialect_program_address: self.solana.dialect_program_address.to_string(),
                rpc_url: redact_url(&self.solana.rpc_url),
            },
            encryption_keys_store: self.encryption_keys_store.name().to_string(),
            identity: IdentitySummary {
                strategy: self.identity.strategy.clone(),
                resolvers: self
                    .identity
                    .resolvers
                    .iter()
                    .map(|r| r.type_name().to_string())
                    .collect(),
            },
            message_cipher: self.message_cipher.is_some(),
        }
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResolvedConfig").field(&self.summary()).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSummary {
    pub environment: Environment,
    pub url: String,
    pub token_store: String,
    pub token_lifetime_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaSummary {
    pub network: SolanaNetwork,
    pub dialect_program_address: String,
    pub rpc_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub strategy: String,
    pub resolvers: Vec<String>,
}

/// Redacted, comparable view of a [`ResolvedConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub environment: Environment,
    pub wallet: String,
    pub backends: Vec<BackendKind>,
    pub dialect_cloud: CloudSummary,
    pub solana: SolanaSummary,
    pub encryption_keys_store: String,
    pub identity: IdentitySummary,
    pub message_cipher: bool,
}

/// Drop query strings, which commonly carry API keys
fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?<redacted>", base),
        None => url.to_string(),
    }
}
