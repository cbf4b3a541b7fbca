//! Layered configuration resolution
//!
//! Endpoint settings are resolved by folding partial layers over the
//! production preset, lowest precedence first:
//!
//! 1. production defaults
//! 2. top-level environment preset (cloud and ledger)
//! 3. cloud environment preset (cloud only)
//! 4. Solana network preset (ledger only)
//! 5. explicit URL / program address / RPC URL overrides
//!
//! A layer only replaces the fields it sets.

use super::presets::{cloud_url, solana_preset};
use super::{
    ConfigInput, EncryptionKeysStoreInput, Environment, ResolvedConfig,
    ResolvedDialectCloudConfig, ResolvedIdentityConfig, ResolvedSolanaConfig, SolanaNetwork,
    StoreInput, TokenStoreInput,
};
use crate::auth::{StorageTokenStore, TokenStore, DEFAULT_TOKEN_LIFETIME_MINUTES};
use crate::backend::resolve_backends;
use crate::encryption::{EncryptionKeysStore, StorageEncryptionKeysStore};
use crate::error::{Result, SdkError};
use crate::identity::IdentityStrategy;
use crate::storage::StoreSelector;
use crate::wallet::PublicKey;
use std::sync::Arc;

/// Endpoint settings with every field decided
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoints {
    environment: Environment,
    cloud_environment: Environment,
    cloud_url: String,
    solana_network: SolanaNetwork,
    program_address: PublicKey,
    rpc_url: String,
}

/// Partial endpoint settings contributed by one precedence level
#[derive(Debug, Clone, Default)]
struct Layer {
    environment: Option<Environment>,
    cloud_environment: Option<Environment>,
    cloud_url: Option<String>,
    solana_network: Option<SolanaNetwork>,
    program_address: Option<PublicKey>,
    rpc_url: Option<String>,
}

impl Layer {
    fn cloud_preset(environment: Environment) -> Self {
        Self {
            cloud_environment: Some(environment),
            cloud_url: Some(cloud_url(environment).to_string()),
            ..Default::default()
        }
    }

    fn solana_preset(network: SolanaNetwork) -> Result<Self> {
        let preset = solana_preset(network);
        Ok(Self {
            solana_network: Some(network),
            program_address: Some(preset.program_address()?),
            rpc_url: Some(preset.rpc_url.to_string()),
            ..Default::default()
        })
    }

    /// Both sub-configs from one environment tag
    fn environment_preset(environment: Environment) -> Result<Self> {
        Ok(Self {
            environment: Some(environment),
            ..Self::cloud_preset(environment)
        }
        .merge(Self::solana_preset(environment.solana_network())?))
    }

    /// Fields of `other` win where set
    fn merge(self, other: Layer) -> Self {
        Self {
            environment: other.environment.or(self.environment),
            cloud_environment: other.cloud_environment.or(self.cloud_environment),
            cloud_url: other.cloud_url.or(self.cloud_url),
            solana_network: other.solana_network.or(self.solana_network),
            program_address: other.program_address.or(self.program_address),
            rpc_url: other.rpc_url.or(self.rpc_url),
        }
    }

    fn apply(self, base: Endpoints) -> Endpoints {
        Endpoints {
            environment: self.environment.unwrap_or(base.environment),
            cloud_environment: self.cloud_environment.unwrap_or(base.cloud_environment),
            cloud_url: self.cloud_url.unwrap_or(base.cloud_url),
            solana_network: self.solana_network.unwrap_or(base.solana_network),
            program_address: self.program_address.unwrap_or(base.program_address),
            rpc_url: self.rpc_url.unwrap_or(base.rpc_url),
        }
    }
}

fn defaults() -> Result<Endpoints> {
    let environment = Environment::default();
    let preset = solana_preset(environment.solana_network());
    Ok(Endpoints {
        environment,
        cloud_environment: environment,
        cloud_url: cloud_url(environment).to_string(),
        solana_network: preset.network,
        program_address: preset.program_address()?,
        rpc_url: preset.rpc_url.to_string(),
    })
}

/// Precedence layers for `input`, lowest first
fn layers(input: &ConfigInput) -> Result<Vec<Layer>> {
    let mut layers = Vec::with_capacity(4);

    if let Some(environment) = input.environment {
        layers.push(Layer::environment_preset(environment)?);
    }

    let cloud = input.dialect_cloud.as_ref();
    if let Some(environment) = cloud.and_then(|c| c.environment) {
        layers.push(Layer::cloud_preset(environment));
    }

    let solana = input.solana.as_ref();
    if let Some(network) = solana.and_then(|s| s.network) {
        layers.push(Layer::solana_preset(network)?);
    }

    layers.push(Layer {
        cloud_url: cloud.and_then(|c| c.url.clone()),
        program_address: solana.and_then(|s| s.dialect_program_address),
        rpc_url: solana.and_then(|s| s.rpc_url.clone()),
        ..Default::default()
    });

    Ok(layers)
}

fn token_store(input: Option<&TokenStoreInput>) -> Arc<dyn TokenStore> {
    match input {
        Some(StoreInput::Instance(store)) => store.clone(),
        Some(StoreInput::Selector(selector)) => {
            Arc::new(StorageTokenStore::from_selector(*selector))
        }
        None => Arc::new(StorageTokenStore::from_selector(StoreSelector::default())),
    }
}

fn encryption_keys_store(input: Option<&EncryptionKeysStoreInput>) -> Arc<dyn EncryptionKeysStore> {
    match input {
        Some(StoreInput::Instance(store)) => store.clone(),
        Some(StoreInput::Selector(selector)) => {
            Arc::new(StorageEncryptionKeysStore::from_selector(*selector))
        }
        None => Arc::new(StorageEncryptionKeysStore::from_selector(StoreSelector::default())),
    }
}

/// Resolve a partial configuration. Performs no I/O.
///
/// Fails with `IllegalArgument` only for invalid explicit values: an empty
/// backend list or a zero token lifetime.
pub fn resolve(input: &ConfigInput) -> Result<ResolvedConfig> {
    let backends = resolve_backends(input.backends.as_deref())?;

    let endpoints = layers(input)?
        .into_iter()
        .fold(defaults()?, |acc, layer| layer.apply(acc));

    let cloud = input.dialect_cloud.as_ref();
    let token_lifetime_minutes = match cloud.and_then(|c| c.token_lifetime_minutes) {
        Some(0) => {
            return Err(SdkError::IllegalArgument(
                "token lifetime must be at least one minute".to_string(),
            ))
        }
        Some(minutes) => minutes,
        None => DEFAULT_TOKEN_LIFETIME_MINUTES,
    };

    let identity = match &input.identity {
        Some(identity) => ResolvedIdentityConfig {
            strategy: identity
                .strategy
                .clone()
                .unwrap_or_else(|| IdentityStrategy::default().to_string()),
            resolvers: identity.resolvers.clone().unwrap_or_default(),
        },
        None => ResolvedIdentityConfig {
            strategy: IdentityStrategy::default().to_string(),
            resolvers: Vec::new(),
        },
    };

    Ok(ResolvedConfig {
        environment: endpoints.environment,
        wallet: input.wallet.clone(),
        backends,
        dialect_cloud: ResolvedDialectCloudConfig {
            environment: endpoints.cloud_environment,
            url: endpoints.cloud_url,
            token_store: token_store(cloud.and_then(|c| c.token_store.as_ref())),
            token_lifetime_minutes,
        },
        solana: ResolvedSolanaConfig {
            network: endpoints.solana_network,
            dialect_program_address: endpoints.program_address,
            rpc_url: endpoints.rpc_url,
        },
        encryption_keys_store: encryption_keys_store(input.encryption_keys_store.as_ref()),
        identity,
        message_cipher: input.message_cipher.clone(),
    })
}
