//! Identity resolution
//!
//! An [`IdentityProvider`] maps a wallet address to human-readable identity
//! (and back). An [`IdentityResolver`] combines several providers under one
//! of three execution strategies:
//!
//! - `first-found`: providers in order, stop at the first hit
//! - `first-found-fast`: all providers at once, first hit to arrive wins
//! - `aggregate-sequential`: providers in order, collect every hit
//!
//! Provider failures never fail a resolution; they are logged and skipped.

mod aggregate_sequential;
mod first_found;
mod first_found_fast;

pub use aggregate_sequential::AggregateSequentialIdentityResolver;
pub use first_found::FirstFoundIdentityResolver;
pub use first_found_fast::FirstFoundFastIdentityResolver;

use crate::error::{Result, SdkError};
use crate::wallet::PublicKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Optional presentation details attached by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAdditionals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Identity information resolved for a wallet address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub name: String,
    pub public_key: PublicKey,
    /// `type_name` of the provider that produced it
    pub provider: String,
    #[serde(default)]
    pub additionals: IdentityAdditionals,
}

/// A single identity source (name service, social graph, ...)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn type_name(&self) -> &str;

    async fn resolve(&self, public_key: &PublicKey) -> Result<Option<Identity>>;

    async fn resolve_reverse(&self, name: &str) -> Result<Option<Identity>>;
}

/// Resolves identities across providers under one strategy
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    fn strategy(&self) -> IdentityStrategy;

    /// Identities for a wallet address; empty when no provider knows it
    async fn resolve(&self, public_key: &PublicKey) -> Vec<Identity>;

    /// Identities for a human-readable name
    async fn resolve_reverse(&self, name: &str) -> Vec<Identity>;
}

/// Direction of one provider query
#[derive(Debug, Clone, Copy)]
pub(crate) enum Lookup<'a> {
    Address(&'a PublicKey),
    Name(&'a str),
}

impl Lookup<'_> {
    /// Provider failures come back as `SdkError::Identity` naming the provider
    pub(crate) async fn run(self, provider: &dyn IdentityProvider) -> Result<Option<Identity>> {
        let outcome = match self {
            Self::Address(public_key) => provider.resolve(public_key).await,
            Self::Name(name) => provider.resolve_reverse(name).await,
        };
        outcome.map_err(|e| match e {
            SdkError::Identity(_) => e,
            other => SdkError::Identity(format!("{}: {}", provider.type_name(), other)),
        })
    }
}

impl fmt::Display for Lookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(public_key) => write!(f, "{}", public_key),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStrategy {
    #[default]
    FirstFound,
    FirstFoundFast,
    AggregateSequential,
}

impl IdentityStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstFound => "first-found",
            Self::FirstFoundFast => "first-found-fast",
            Self::AggregateSequential => "aggregate-sequential",
        }
    }
}

impl fmt::Display for IdentityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityStrategy {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first-found" => Ok(Self::FirstFound),
            "first-found-fast" => Ok(Self::FirstFoundFast),
            "aggregate-sequential" => Ok(Self::AggregateSequential),
            _ => Err(SdkError::IllegalArgument(format!(
                "unknown identity strategy {}",
                s
            ))),
        }
    }
}

/// Build the resolver for a strategy name
pub fn create_identity_resolver(
    strategy: &str,
    providers: Vec<Arc<dyn IdentityProvider>>,
) -> Result<Arc<dyn IdentityResolver>> {
    Ok(match strategy.parse::<IdentityStrategy>()? {
        IdentityStrategy::FirstFound => Arc::new(FirstFoundIdentityResolver::new(providers)),
        IdentityStrategy::FirstFoundFast => {
            Arc::new(FirstFoundFastIdentityResolver::new(providers))
        }
        IdentityStrategy::AggregateSequential => {
            Arc::new(AggregateSequentialIdentityResolver::new(providers))
        }
    })
}
