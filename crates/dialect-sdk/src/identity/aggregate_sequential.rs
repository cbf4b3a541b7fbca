use super::{Identity, IdentityProvider, IdentityResolver, IdentityStrategy, Lookup};
use crate::wallet::PublicKey;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Queries providers one at a time in order and keeps every hit
pub struct AggregateSequentialIdentityResolver {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl AggregateSequentialIdentityResolver {
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        Self { providers }
    }

    async fn lookup(&self, lookup: Lookup<'_>) -> Vec<Identity> {
        let mut identities = Vec::new();
        for provider in &self.providers {
            match lookup.run(provider.as_ref()).await {
                Ok(Some(identity)) => identities.push(identity),
                Ok(None) => {}
                Err(e) => {
                    warn!(provider = provider.type_name(), %lookup, error = %e, "identity provider failed");
                }
            }
        }
        identities
    }
}

#[async_trait]
impl IdentityResolver for AggregateSequentialIdentityResolver {
    fn strategy(&self) -> IdentityStrategy {
        IdentityStrategy::AggregateSequential
    }

    async fn resolve(&self, public_key: &PublicKey) -> Vec<Identity> {
        self.lookup(Lookup::Address(public_key)).await
    }

    async fn resolve_reverse(&self, name: &str) -> Vec<Identity> {
        self.lookup(Lookup::Name(name)).await
    }
}
