use super::{Identity, IdentityProvider, IdentityResolver, IdentityStrategy, Lookup};
use crate::wallet::PublicKey;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Queries providers one at a time in order and stops at the first hit
pub struct FirstFoundIdentityResolver {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl FirstFoundIdentityResolver {
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        Self { providers }
    }

    async fn lookup(&self, lookup: Lookup<'_>) -> Vec<Identity> {
        for provider in &self.providers {
            match lookup.run(provider.as_ref()).await {
                Ok(Some(identity)) => {
                    debug!(provider = provider.type_name(), %lookup, "identity resolved");
                    return vec![identity];
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(provider = provider.type_name(), %lookup, error = %e, "identity provider failed");
                }
            }
        }
        Vec::new()
    }
}

#[async_trait]
impl IdentityResolver for FirstFoundIdentityResolver {
    fn strategy(&self) -> IdentityStrategy {
        IdentityStrategy::FirstFound
    }

    async fn resolve(&self, public_key: &PublicKey) -> Vec<Identity> {
        self.lookup(Lookup::Address(public_key)).await
    }

    async fn resolve_reverse(&self, name: &str) -> Vec<Identity> {
        self.lookup(Lookup::Name(name)).await
    }
}
