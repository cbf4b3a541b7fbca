use super::{Identity, IdentityProvider, IdentityResolver, IdentityStrategy, Lookup};
use crate::wallet::PublicKey;
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Queries every provider concurrently; the first hit to arrive wins.
///
/// Returning drops the remaining in-flight queries, so stragglers never
/// run to completion or surface their errors.
pub struct FirstFoundFastIdentityResolver {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl FirstFoundFastIdentityResolver {
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        Self { providers }
    }

    async fn lookup(&self, lookup: Lookup<'_>) -> Vec<Identity> {
        let mut pending: FuturesUnordered<_> = self
            .providers
            .iter()
            .map(|provider| async move { (provider.type_name(), lookup.run(provider.as_ref()).await) })
            .collect();

        while let Some((provider, outcome)) = pending.next().await {
            match outcome {
                Ok(Some(identity)) => {
                    debug!(provider, %lookup, "identity resolved");
                    return vec![identity];
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(provider, %lookup, error = %e, "identity provider failed");
                }
            }
        }
        Vec::new()
    }
}

#[async_trait]
impl IdentityResolver for FirstFoundFastIdentityResolver {
    fn strategy(&self) -> IdentityStrategy {
        IdentityStrategy::FirstFoundFast
    }

    async fn resolve(&self, public_key: &PublicKey) -> Vec<Identity> {
        self.lookup(Lookup::Address(public_key)).await
    }

    async fn resolve_reverse(&self, name: &str) -> Vec<Identity> {
        self.lookup(Lookup::Name(name)).await
    }
}
