//! Token provider with store-backed caching

use super::signer::TokenSigner;
use super::store::TokenStore;
use super::token::Token;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Duration;
use dialect_cloud_client::{CloudError, TokenSource};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Supplies a currently valid auth token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get(&self) -> Result<Token>;
}

/// Returns the stored token until it nears expiry, then issues a new one.
///
/// Concurrent callers share one refresh: the lock is held across
/// generation so the wallet is asked to sign at most once per expiry.
pub struct CachedTokenProvider {
    signer: Arc<dyn TokenSigner>,
    ttl: Duration,
    store: Arc<dyn TokenStore>,
    refresh: Mutex<()>,
}

impl CachedTokenProvider {
    /// Upper bound on how early a token is replaced
    const MAX_REFRESH_MARGIN_SECS: i64 = 300;

    pub fn new(signer: Arc<dyn TokenSigner>, ttl: Duration, store: Arc<dyn TokenStore>) -> Self {
        Self {
            signer,
            ttl,
            store,
            refresh: Mutex::new(()),
        }
    }

    /// A tenth of the lifetime, capped at five minutes
    fn refresh_margin(&self) -> Duration {
        Duration::seconds((self.ttl.num_seconds() / 10).min(Self::MAX_REFRESH_MARGIN_SECS))
    }

    fn is_usable(&self, token: &Token) -> bool {
        token.header.alg == self.signer.alg() && !token.expires_within(self.refresh_margin())
    }
}

#[async_trait]
impl TokenProvider for CachedTokenProvider {
    async fn get(&self) -> Result<Token> {
        let _guard = self.refresh.lock().await;
        let subject = self.signer.subject();

        match self.store.get(&subject) {
            Ok(Some(token)) if self.is_usable(&token) => return Ok(token),
            Ok(Some(_)) => debug!(wallet = %subject, "stored token near expiry, refreshing"),
            Ok(None) => {}
            Err(e) => {
                warn!(wallet = %subject, error = %e, "discarding unreadable stored token");
                let _ = self.store.delete(&subject);
            }
        }

        let token = Token::generate(self.signer.as_ref(), self.ttl).await?;
        self.store.save(&subject, &token)?;
        debug!(wallet = %subject, exp = token.body.exp, "issued auth token");
        Ok(token)
    }
}

pub fn create_token_provider(
    signer: Arc<dyn TokenSigner>,
    ttl: Duration,
    store: Arc<dyn TokenStore>,
) -> Arc<dyn TokenProvider> {
    Arc::new(CachedTokenProvider::new(signer, ttl, store))
}

/// Adapts a token provider to the cloud client's bearer token source
pub struct BearerTokens(pub Arc<dyn TokenProvider>);

#[async_trait]
impl TokenSource for BearerTokens {
    async fn bearer_token(&self) -> dialect_cloud_client::Result<String> {
        self.0
            .get()
            .await
            .map(|token| token.raw)
            .map_err(|e| CloudError::Auth(e.to_string()))
    }
}
