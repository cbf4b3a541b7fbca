//! Token signers
//!
//! Wallets that can sign arbitrary messages sign the token directly.
//! Transaction-only wallets sign a memo transaction carrying the token
//! payload, and the signed transaction bytes become the signature.

use crate::error::Result;
use crate::wallet::{PublicKey, WalletAdapter};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::sync::Arc;

#[async_trait]
pub trait TokenSigner: Send + Sync {
    /// Value of the token header's `alg` field
    fn alg(&self) -> &'static str;

    /// Public key the token is issued for
    fn subject(&self) -> PublicKey;

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>>;
}

/// Signs with the wallet's message signing
pub struct Ed25519TokenSigner {
    wallet: Arc<dyn WalletAdapter>,
}

impl Ed25519TokenSigner {
    pub fn new(wallet: Arc<dyn WalletAdapter>) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl TokenSigner for Ed25519TokenSigner {
    fn alg(&self) -> &'static str {
        "ed25519"
    }

    fn subject(&self) -> PublicKey {
        self.wallet.public_key()
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.wallet.sign_message(payload).await
    }
}

/// Memo transaction wrapping the token payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemoTransaction {
    fee_payer: String,
    memo: String,
}

/// Signs a memo transaction carrying the payload
pub struct SolanaTxTokenSigner {
    wallet: Arc<dyn WalletAdapter>,
}

impl SolanaTxTokenSigner {
    pub fn new(wallet: Arc<dyn WalletAdapter>) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl TokenSigner for SolanaTxTokenSigner {
    fn alg(&self) -> &'static str {
        "solana-tx"
    }

    fn subject(&self) -> PublicKey {
        self.wallet.public_key()
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let tx = MemoTransaction {
            fee_payer: self.wallet.public_key().to_string(),
            memo: STANDARD.encode(payload),
        };
        self.wallet.sign_transaction(&serde_json::to_vec(&tx)?).await
    }
}

/// Pick the signer matching what the wallet can do
pub fn token_signer_for(wallet: Arc<dyn WalletAdapter>) -> Arc<dyn TokenSigner> {
    if wallet.can_sign_message() {
        Arc::new(Ed25519TokenSigner::new(wallet))
    } else {
        Arc::new(SolanaTxTokenSigner::new(wallet))
    }
}
