//! Auth tokens for the cloud backend
//!
//! Provides:
//! - Wallet-signed bearer tokens (`header.body.signature`)
//! - Signers for message-capable and transaction-only wallets
//! - Token persistence over the named storage backings
//! - A caching provider that refreshes tokens shortly before expiry

pub mod provider;
pub mod signer;
pub mod store;
pub mod token;

pub use provider::{create_token_provider, BearerTokens, CachedTokenProvider, TokenProvider};
pub use signer::{token_signer_for, Ed25519TokenSigner, SolanaTxTokenSigner, TokenSigner};
pub use store::{StorageTokenStore, TokenStore};
pub use token::{Token, TokenBody, TokenHeader};

/// Token lifetime when none is configured
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: u32 = 60;
