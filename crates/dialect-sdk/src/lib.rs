//! Dialect SDK
//!
//! Client SDK for wallet-to-wallet messaging and dapp notifications across
//! interchangeable backends.
//!
//! # Architecture
//!
//! Two backends implement the same capabilities:
//! - **Ledger**: threads as accounts of the on-chain Dialect program
//! - **Cloud**: threads and dapp metadata in the Dialect data service
//!
//! The SDK resolves a partial configuration into a complete one, builds
//! one implementation per enabled backend and exposes them behind facades
//! that route, broadcast or merge. Backend order is priority order.
//!
//! # Example
//!
//! ```rust,ignore
//! use dialect_sdk::{BackendKind, ConfigInput, Environment, Sdk};
//!
//! let sdk = Sdk::create(
//!     ConfigInput::new(wallet)
//!         .with_environment(Environment::Development)
//!         .with_backends(vec![BackendKind::Cloud, BackendKind::Ledger]),
//! )?;
//!
//! // Threads from every backend, cloud first
//! let threads = sdk.threads().find_all().await?;
//!
//! // Who is on the other side
//! let identities = sdk.identity().resolve(&threads[0].other_members[0].public_key).await;
//! ```

// Wallet handle
pub mod wallet;

// Backend kinds and bindings
pub mod backend;

// Configuration resolution
pub mod config;

// Auth tokens for the data service
pub mod auth;

// Token and key storage backings
pub mod storage;

// Encryption keys
pub mod encryption;

// On-chain program access
pub mod ledger;

// Capabilities
pub mod dapp;
pub mod messaging;
pub mod wallets;

// Identity resolution strategies
pub mod identity;

// Assembly
pub mod sdk;

// Error types
pub mod error;

pub use backend::{BackendKind, DEFAULT_BACKENDS};
pub use config::{
    ConfigInput, ConfigReporter, ConfigSummary, DialectCloudConfigInput, Environment,
    IdentityConfigInput, ResolvedConfig, SolanaConfigInput, SolanaNetwork, StoreInput,
};
pub use dapp::{Dapp, DappAddress, Dapps, DeliveryReport, Recipients, SendDappMessageCommand};
pub use encryption::{EncryptionKeys, MessageCipher};
pub use identity::{
    create_identity_resolver, Identity, IdentityProvider, IdentityResolver, IdentityStrategy,
};
pub use messaging::{
    CreateThreadCommand, FindThreadQuery, Messaging, SendMessageCommand, Thread, ThreadId,
    ThreadMember, ThreadMemberScope, ThreadMessage,
};
pub use sdk::{Sdk, SdkFactory, SdkInfo};
pub use storage::StoreSelector;
pub use wallet::{PublicKey, WalletAdapter};

// Re-export error types
pub use error::{Result, SdkError};
