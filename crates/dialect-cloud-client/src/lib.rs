//! Rust client for the Dialect cloud data service API
//!
//! The cloud backend ("data service") stores threads, dapp records,
//! notification types and wallet subscriptions behind a bearer-token REST
//! API. This crate is the thin transport layer the SDK builds its cloud
//! capability implementations on.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dialect_cloud_client::{CloudApi, CloudClientConfig, StaticToken};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = CloudApi::new(
//!     CloudClientConfig {
//!         base_url: "https://dialectapi.to".into(),
//!         ..Default::default()
//!     },
//!     Arc::new(StaticToken::new("token")),
//! )?;
//!
//! // List threads the authenticated wallet is a member of
//! let threads = api.threads.find_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

// Re-export main types
pub use auth::{StaticToken, TokenSource};
pub use client::{
    CloudApi, DappNotificationSubscriptionsClient, DappNotificationTypesClient, DappsClient,
    ThreadsClient, WalletAddressesClient, WalletDappAddressesClient, WalletMessagesClient,
    WalletNotificationSubscriptionsClient,
};
pub use error::{CloudError, Result};
pub use types::*;
