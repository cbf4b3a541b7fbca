//! On-chain Dialect program access
//!
//! Ledger-backed capabilities talk to the chain only through
//! [`LedgerProgram`]. The default implementation is [`RpcLedgerProgram`],
//! which speaks JSON-RPC to a Solana RPC node.

mod rpc;

pub use rpc::{RpcLedgerProgram, RpcLedgerProgramFactory};

use crate::error::Result;
use crate::wallet::{PublicKey, WalletAdapter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMember {
    pub public_key: PublicKey,
    pub admin: bool,
    pub write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMessage {
    pub owner: PublicKey,
    /// Raw (possibly encrypted) message bytes
    pub text: Vec<u8>,
    /// Unix millis
    pub timestamp: i64,
}

/// A thread account owned by the Dialect program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerThreadAccount {
    pub address: PublicKey,
    pub members: Vec<LedgerMember>,
    #[serde(default)]
    pub messages: Vec<LedgerMessage>,
    pub encrypted: bool,
    /// Unix millis
    pub last_message_timestamp: i64,
}

impl LedgerThreadAccount {
    pub fn updated_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_message_timestamp).unwrap_or_default()
    }
}

/// Handle to the Dialect program on one cluster
#[async_trait]
pub trait LedgerProgram: Send + Sync {
    fn program_address(&self) -> &PublicKey;

    fn rpc_url(&self) -> &str;

    /// Threads `member` belongs to
    async fn find_threads(&self, member: &PublicKey) -> Result<Vec<LedgerThreadAccount>>;

    async fn find_thread(&self, address: &PublicKey) -> Result<Option<LedgerThreadAccount>>;

    /// Create a thread; `members[0]` is the signing wallet
    async fn create_thread(&self, members: &[LedgerMember], encrypted: bool) -> Result<LedgerThreadAccount>;

    async fn send_message(&self, address: &PublicKey, text: &[u8]) -> Result<()>;

    async fn delete_thread(&self, address: &PublicKey) -> Result<()>;
}

/// Builds program handles; must not perform I/O
pub trait LedgerProgramFactory: Send + Sync {
    fn create(
        &self,
        wallet: Arc<dyn WalletAdapter>,
        program_address: PublicKey,
        rpc_url: &str,
    ) -> Result<Arc<dyn LedgerProgram>>;
}
