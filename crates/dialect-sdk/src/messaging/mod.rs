//! Messaging threads
//!
//! [`Messaging`] is implemented once per backend ([`LedgerMessaging`],
//! [`CloudMessaging`]) and once more by [`MessagingFacade`], which routes
//! or merges calls across the enabled backends.

mod cloud;
mod facade;
mod ledger;

pub use cloud::CloudMessaging;
pub use facade::MessagingFacade;
pub use ledger::LedgerMessaging;

use crate::backend::{BackendBinding, BackendContext, BackendKind, Bindings};
use crate::encryption::EncryptionKeysProvider;
use crate::error::{Result, SdkError};
use crate::wallet::PublicKey;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Thread identity: the backend holding it and its address there
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId {
    pub backend: BackendKind,
    pub address: String,
}

impl ThreadId {
    pub fn new(backend: BackendKind, address: impl Into<String>) -> Self {
        Self {
            backend,
            address: address.into(),
        }
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadMemberScope {
    Admin,
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMember {
    pub public_key: PublicKey,
    pub scopes: Vec<ThreadMemberScope>,
}

impl ThreadMember {
    /// Member with both scopes; the creator is always one
    pub fn owner(public_key: PublicKey) -> Self {
        Self {
            public_key,
            scopes: vec![ThreadMemberScope::Admin, ThreadMemberScope::Write],
        }
    }

    pub fn has_scope(&self, scope: ThreadMemberScope) -> bool {
        self.scopes.contains(&scope)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMessage {
    pub author: PublicKey,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    pub me: ThreadMember,
    pub other_members: Vec<ThreadMember>,
    pub encrypted: bool,
    /// False for encrypted threads when no cipher or keys are available
    pub can_be_decrypted: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateThreadCommand {
    pub other_members: Vec<ThreadMember>,
    pub encrypted: bool,
    /// Backend to create on; the highest priority one when unset
    pub backend: Option<BackendKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindThreadQuery {
    ById(ThreadId),
    /// The thread whose members other than the wallet are exactly these
    ByOtherMembers(Vec<PublicKey>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadsSummary {
    pub unread_messages_count: u32,
}

/// Thread operations against one backend or all of them
#[async_trait]
pub trait Messaging: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Thread>>;

    async fn find(&self, query: &FindThreadQuery) -> Result<Option<Thread>>;

    /// Unread summary for the thread with these other members
    async fn find_summary(&self, other_members: &[PublicKey]) -> Result<Option<ThreadsSummary>>;

    async fn create(&self, command: &CreateThreadCommand) -> Result<Thread>;

    /// Messages of a thread, newest first as stored by the backend
    async fn messages(&self, id: &ThreadId) -> Result<Vec<ThreadMessage>>;

    async fn send(&self, id: &ThreadId, command: &SendMessageCommand) -> Result<()>;

    async fn delete(&self, id: &ThreadId) -> Result<()>;
}

/// Build the messaging facade over `backends`, in order
pub fn create_messaging(backends: &[BackendKind], context: &BackendContext) -> Result<MessagingFacade> {
    let bindings = backends
        .iter()
        .map(|&backend| {
            let capability: Arc<dyn Messaging> = match backend {
                BackendKind::Ledger => Arc::new(LedgerMessaging::new(
                    context.wallet,
                    context.ledger_program.clone(),
                    context.encryption.clone(),
                )),
                BackendKind::Cloud => Arc::new(CloudMessaging::new(
                    context.wallet,
                    context.cloud.threads.clone(),
                    context.encryption.clone(),
                )),
            };
            BackendBinding::new(backend, capability)
        })
        .collect();
    Ok(MessagingFacade::new(Bindings::new(bindings)?))
}

pub(crate) fn can_be_decrypted(encrypted: bool, encryption: &EncryptionKeysProvider) -> bool {
    !encrypted || encryption.is_available()
}

/// Message bytes for storage, sealed for `members` when encrypted
pub(crate) async fn encode_text(
    text: &str,
    encrypted: bool,
    members: &[PublicKey],
    encryption: &EncryptionKeysProvider,
) -> Result<Vec<u8>> {
    if encrypted {
        encryption.seal(text.as_bytes(), members).await
    } else {
        Ok(text.as_bytes().to_vec())
    }
}

pub(crate) async fn decode_text(
    bytes: &[u8],
    encrypted: bool,
    members: &[PublicKey],
    encryption: &EncryptionKeysProvider,
) -> Result<String> {
    let plain = if encrypted {
        encryption.open(bytes, members).await?
    } else {
        bytes.to_vec()
    };
    String::from_utf8(plain)
        .map_err(|e| SdkError::Serialization(format!("message is not UTF-8: {}", e)))
}

pub(crate) fn timestamp_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
