use super::notifications::DappNotificationSubscriptions;
use crate::backend::{BackendKind, Bindings};
use crate::error::{Result, SdkError};
use crate::ledger::{LedgerMember, LedgerProgram, LedgerThreadAccount};
use crate::wallet::PublicKey;
use async_trait::async_trait;
use dialect_cloud_client::{
    BroadcastDappMessageCommand, DappsClient, MulticastDappMessageCommand,
    UnicastDappMessageCommand,
};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    One(PublicKey),
    Many(Vec<PublicKey>),
    /// Every subscriber of the dapp
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendDappMessageCommand {
    pub title: String,
    pub message: String,
    /// Restrict delivery to subscribers of this notification type
    pub notification_type_id: Option<String>,
    pub recipients: Recipients,
}

/// Outcome of a message broadcast across backends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: Vec<BackendKind>,
    pub failed: Vec<(BackendKind, String)>,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[async_trait]
pub trait DappMessages: Send + Sync {
    async fn send(&self, command: &SendDappMessageCommand) -> Result<()>;
}

pub struct CloudDappMessages {
    dapp: String,
    api: DappsClient,
}

impl CloudDappMessages {
    pub fn new(dapp: PublicKey, api: DappsClient) -> Self {
        Self {
            dapp: dapp.to_string(),
            api,
        }
    }
}

#[async_trait]
impl DappMessages for CloudDappMessages {
    async fn send(&self, command: &SendDappMessageCommand) -> Result<()> {
        let title = command.title.clone();
        let message = command.message.clone();
        let notification_type_id = command.notification_type_id.clone();
        match &command.recipients {
            Recipients::One(recipient) => {
                self.api
                    .unicast(
                        &self.dapp,
                        &UnicastDappMessageCommand {
                            title,
                            message,
                            recipient_public_key: recipient.to_string(),
                            notification_type_id,
                        },
                    )
                    .await?
            }
            Recipients::Many(recipients) => {
                self.api
                    .multicast(
                        &self.dapp,
                        &MulticastDappMessageCommand {
                            title,
                            message,
                            recipient_public_keys: recipients.iter().map(|r| r.to_string()).collect(),
                            notification_type_id,
                        },
                    )
                    .await?
            }
            Recipients::All => {
                self.api
                    .broadcast(
                        &self.dapp,
                        &BroadcastDappMessageCommand {
                            title,
                            message,
                            notification_type_id,
                        },
                    )
                    .await?
            }
        }
        Ok(())
    }
}

/// Delivers dapp messages as plain thread messages, creating the thread
/// with a recipient on first contact
pub struct LedgerDappMessages {
    dapp: PublicKey,
    program: Arc<dyn LedgerProgram>,
    subscriptions: DappNotificationSubscriptions,
}

impl LedgerDappMessages {
    pub fn new(
        dapp: PublicKey,
        program: Arc<dyn LedgerProgram>,
        subscriptions: DappNotificationSubscriptions,
    ) -> Self {
        Self {
            dapp,
            program,
            subscriptions,
        }
    }

    fn counterpart(&self, thread: &LedgerThreadAccount) -> Option<PublicKey> {
        thread
            .members
            .iter()
            .map(|m| m.public_key)
            .find(|k| *k != self.dapp)
    }

    async fn deliver(&self, threads: &[LedgerThreadAccount], recipient: PublicKey, text: &[u8]) -> Result<()> {
        let address = match threads.iter().find(|t| self.counterpart(t) == Some(recipient)) {
            Some(thread) => thread.address,
            None => {
                debug!(%recipient, "opening thread with recipient");
                let members = [
                    LedgerMember {
                        public_key: self.dapp,
                        admin: true,
                        write: true,
                    },
                    LedgerMember {
                        public_key: recipient,
                        admin: false,
                        write: false,
                    },
                ];
                self.program.create_thread(&members, false).await?.address
            }
        };
        self.program.send_message(&address, text).await
    }
}

#[async_trait]
impl DappMessages for LedgerDappMessages {
    async fn send(&self, command: &SendDappMessageCommand) -> Result<()> {
        let threads = self.program.find_threads(&self.dapp).await?;
        let mut recipients = match &command.recipients {
            Recipients::One(recipient) => vec![*recipient],
            Recipients::Many(recipients) => recipients.clone(),
            Recipients::All => threads.iter().filter_map(|t| self.counterpart(t)).collect(),
        };
        let mut seen = HashSet::new();
        recipients.retain(|r| seen.insert(*r));
        if let Some(notification_type_id) = &command.notification_type_id {
            let subscribed = self.subscriptions.subscribed_wallets(notification_type_id).await?;
            recipients.retain(|r| subscribed.contains(r));
        }
        if recipients.is_empty() {
            debug!("no ledger recipients for dapp message");
            return Ok(());
        }

        let text = if command.title.is_empty() {
            command.message.clone()
        } else {
            format!("{}\n{}", command.title, command.message)
        };

        let mut failures = 0;
        for &recipient in &recipients {
            if let Err(e) = self.deliver(&threads, recipient, text.as_bytes()).await {
                warn!(%recipient, error = %e, "ledger dapp message not delivered");
                failures += 1;
            }
        }
        if failures == recipients.len() {
            return Err(SdkError::Ledger(format!(
                "dapp message not delivered to any of {} recipients",
                recipients.len()
            )));
        }
        Ok(())
    }
}

/// Sends through every backend, collecting successes.
///
/// Fails with `AllBackendsFailed` only when no backend delivered.
pub struct DappMessagesFacade {
    bindings: Bindings<dyn DappMessages>,
}

impl DappMessagesFacade {
    pub fn new(bindings: Bindings<dyn DappMessages>) -> Self {
        Self { bindings }
    }

    pub async fn send(&self, command: &SendDappMessageCommand) -> Result<DeliveryReport> {
        let outcomes = join_all(
            self.bindings
                .iter()
                .map(|b| async move { (b.backend, b.capability.send(command).await) }),
        )
        .await;

        let mut report = DeliveryReport::default();
        for (backend, outcome) in outcomes {
            match outcome {
                Ok(()) => report.delivered.push(backend),
                Err(e) => {
                    warn!(%backend, error = %e, "dapp message delivery failed");
                    report.failed.push((backend, e.to_string()));
                }
            }
        }

        if report.delivered.is_empty() {
            return Err(SdkError::AllBackendsFailed {
                operation: "send dapp message".to_string(),
                failures: report.failed,
            });
        }
        Ok(report)
    }
}
