use super::{
    can_be_decrypted, decode_text, encode_text, timestamp_millis, CreateThreadCommand,
    FindThreadQuery, Messaging, SendMessageCommand, Thread, ThreadId, ThreadMember,
    ThreadMemberScope, ThreadMessage, ThreadsSummary,
};
use crate::backend::BackendKind;
use crate::encryption::EncryptionKeysProvider;
use crate::error::{Result, SdkError};
use crate::ledger::{LedgerMember, LedgerProgram, LedgerThreadAccount};
use crate::wallet::PublicKey;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Threads held as Dialect program accounts. Ledger threads are strictly
/// two-party.
pub struct LedgerMessaging {
    wallet: PublicKey,
    program: Arc<dyn LedgerProgram>,
    encryption: Arc<EncryptionKeysProvider>,
}

impl LedgerMessaging {
    pub fn new(
        wallet: PublicKey,
        program: Arc<dyn LedgerProgram>,
        encryption: Arc<EncryptionKeysProvider>,
    ) -> Self {
        Self {
            wallet,
            program,
            encryption,
        }
    }

    fn to_thread(&self, account: &LedgerThreadAccount) -> Result<Thread> {
        let mut me = None;
        let mut other_members = Vec::new();
        for member in &account.members {
            let member = from_ledger_member(member);
            if member.public_key == self.wallet && me.is_none() {
                me = Some(member);
            } else {
                other_members.push(member);
            }
        }
        let me = me.ok_or_else(|| {
            SdkError::NotFound(format!("wallet is not a member of thread {}", account.address))
        })?;

        Ok(Thread {
            id: ThreadId::new(BackendKind::Ledger, account.address.to_string()),
            me,
            other_members,
            encrypted: account.encrypted,
            can_be_decrypted: can_be_decrypted(account.encrypted, &self.encryption),
            updated_at: account.updated_at(),
        })
    }

    async fn account(&self, id: &ThreadId) -> Result<LedgerThreadAccount> {
        self.program
            .find_thread(&thread_address(id)?)
            .await?
            .ok_or_else(|| SdkError::NotFound(format!("thread {}", id)))
    }

    fn single_other(others: &[PublicKey]) -> Result<PublicKey> {
        match others {
            [other] => Ok(*other),
            _ => Err(SdkError::IllegalArgument(format!(
                "ledger threads have exactly one other member, got {}",
                others.len()
            ))),
        }
    }
}

fn thread_address(id: &ThreadId) -> Result<PublicKey> {
    id.address.parse()
}

fn from_ledger_member(member: &LedgerMember) -> ThreadMember {
    let mut scopes = Vec::with_capacity(2);
    if member.admin {
        scopes.push(ThreadMemberScope::Admin);
    }
    if member.write {
        scopes.push(ThreadMemberScope::Write);
    }
    ThreadMember {
        public_key: member.public_key,
        scopes,
    }
}

fn to_ledger_member(member: &ThreadMember) -> LedgerMember {
    LedgerMember {
        public_key: member.public_key,
        admin: member.has_scope(ThreadMemberScope::Admin),
        write: member.has_scope(ThreadMemberScope::Write),
    }
}

fn member_keys(account: &LedgerThreadAccount) -> Vec<PublicKey> {
    account.members.iter().map(|m| m.public_key).collect()
}

#[async_trait]
impl Messaging for LedgerMessaging {
    async fn find_all(&self) -> Result<Vec<Thread>> {
        self.program
            .find_threads(&self.wallet)
            .await?
            .iter()
            .map(|account| self.to_thread(account))
            .collect()
    }

    async fn find(&self, query: &FindThreadQuery) -> Result<Option<Thread>> {
        match query {
            FindThreadQuery::ById(id) => match self.program.find_thread(&thread_address(id)?).await? {
                Some(account) => Ok(Some(self.to_thread(&account)?)),
                None => Ok(None),
            },
            FindThreadQuery::ByOtherMembers(others) => {
                let other = Self::single_other(others)?;
                let accounts = self.program.find_threads(&self.wallet).await?;
                accounts
                    .iter()
                    .find(|a| {
                        a.members.len() == 2
                            && a.members.iter().any(|m| m.public_key == other)
                            && a.members.iter().any(|m| m.public_key == self.wallet)
                    })
                    .map(|a| self.to_thread(a))
                    .transpose()
            }
        }
    }

    async fn find_summary(&self, _other_members: &[PublicKey]) -> Result<Option<ThreadsSummary>> {
        debug!("ledger threads keep no unread summary");
        Ok(None)
    }

    async fn create(&self, command: &CreateThreadCommand) -> Result<Thread> {
        let others: Vec<PublicKey> = command.other_members.iter().map(|m| m.public_key).collect();
        Self::single_other(&others)?;
        if command.encrypted && !self.encryption.is_available() {
            return Err(SdkError::Encryption(
                "encrypted threads need an encrypting wallet and a message cipher".to_string(),
            ));
        }

        let members: Vec<LedgerMember> = std::iter::once(&ThreadMember::owner(self.wallet))
            .chain(&command.other_members)
            .map(to_ledger_member)
            .collect();
        let account = self.program.create_thread(&members, command.encrypted).await?;
        self.to_thread(&account)
    }

    async fn messages(&self, id: &ThreadId) -> Result<Vec<ThreadMessage>> {
        let account = self.account(id).await?;
        let members = member_keys(&account);
        let mut messages = Vec::with_capacity(account.messages.len());
        for message in &account.messages {
            messages.push(ThreadMessage {
                author: message.owner,
                text: decode_text(&message.text, account.encrypted, &members, &self.encryption).await?,
                timestamp: timestamp_millis(message.timestamp),
            });
        }
        Ok(messages)
    }

    async fn send(&self, id: &ThreadId, command: &SendMessageCommand) -> Result<()> {
        let account = self.account(id).await?;
        let members = member_keys(&account);
        let text = encode_text(&command.text, account.encrypted, &members, &self.encryption).await?;
        self.program.send_message(&account.address, &text).await
    }

    async fn delete(&self, id: &ThreadId) -> Result<()> {
        self.program.delete_thread(&thread_address(id)?).await
    }
}
