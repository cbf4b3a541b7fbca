use super::{
    can_be_decrypted, decode_text, encode_text, timestamp_millis, CreateThreadCommand,
    FindThreadQuery, Messaging, SendMessageCommand, Thread, ThreadId, ThreadMember,
    ThreadMemberScope, ThreadMessage, ThreadsSummary,
};
use crate::backend::BackendKind;
use crate::encryption::EncryptionKeysProvider;
use crate::error::{Result, SdkError};
use crate::wallet::PublicKey;
use async_trait::async_trait;
use dialect_cloud_client::{
    CreateDialectCommand, DialectAccountDto, FindDialectQuery, MemberDto, MemberScope,
    SendMessageCommand as SendMessageDto, ThreadsClient,
};
use std::sync::Arc;

/// Threads stored by the data service
pub struct CloudMessaging {
    wallet: PublicKey,
    api: ThreadsClient,
    encryption: Arc<EncryptionKeysProvider>,
}

impl CloudMessaging {
    pub fn new(wallet: PublicKey, api: ThreadsClient, encryption: Arc<EncryptionKeysProvider>) -> Self {
        Self {
            wallet,
            api,
            encryption,
        }
    }

    fn member_query(&self, other_members: &[PublicKey]) -> FindDialectQuery {
        FindDialectQuery {
            member_public_keys: std::iter::once(&self.wallet)
                .chain(other_members)
                .map(|k| k.to_string())
                .collect(),
        }
    }

    fn to_thread(&self, account: &DialectAccountDto) -> Result<Thread> {
        let mut me = None;
        let mut other_members = Vec::new();
        for member in &account.dialect.members {
            let member = from_member_dto(member)?;
            if member.public_key == self.wallet && me.is_none() {
                me = Some(member);
            } else {
                other_members.push(member);
            }
        }
        let me = me.ok_or_else(|| {
            SdkError::NotFound(format!("wallet is not a member of thread {}", account.id))
        })?;

        let encrypted = account.dialect.encrypted;
        Ok(Thread {
            id: ThreadId::new(BackendKind::Cloud, &account.id),
            me,
            other_members,
            encrypted,
            can_be_decrypted: can_be_decrypted(encrypted, &self.encryption),
            updated_at: timestamp_millis(account.dialect.last_message_timestamp),
        })
    }

    async fn account(&self, id: &ThreadId) -> Result<DialectAccountDto> {
        self.api
            .find(&id.address)
            .await?
            .ok_or_else(|| SdkError::NotFound(format!("thread {}", id)))
    }
}

fn from_member_dto(member: &MemberDto) -> Result<ThreadMember> {
    Ok(ThreadMember {
        public_key: member.public_key.parse()?,
        scopes: member
            .scopes
            .iter()
            .map(|scope| match scope {
                MemberScope::Admin => ThreadMemberScope::Admin,
                MemberScope::Write => ThreadMemberScope::Write,
            })
            .collect(),
    })
}

fn to_member_dto(member: &ThreadMember) -> MemberDto {
    MemberDto {
        public_key: member.public_key.to_string(),
        scopes: member
            .scopes
            .iter()
            .map(|scope| match scope {
                ThreadMemberScope::Admin => MemberScope::Admin,
                ThreadMemberScope::Write => MemberScope::Write,
            })
            .collect(),
    }
}

fn member_keys(account: &DialectAccountDto) -> Result<Vec<PublicKey>> {
    account
        .dialect
        .members
        .iter()
        .map(|m| m.public_key.parse())
        .collect()
}

#[async_trait]
impl Messaging for CloudMessaging {
    async fn find_all(&self) -> Result<Vec<Thread>> {
        self.api
            .find_all()
            .await?
            .iter()
            .map(|account| self.to_thread(account))
            .collect()
    }

    async fn find(&self, query: &FindThreadQuery) -> Result<Option<Thread>> {
        match query {
            FindThreadQuery::ById(id) => match self.api.find(&id.address).await? {
                Some(account) => Ok(Some(self.to_thread(&account)?)),
                None => Ok(None),
            },
            FindThreadQuery::ByOtherMembers(others) => {
                let accounts = self.api.find_by_members(&self.member_query(others)).await?;
                accounts.first().map(|a| self.to_thread(a)).transpose()
            }
        }
    }

    async fn find_summary(&self, other_members: &[PublicKey]) -> Result<Option<ThreadsSummary>> {
        Ok(self
            .api
            .find_summary(&self.member_query(other_members))
            .await?
            .map(|summary| ThreadsSummary {
                unread_messages_count: summary.unread_messages_count,
            }))
    }

    async fn create(&self, command: &CreateThreadCommand) -> Result<Thread> {
        if command.encrypted && !self.encryption.is_available() {
            return Err(SdkError::Encryption(
                "encrypted threads need an encrypting wallet and a message cipher".to_string(),
            ));
        }
        let members = std::iter::once(&ThreadMember::owner(self.wallet))
            .chain(&command.other_members)
            .map(to_member_dto)
            .collect();
        let account = self
            .api
            .create(&CreateDialectCommand {
                members,
                encrypted: command.encrypted,
            })
            .await?;
        self.to_thread(&account)
    }

    async fn messages(&self, id: &ThreadId) -> Result<Vec<ThreadMessage>> {
        let account = self.account(id).await?;
        let members = member_keys(&account)?;
        let mut messages = Vec::with_capacity(account.dialect.messages.len());
        for message in &account.dialect.messages {
            messages.push(ThreadMessage {
                author: message.owner.parse()?,
                text: decode_text(&message.text, account.dialect.encrypted, &members, &self.encryption)
                    .await?,
                timestamp: timestamp_millis(message.timestamp),
            });
        }
        Ok(messages)
    }

    async fn send(&self, id: &ThreadId, command: &SendMessageCommand) -> Result<()> {
        let account = self.account(id).await?;
        let members = member_keys(&account)?;
        let text = encode_text(&command.text, account.dialect.encrypted, &members, &self.encryption).await?;
        self.api
            .send_message(&id.address, &SendMessageDto { text })
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &ThreadId) -> Result<()> {
        Ok(self.api.delete(&id.address).await?)
    }
}
