//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dialect_sdk::config::{ConfigReporter, ConfigSummary};
use dialect_sdk::identity::{Identity, IdentityAdditionals, IdentityProvider};
use dialect_sdk::ledger::{
    LedgerMember, LedgerMessage, LedgerProgram, LedgerProgramFactory, LedgerThreadAccount,
};
use dialect_sdk::{PublicKey, Result, SdkError, WalletAdapter};
use ed25519_dalek::{Signer, SigningKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Wallet holding a real ed25519 key that can sign messages
pub struct Ed25519Wallet {
    key: SigningKey,
}

impl Ed25519Wallet {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    pub fn verifying_key(&self) -> ed25519_dalek::VerifyingKey {
        self.key.verifying_key()
    }
}

#[async_trait]
impl WalletAdapter for Ed25519Wallet {
    fn public_key(&self) -> PublicKey {
        PublicKey::new(self.key.verifying_key().to_bytes())
    }

    fn can_sign_message(&self) -> bool {
        true
    }

    fn can_sign_transaction(&self) -> bool {
        true
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }

    async fn sign_transaction(&self, transaction: &[u8]) -> Result<Vec<u8>> {
        Ok(transaction.to_vec())
    }
}

pub fn key(byte: u8) -> PublicKey {
    PublicKey::new([byte; 32])
}

#[derive(Clone)]
pub enum Outcome {
    Found(&'static str),
    Empty,
    Fail,
}

/// Identity provider with scripted latency and outcome
pub struct FakeIdentityProvider {
    name: &'static str,
    delay: Duration,
    outcome: Outcome,
    calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn new(name: &'static str, delay_ms: u64, outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay: Duration::from_millis(delay_ms),
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer(&self, public_key: PublicKey) -> Result<Option<Identity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.outcome {
            Outcome::Found(name) => Ok(Some(Identity {
                name: name.to_string(),
                public_key,
                provider: self.name.to_string(),
                additionals: IdentityAdditionals::default(),
            })),
            Outcome::Empty => Ok(None),
            Outcome::Fail => Err(SdkError::Identity(format!("{} unavailable", self.name))),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn type_name(&self) -> &str {
        self.name
    }

    async fn resolve(&self, public_key: &PublicKey) -> Result<Option<Identity>> {
        self.answer(*public_key).await
    }

    async fn resolve_reverse(&self, _name: &str) -> Result<Option<Identity>> {
        self.answer(key(99)).await
    }
}

/// In-memory Dialect program
pub struct FakeLedgerProgram {
    program_address: PublicKey,
    threads: Mutex<Vec<LedgerThreadAccount>>,
    next_address: AtomicUsize,
    pub fail_reads: bool,
}

impl FakeLedgerProgram {
    pub fn new() -> Self {
        Self {
            program_address: key(200),
            threads: Mutex::new(Vec::new()),
            next_address: AtomicUsize::new(100),
            fail_reads: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::new()
        }
    }

    pub fn insert(&self, members: &[PublicKey], messages: Vec<(PublicKey, &str)>) -> PublicKey {
        let address = key(self.next_address.fetch_add(1, Ordering::SeqCst) as u8);
        self.threads.lock().unwrap().push(LedgerThreadAccount {
            address,
            members: members
                .iter()
                .map(|&public_key| LedgerMember {
                    public_key,
                    admin: true,
                    write: true,
                })
                .collect(),
            messages: messages
                .into_iter()
                .map(|(owner, text)| LedgerMessage {
                    owner,
                    text: text.as_bytes().to_vec(),
                    timestamp: 1_700_000_000_000,
                })
                .collect(),
            encrypted: false,
            last_message_timestamp: 1_700_000_000_000,
        });
        address
    }

    pub fn thread(&self, address: &PublicKey) -> Option<LedgerThreadAccount> {
        self.threads
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.address == *address)
            .cloned()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.lock().unwrap().len()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads {
            return Err(SdkError::Ledger("rpc unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerProgram for FakeLedgerProgram {
    fn program_address(&self) -> &PublicKey {
        &self.program_address
    }

    fn rpc_url(&self) -> &str {
        "memory://ledger"
    }

    async fn find_threads(&self, member: &PublicKey) -> Result<Vec<LedgerThreadAccount>> {
        self.check_reads()?;
        Ok(self
            .threads
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.members.iter().any(|m| m.public_key == *member))
            .cloned()
            .collect())
    }

    async fn find_thread(&self, address: &PublicKey) -> Result<Option<LedgerThreadAccount>> {
        self.check_reads()?;
        Ok(self.thread(address))
    }

    async fn create_thread(&self, members: &[LedgerMember], encrypted: bool) -> Result<LedgerThreadAccount> {
        let address = key(self.next_address.fetch_add(1, Ordering::SeqCst) as u8);
        let account = LedgerThreadAccount {
            address,
            members: members.to_vec(),
            messages: Vec::new(),
            encrypted,
            last_message_timestamp: 0,
        };
        self.threads.lock().unwrap().push(account.clone());
        Ok(account)
    }

    async fn send_message(&self, address: &PublicKey, text: &[u8]) -> Result<()> {
        let mut threads = self.threads.lock().unwrap();
        let thread = threads
            .iter_mut()
            .find(|t| t.address == *address)
            .ok_or_else(|| SdkError::NotFound(address.to_string()))?;
        thread.messages.push(LedgerMessage {
            owner: thread.members[0].public_key,
            text: text.to_vec(),
            timestamp: 1_700_000_000_001,
        });
        Ok(())
    }

    async fn delete_thread(&self, address: &PublicKey) -> Result<()> {
        self.threads.lock().unwrap().retain(|t| t.address != *address);
        Ok(())
    }
}

/// Hands out one shared fake program
pub struct FakeLedgerProgramFactory(pub Arc<FakeLedgerProgram>);

impl LedgerProgramFactory for FakeLedgerProgramFactory {
    fn create(
        &self,
        _wallet: Arc<dyn WalletAdapter>,
        _program_address: PublicKey,
        _rpc_url: &str,
    ) -> Result<Arc<dyn LedgerProgram>> {
        Ok(self.0.clone())
    }
}

/// Captures reported summaries
#[derive(Default)]
pub struct RecordingReporter {
    pub reports: Mutex<Vec<ConfigSummary>>,
}

impl ConfigReporter for RecordingReporter {
    fn report(&self, summary: &ConfigSummary) {
        self.reports.lock().unwrap().push(summary.clone());
    }
}
