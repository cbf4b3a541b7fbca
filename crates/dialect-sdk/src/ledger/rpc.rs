//! JSON-RPC program handle
//!
//! Reads go through `getProgramAccounts` / `getAccountInfo` with the
//! `jsonParsed` encoding. Writes are program instructions signed by the
//! wallet and submitted with `sendTransaction`. Nothing is sent until the
//! first call.

use super::{LedgerMember, LedgerMessage, LedgerProgram, LedgerProgramFactory, LedgerThreadAccount};
use crate::error::{Result, SdkError};
use crate::wallet::{PublicKey, WalletAdapter};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Byte offsets of the first two member keys in a thread account
/// (8-byte discriminator, then 34-byte member entries)
const MEMBER_OFFSETS: [usize; 2] = [8, 42];

const RPC_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct ProgramAccount {
    pubkey: PublicKey,
    account: AccountInfo,
}

#[derive(Deserialize)]
struct AccountInfo {
    data: ParsedData,
}

#[derive(Deserialize)]
struct ParsedData {
    parsed: ParsedThread,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedThread {
    members: Vec<LedgerMember>,
    #[serde(default)]
    messages: Vec<LedgerMessage>,
    encrypted: bool,
    last_message_timestamp: i64,
}

impl ParsedThread {
    fn into_account(self, address: PublicKey) -> LedgerThreadAccount {
        LedgerThreadAccount {
            address,
            members: self.members,
            messages: self.messages,
            encrypted: self.encrypted,
            last_message_timestamp: self.last_message_timestamp,
        }
    }
}

#[derive(Deserialize)]
struct ContextValue<T> {
    value: Option<T>,
}

/// Program instruction as submitted to the wallet for signing
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Instruction<'a> {
    program_id: String,
    instruction: &'a str,
    accounts: Vec<String>,
    data: Value,
}

pub struct RpcLedgerProgram {
    wallet: Arc<dyn WalletAdapter>,
    program_address: PublicKey,
    rpc_url: String,
    client: Client,
    next_id: AtomicU64,
}

impl RpcLedgerProgram {
    pub fn new(wallet: Arc<dyn WalletAdapter>, program_address: PublicKey, rpc_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(RPC_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            wallet,
            program_address,
            rpc_url: rpc_url.to_string(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, rpc_url = %self.rpc_url, "ledger rpc call");

        let response = self.client.post(&self.rpc_url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SdkError::Ledger(format!("RPC HTTP {}: {}", status, body)));
        }

        let envelope: RpcResponse<T> = response.json().await?;
        match (envelope.result, envelope.error) {
            (_, Some(err)) => Err(SdkError::Ledger(format!(
                "RPC error {}: {}",
                err.code, err.message
            ))),
            (Some(result), None) => Ok(result),
            (None, None) => Err(SdkError::Ledger(format!("{} returned no result", method))),
        }
    }

    async fn accounts_with_member_at(&self, member: &PublicKey, offset: usize) -> Result<Vec<ProgramAccount>> {
        let params = json!([
            self.program_address.to_string(),
            {
                "encoding": "jsonParsed",
                "filters": [{ "memcmp": { "offset": offset, "bytes": member.to_string() } }]
            }
        ]);
        self.call("getProgramAccounts", params).await
    }

    /// Sign and submit one instruction; returns the transaction signature
    async fn submit(&self, instruction: Instruction<'_>) -> Result<String> {
        let name = instruction.instruction;
        let unsigned = serde_json::to_vec(&instruction)?;
        let signed = self.wallet.sign_transaction(&unsigned).await?;
        let signature: String = self
            .call(
                "sendTransaction",
                json!([STANDARD.encode(signed), { "encoding": "base64" }]),
            )
            .await?;
        debug!(instruction = name, %signature, "ledger transaction sent");
        Ok(signature)
    }

    fn instruction<'a>(&self, name: &'a str, accounts: Vec<String>, data: Value) -> Instruction<'a> {
        Instruction {
            program_id: self.program_address.to_string(),
            instruction: name,
            accounts,
            data,
        }
    }
}

#[async_trait]
impl LedgerProgram for RpcLedgerProgram {
    fn program_address(&self) -> &PublicKey {
        &self.program_address
    }

    fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn find_threads(&self, member: &PublicKey) -> Result<Vec<LedgerThreadAccount>> {
        let mut seen = HashSet::new();
        let mut threads = Vec::new();
        for offset in MEMBER_OFFSETS {
            for account in self.accounts_with_member_at(member, offset).await? {
                if seen.insert(account.pubkey) {
                    threads.push(account.account.data.parsed.into_account(account.pubkey));
                }
            }
        }
        threads.sort_by(|a, b| b.last_message_timestamp.cmp(&a.last_message_timestamp));
        Ok(threads)
    }

    async fn find_thread(&self, address: &PublicKey) -> Result<Option<LedgerThreadAccount>> {
        let params = json!([address.to_string(), { "encoding": "jsonParsed" }]);
        let info: ContextValue<AccountInfo> = self.call("getAccountInfo", params).await?;
        Ok(info.value.map(|a| a.data.parsed.into_account(*address)))
    }

    async fn create_thread(&self, members: &[LedgerMember], encrypted: bool) -> Result<LedgerThreadAccount> {
        let me = self.wallet.public_key();
        let accounts = members.iter().map(|m| m.public_key.to_string()).collect();
        self.submit(self.instruction(
            "createDialect",
            accounts,
            json!({ "members": members, "encrypted": encrypted }),
        ))
        .await?;

        let wanted: HashSet<PublicKey> = members.iter().map(|m| m.public_key).collect();
        self.find_threads(&me)
            .await?
            .into_iter()
            .find(|t| t.members.iter().map(|m| m.public_key).collect::<HashSet<_>>() == wanted)
            .ok_or_else(|| SdkError::Ledger("created thread not visible after confirmation".to_string()))
    }

    async fn send_message(&self, address: &PublicKey, text: &[u8]) -> Result<()> {
        let accounts = vec![self.wallet.public_key().to_string(), address.to_string()];
        self.submit(self.instruction(
            "sendMessage",
            accounts,
            json!({ "text": STANDARD.encode(text) }),
        ))
        .await
        .map(|_| ())
    }

    async fn delete_thread(&self, address: &PublicKey) -> Result<()> {
        let accounts = vec![self.wallet.public_key().to_string(), address.to_string()];
        self.submit(self.instruction("closeDialect", accounts, Value::Null))
            .await
            .map(|_| ())
    }
}

/// Builds [`RpcLedgerProgram`] handles
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcLedgerProgramFactory;

impl LedgerProgramFactory for RpcLedgerProgramFactory {
    fn create(
        &self,
        wallet: Arc<dyn WalletAdapter>,
        program_address: PublicKey,
        rpc_url: &str,
    ) -> Result<Arc<dyn LedgerProgram>> {
        Ok(Arc::new(RpcLedgerProgram::new(wallet, program_address, rpc_url)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    struct SigningWallet;

    #[async_trait]
    impl WalletAdapter for SigningWallet {
        fn public_key(&self) -> PublicKey {
            PublicKey::new([1u8; 32])
        }

        fn can_sign_transaction(&self) -> bool {
            true
        }

        async fn sign_transaction(&self, transaction: &[u8]) -> Result<Vec<u8>> {
            Ok(transaction.to_vec())
        }
    }

    fn program(server: &mockito::ServerGuard) -> RpcLedgerProgram {
        RpcLedgerProgram::new(Arc::new(SigningWallet), PublicKey::new([7u8; 32]), &server.url()).unwrap()
    }

    fn thread_json(address: PublicKey, timestamp: i64) -> Value {
        json!({
            "pubkey": address.to_string(),
            "account": { "data": { "parsed": {
                "members": [
                    { "publicKey": PublicKey::new([1u8; 32]).to_string(), "admin": true, "write": true },
                    { "publicKey": PublicKey::new([2u8; 32]).to_string(), "admin": false, "write": true }
                ],
                "encrypted": false,
                "lastMessageTimestamp": timestamp
            }}}
        })
    }

    #[tokio::test]
    async fn test_find_threads_merges_both_member_slots() {
        let mut server = mockito::Server::new_async().await;
        let a = PublicKey::new([10u8; 32]);
        let b = PublicKey::new([11u8; 32]);
        let _first = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({ "method": "getProgramAccounts" })),
                Matcher::Regex(r#""offset":8[^0-9]"#.to_string()),
            ]))
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": [thread_json(a, 100)] }).to_string())
            .create_async()
            .await;
        let _second = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({ "method": "getProgramAccounts" })),
                Matcher::Regex(r#""offset":42[^0-9]"#.to_string()),
            ]))
            .with_body(
                json!({ "jsonrpc": "2.0", "id": 2, "result": [thread_json(a, 100), thread_json(b, 200)] })
                    .to_string(),
            )
            .create_async()
            .await;

        let threads = program(&server).find_threads(&PublicKey::new([1u8; 32])).await.unwrap();

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].address, b);
        assert_eq!(threads[1].address, a);
        assert!(threads[1].members[0].admin);
    }

    #[tokio::test]
    async fn test_missing_account_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "getAccountInfo" })))
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":null}}"#)
            .create_async()
            .await;

        let thread = program(&server).find_thread(&PublicKey::new([3u8; 32])).await.unwrap();
        assert!(thread.is_none());
    }

    #[tokio::test]
    async fn test_rpc_error_surfaces_as_ledger_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32002,"message":"blockhash not found"}}"#)
            .create_async()
            .await;

        let err = program(&server)
            .send_message(&PublicKey::new([3u8; 32]), b"hi")
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Ledger(msg) if msg.contains("blockhash not found")));
    }

    #[test]
    fn test_factory_performs_no_io() {
        let program = RpcLedgerProgramFactory
            .create(Arc::new(SigningWallet), PublicKey::new([7u8; 32]), "http://127.0.0.1:1")
            .unwrap();
        assert_eq!(program.rpc_url(), "http://127.0.0.1:1");
    }
}
