//! End-to-end assembly of the SDK handle

mod common;

use common::{key, Ed25519Wallet, FakeLedgerProgram, FakeLedgerProgramFactory, RecordingReporter};
use dialect_sdk::auth::TokenProvider;
use dialect_sdk::ledger::LedgerProgram;
use dialect_sdk::*;
use ed25519_dalek::{Signature, Verifier};
use std::sync::Arc;

fn factory(input: ConfigInput) -> (SdkFactory, Arc<FakeLedgerProgram>, Arc<RecordingReporter>) {
    let program = Arc::new(FakeLedgerProgram::new());
    let reporter = Arc::new(RecordingReporter::default());
    let factory = SdkFactory::new(input)
        .with_ledger_program_factory(Arc::new(FakeLedgerProgramFactory(program.clone())))
        .with_reporter(reporter.clone());
    (factory, program, reporter)
}

#[test]
fn test_unknown_strategy_yields_no_handle() {
    let input = ConfigInput::new(Arc::new(Ed25519Wallet::generate())).with_identity(IdentityConfigInput {
        strategy: Some("first-found-slow".to_string()),
        resolvers: None,
    });
    let (factory, _, reporter) = factory(input.with_environment(Environment::Development));

    let err = factory.create().err().unwrap();
    assert!(matches!(err, SdkError::IllegalArgument(msg) if msg.contains("first-found-slow")));
    assert!(reporter.reports.lock().unwrap().is_empty());
}

#[test]
fn test_empty_backends_yield_no_handle() {
    let input = ConfigInput::new(Arc::new(Ed25519Wallet::generate())).with_backends(Vec::new());
    let (factory, _, _) = factory(input);

    assert!(matches!(factory.create(), Err(SdkError::IllegalArgument(_))));
}

#[test]
fn test_reporter_skipped_in_production() {
    let (factory, _, reporter) = factory(ConfigInput::new(Arc::new(Ed25519Wallet::generate())));
    factory.create().unwrap();
    assert!(reporter.reports.lock().unwrap().is_empty());
}

#[test]
fn test_reporter_receives_summary_outside_production() {
    let wallet = Arc::new(Ed25519Wallet::generate());
    let public_key = wallet.public_key();
    let input = ConfigInput::new(wallet).with_environment(Environment::Development);
    let (factory, _, reporter) = factory(input);

    let sdk = factory.create().unwrap();

    let reports = reporter.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0], sdk.info().config.summary());
    assert_eq!(reports[0].wallet, public_key.to_string());
    assert_eq!(sdk.info().config.dialect_cloud.url, "https://dev.dialectapi.to");
}

#[test]
fn test_handle_exposes_resolved_collaborators() {
    let input = ConfigInput::new(Arc::new(Ed25519Wallet::generate()))
        .with_backends(vec![BackendKind::Ledger, BackendKind::Cloud])
        .with_identity(IdentityConfigInput {
            strategy: Some("first-found-fast".to_string()),
            resolvers: None,
        });
    let (factory, program, _) = factory(input);

    let sdk = factory.create().unwrap();

    assert_eq!(sdk.threads().backends(), vec![BackendKind::Ledger, BackendKind::Cloud]);
    assert_eq!(sdk.identity().strategy(), IdentityStrategy::FirstFoundFast);
    assert_eq!(sdk.info().ledger_program.program_address(), program.program_address());
}

#[tokio::test]
async fn test_token_is_signed_by_wallet() {
    let wallet = Arc::new(Ed25519Wallet::generate());
    let verifying_key = wallet.verifying_key();
    let (factory, _, _) = factory(ConfigInput::new(wallet.clone()));
    let sdk = factory.create().unwrap();

    let token = sdk.info().token_provider.get().await.unwrap();

    assert_eq!(token.header.alg, "ed25519");
    assert_eq!(token.body.sub, wallet.public_key().to_string());
    let signature = Signature::from_slice(&token.signature).unwrap();
    assert!(verifying_key.verify(token.signing_input().as_bytes(), &signature).is_ok());

    // cached until near expiry
    let again = sdk.info().token_provider.get().await.unwrap();
    assert_eq!(again.raw, token.raw);
}

#[tokio::test]
async fn test_cloud_threads_use_bearer_token() {
    let wallet = Arc::new(Ed25519Wallet::generate());
    let me = wallet.public_key().to_string();
    let other = key(2).to_string();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2/dialects")
        .match_header("authorization", mockito::Matcher::Regex(r"^Bearer [\w-]+\.[\w-]+\.[\w-]+$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"[{{
                "id": "thread-1",
                "dialect": {{
                    "members": [
                        {{"publicKey": "{}", "scopes": ["ADMIN", "WRITE"]}},
                        {{"publicKey": "{}", "scopes": ["WRITE"]}}
                    ],
                    "lastMessageTimestamp": 1700000000000,
                    "encrypted": false
                }}
            }}]"#,
            me, other
        ))
        .create_async()
        .await;

    let input = ConfigInput::new(wallet)
        .with_backends(vec![BackendKind::Cloud])
        .with_dialect_cloud(DialectCloudConfigInput {
            url: Some(server.url()),
            ..Default::default()
        });
    let (factory, _, _) = factory(input);
    let sdk = factory.create().unwrap();

    let threads = sdk.threads().find_all().await.unwrap();

    mock.assert_async().await;
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, ThreadId::new(BackendKind::Cloud, "thread-1"));
    assert_eq!(threads[0].other_members[0].public_key, key(2));
    assert_eq!(threads[0].other_members[0].scopes, vec![ThreadMemberScope::Write]);
}

#[tokio::test]
async fn test_ledger_conversation_through_handle() {
    let input = ConfigInput::new(Arc::new(Ed25519Wallet::generate()))
        .with_backends(vec![BackendKind::Ledger])
        .with_environment(Environment::LocalDevelopment);
    let (factory, program, _) = factory(input);
    let sdk = factory.create().unwrap();

    let thread = sdk
        .threads()
        .create(&CreateThreadCommand {
            other_members: vec![ThreadMember::owner(key(3))],
            encrypted: false,
            backend: None,
        })
        .await
        .unwrap();
    sdk.threads()
        .send(&thread.id, &SendMessageCommand { text: "hello".to_string() })
        .await
        .unwrap();

    let messages = sdk.threads().messages(&thread.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "hello");
    assert_eq!(program.thread_count(), 1);

    let found = sdk
        .threads()
        .find(&FindThreadQuery::ByOtherMembers(vec![key(3)]))
        .await
        .unwrap();
    assert_eq!(found.map(|t| t.id), Some(thread.id));
}
