//! Request/response tests against a mock data service

use dialect_cloud_client::*;
use std::sync::Arc;

fn api_for(server: &mockito::ServerGuard) -> CloudApi {
    CloudApi::new(
        CloudClientConfig {
            base_url: server.url(),
            ..Default::default()
        },
        Arc::new(StaticToken::new("test-token")),
    )
    .unwrap()
}

#[tokio::test]
async fn test_find_all_threads_sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2/dialects")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{
                "id": "thread-1",
                "dialect": {
                    "members": [{"publicKey": "me", "scopes": ["ADMIN", "WRITE"]}],
                    "messages": [{"owner": "me", "text": [104, 105], "timestamp": 1000}],
                    "nextMessageIdx": 1,
                    "lastMessageTimestamp": 1000,
                    "encrypted": false
                }
            }]"#,
        )
        .create_async()
        .await;

    let threads = api_for(&server).threads.find_all().await.unwrap();

    mock.assert_async().await;
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, "thread-1");
    assert_eq!(threads[0].dialect.messages[0].text, b"hi".to_vec());
}

#[tokio::test]
async fn test_find_thread_not_found_is_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v2/dialects/missing")
        .with_status(404)
        .create_async()
        .await;

    let thread = api_for(&server).threads.find("missing").await.unwrap();
    assert!(thread.is_none());
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/v1/dapps/dapp-pk/messages/broadcast")
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let err = api_for(&server)
        .dapps
        .broadcast(
            "dapp-pk",
            &BroadcastDappMessageCommand {
                title: "t".to_string(),
                message: "m".to_string(),
                notification_type_id: None,
            },
        )
        .await
        .unwrap_err();

    match err {
        CloudError::Server { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_notification_type_posts_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/dapps/dapp-pk/notificationTypes")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "name": "Liquidation warning",
            "humanReadableId": "liquidation-warning",
            "defaultConfig": {"enabled": true}
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "nt-1",
                "name": "Liquidation warning",
                "humanReadableId": "liquidation-warning",
                "orderingPriority": 0,
                "tags": [],
                "defaultConfig": {"enabled": true}
            }"#,
        )
        .create_async()
        .await;

    let created = api_for(&server)
        .dapp_notification_types
        .create(
            "dapp-pk",
            &CreateNotificationTypeCommand {
                name: "Liquidation warning".to_string(),
                human_readable_id: "liquidation-warning".to_string(),
                trigger: None,
                ordering_priority: 0,
                tags: vec![],
                default_config: NotificationConfigDto { enabled: true },
            },
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(created.id, "nt-1");
}

#[tokio::test]
async fn test_wallet_dapp_addresses_filter_by_dapp() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/wallets/me/dappAddresses")
        .match_query(mockito::Matcher::UrlEncoded(
            "dappPublicKey".into(),
            "dapp-pk".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let found = api_for(&server)
        .wallet_dapp_addresses
        .find_all(Some("dapp-pk"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(found.is_empty());
}
