//! HTTP client for the Dialect cloud data service API

use crate::auth::TokenSource;
use crate::error::{CloudError, Result};
use crate::types::*;
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Root of the typed cloud API.
///
/// Every sub-client shares one connection pool and one token source.
/// Building the API performs no network I/O.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use dialect_cloud_client::{CloudApi, CloudClientConfig, StaticToken};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = CloudApi::new(CloudClientConfig::default(), Arc::new(StaticToken::new("t")))?;
/// let addresses = api.wallet_addresses.find_all().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CloudApi {
    pub threads: ThreadsClient,
    pub dapps: DappsClient,
    pub dapp_notification_types: DappNotificationTypesClient,
    pub dapp_notification_subscriptions: DappNotificationSubscriptionsClient,
    pub wallet_addresses: WalletAddressesClient,
    pub wallet_dapp_addresses: WalletDappAddressesClient,
    pub wallet_messages: WalletMessagesClient,
    pub wallet_notification_subscriptions: WalletNotificationSubscriptionsClient,
    base_url: String,
}

impl CloudApi {
    /// Create the API with all sub-clients
    pub fn new(config: CloudClientConfig, token_source: Arc<dyn TokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let core = Arc::new(HttpCore {
            base_url: base_url.clone(),
            client,
            token_source,
        });

        Ok(Self {
            threads: ThreadsClient { core: core.clone() },
            dapps: DappsClient { core: core.clone() },
            dapp_notification_types: DappNotificationTypesClient { core: core.clone() },
            dapp_notification_subscriptions: DappNotificationSubscriptionsClient {
                core: core.clone(),
            },
            wallet_addresses: WalletAddressesClient { core: core.clone() },
            wallet_dapp_addresses: WalletDappAddressesClient { core: core.clone() },
            wallet_messages: WalletMessagesClient { core: core.clone() },
            wallet_notification_subscriptions: WalletNotificationSubscriptionsClient { core },
            base_url,
        })
    }

    /// Base URL all requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// ==================== Threads API ====================

/// Threads ("dialects") the authenticated wallet is a member of
#[derive(Clone)]
pub struct ThreadsClient {
    core: Arc<HttpCore>,
}

impl ThreadsClient {
    pub async fn create(&self, command: &CreateDialectCommand) -> Result<DialectAccountDto> {
        self.core.send_json(Method::POST, "/api/v2/dialects", command).await
    }

    pub async fn find_all(&self) -> Result<Vec<DialectAccountDto>> {
        self.core.get("/api/v2/dialects").await
    }

    /// Find threads whose members include all given public keys
    pub async fn find_by_members(&self, query: &FindDialectQuery) -> Result<Vec<DialectAccountDto>> {
        let path = format!(
            "/api/v2/dialects{}",
            query_string(member_params(&query.member_public_keys))
        );
        self.core.get(&path).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<DialectAccountDto>> {
        let path = format!("/api/v2/dialects/{}", urlencoding::encode(id));
        self.core.get_optional(&path).await
    }

    pub async fn send_message(&self, id: &str, command: &SendMessageCommand) -> Result<DialectAccountDto> {
        let path = format!("/api/v2/dialects/{}/messages", urlencoding::encode(id));
        self.core.send_json(Method::POST, &path, command).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/api/v2/dialects/{}", urlencoding::encode(id));
        self.core.delete(&path).await
    }

    /// Unread message summary for threads with the given members
    pub async fn find_summary(&self, query: &FindDialectQuery) -> Result<Option<DialectsSummaryDto>> {
        let path = format!(
            "/api/v2/dialects/summary{}",
            query_string(member_params(&query.member_public_keys))
        );
        self.core.get_optional(&path).await
    }
}

// ==================== Dapps API ====================

#[derive(Clone)]
pub struct DappsClient {
    core: Arc<HttpCore>,
}

impl DappsClient {
    pub async fn create(&self, command: &CreateDappCommand) -> Result<DappDto> {
        self.core.send_json(Method::POST, "/api/v1/dapps", command).await
    }

    pub async fn find(&self, dapp_public_key: &str) -> Result<Option<DappDto>> {
        let path = format!("/api/v1/dapps/{}", urlencoding::encode(dapp_public_key));
        self.core.get_optional(&path).await
    }

    pub async fn find_all_dapp_addresses(&self, dapp_public_key: &str) -> Result<Vec<DappAddressDto>> {
        let path = format!(
            "/api/v1/dapps/{}/dappAddresses",
            urlencoding::encode(dapp_public_key)
        );
        self.core.get(&path).await
    }

    pub async fn unicast(&self, dapp_public_key: &str, command: &UnicastDappMessageCommand) -> Result<()> {
        let path = dapp_messages_path(dapp_public_key, "unicast");
        self.core.send_json_empty(Method::POST, &path, command).await
    }

    pub async fn multicast(&self, dapp_public_key: &str, command: &MulticastDappMessageCommand) -> Result<()> {
        let path = dapp_messages_path(dapp_public_key, "multicast");
        self.core.send_json_empty(Method::POST, &path, command).await
    }

    pub async fn broadcast(&self, dapp_public_key: &str, command: &BroadcastDappMessageCommand) -> Result<()> {
        let path = dapp_messages_path(dapp_public_key, "broadcast");
        self.core.send_json_empty(Method::POST, &path, command).await
    }
}

fn dapp_messages_path(dapp_public_key: &str, kind: &str) -> String {
    format!(
        "/api/v1/dapps/{}/messages/{}",
        urlencoding::encode(dapp_public_key),
        kind
    )
}

// ==================== Dapp notification types API ====================

#[derive(Clone)]
pub struct DappNotificationTypesClient {
    core: Arc<HttpCore>,
}

impl DappNotificationTypesClient {
    fn path(dapp_public_key: &str) -> String {
        format!(
            "/api/v1/dapps/{}/notificationTypes",
            urlencoding::encode(dapp_public_key)
        )
    }

    pub async fn find_all(&self, dapp_public_key: &str) -> Result<Vec<NotificationTypeDto>> {
        self.core.get(&Self::path(dapp_public_key)).await
    }

    pub async fn create(
        &self,
        dapp_public_key: &str,
        command: &CreateNotificationTypeCommand,
    ) -> Result<NotificationTypeDto> {
        self.core
            .send_json(Method::POST, &Self::path(dapp_public_key), command)
            .await
    }

    pub async fn patch(
        &self,
        dapp_public_key: &str,
        id: &str,
        command: &PatchNotificationTypeCommand,
    ) -> Result<NotificationTypeDto> {
        let path = format!("{}/{}", Self::path(dapp_public_key), urlencoding::encode(id));
        self.core.send_json(Method::PATCH, &path, command).await
    }

    pub async fn delete(&self, dapp_public_key: &str, id: &str) -> Result<()> {
        let path = format!("{}/{}", Self::path(dapp_public_key), urlencoding::encode(id));
        self.core.delete(&path).await
    }
}

// ==================== Dapp notification subscriptions API ====================

#[derive(Clone)]
pub struct DappNotificationSubscriptionsClient {
    core: Arc<HttpCore>,
}

impl DappNotificationSubscriptionsClient {
    pub async fn find_all(&self, dapp_public_key: &str) -> Result<Vec<DappNotificationSubscriptionDto>> {
        let path = format!(
            "/api/v1/dapps/{}/notificationSubscriptions",
            urlencoding::encode(dapp_public_key)
        );
        self.core.get(&path).await
    }
}

// ==================== Wallet API ====================

const WALLET_ME: &str = "/api/v1/wallets/me";

#[derive(Clone)]
pub struct WalletAddressesClient {
    core: Arc<HttpCore>,
}

impl WalletAddressesClient {
    pub async fn find_all(&self) -> Result<Vec<AddressDto>> {
        self.core.get(&format!("{}/addresses", WALLET_ME)).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<AddressDto>> {
        let path = format!("{}/addresses/{}", WALLET_ME, urlencoding::encode(id));
        self.core.get_optional(&path).await
    }

    pub async fn create(&self, command: &CreateAddressCommand) -> Result<AddressDto> {
        let path = format!("{}/addresses", WALLET_ME);
        self.core.send_json(Method::POST, &path, command).await
    }

    pub async fn patch(&self, id: &str, command: &PatchAddressCommand) -> Result<AddressDto> {
        let path = format!("{}/addresses/{}", WALLET_ME, urlencoding::encode(id));
        self.core.send_json(Method::PATCH, &path, command).await
    }

    pub async fn verify(&self, id: &str, command: &VerifyAddressCommand) -> Result<AddressDto> {
        let path = format!("{}/addresses/{}/verify", WALLET_ME, urlencoding::encode(id));
        self.core.send_json(Method::POST, &path, command).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("{}/addresses/{}", WALLET_ME, urlencoding::encode(id));
        self.core.delete(&path).await
    }
}

#[derive(Clone)]
pub struct WalletDappAddressesClient {
    core: Arc<HttpCore>,
}

impl WalletDappAddressesClient {
    /// List dapp bindings, optionally for a single dapp
    pub async fn find_all(&self, dapp_public_key: Option<&str>) -> Result<Vec<WalletDappAddressDto>> {
        let mut params = Vec::new();
        if let Some(dapp) = dapp_public_key {
            params.push(format!("dappPublicKey={}", urlencoding::encode(dapp)));
        }
        let path = format!("{}/dappAddresses{}", WALLET_ME, query_string(params));
        self.core.get(&path).await
    }

    pub async fn create(&self, command: &CreateWalletDappAddressCommand) -> Result<WalletDappAddressDto> {
        let path = format!("{}/dappAddresses", WALLET_ME);
        self.core.send_json(Method::POST, &path, command).await
    }

    pub async fn patch(&self, id: &str, command: &PatchWalletDappAddressCommand) -> Result<WalletDappAddressDto> {
        let path = format!("{}/dappAddresses/{}", WALLET_ME, urlencoding::encode(id));
        self.core.send_json(Method::PATCH, &path, command).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("{}/dappAddresses/{}", WALLET_ME, urlencoding::encode(id));
        self.core.delete(&path).await
    }
}

#[derive(Clone)]
pub struct WalletMessagesClient {
    core: Arc<HttpCore>,
}

impl WalletMessagesClient {
    /// Messages sent to this wallet by dapps
    pub async fn find_all_dapp_messages(&self, query: &FindWalletMessagesQuery) -> Result<Vec<WalletDappMessageDto>> {
        let mut params = Vec::new();
        if let Some(verified) = query.dapp_verified {
            params.push(format!("dappVerified={}", verified));
        }
        if let Some(skip) = query.skip {
            params.push(format!("skip={}", skip));
        }
        if let Some(take) = query.take {
            params.push(format!("take={}", take));
        }
        let path = format!("{}/dappMessages{}", WALLET_ME, query_string(params));
        self.core.get(&path).await
    }
}

#[derive(Clone)]
pub struct WalletNotificationSubscriptionsClient {
    core: Arc<HttpCore>,
}

impl WalletNotificationSubscriptionsClient {
    pub async fn find_all(&self, dapp_public_key: &str) -> Result<Vec<WalletNotificationSubscriptionDto>> {
        let path = format!(
            "{}/notificationSubscriptions?dappPublicKey={}",
            WALLET_ME,
            urlencoding::encode(dapp_public_key)
        );
        self.core.get(&path).await
    }

    pub async fn upsert(
        &self,
        command: &UpsertNotificationSubscriptionCommand,
    ) -> Result<WalletNotificationSubscriptionDto> {
        let path = format!("{}/notificationSubscriptions", WALLET_ME);
        self.core.send_json(Method::POST, &path, command).await
    }
}

// ==================== Helper Methods ====================

struct HttpCore {
    base_url: String,
    client: Client,
    token_source: Arc<dyn TokenSource>,
}

impl HttpCore {
    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token_source.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "cloud request");
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).await?.send().await?;
        handle_response(response).await
    }

    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.get(path).await {
            Ok(value) => Ok(Some(value)),
            Err(CloudError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .request(method, path)
            .await?
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    async fn send_json_empty<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<()> {
        let response = self
            .request(method, path)
            .await?
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        handle_empty(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).await?.send().await?;
        handle_empty(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

async fn handle_empty(response: reqwest::Response) -> Result<()> {
    check_status(response).await.map(|_| ())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(CloudError::NotFound(response.url().path().to_string()));
    }

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(CloudError::Server {
            status,
            message: body,
        });
    }

    Ok(response)
}

fn member_params(keys: &[String]) -> Vec<String> {
    keys.iter()
        .map(|k| format!("memberPublicKeys={}", urlencoding::encode(k)))
        .collect()
}

fn query_string(params: Vec<String>) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string() {
        assert_eq!(query_string(vec![]), "");
        assert_eq!(
            query_string(member_params(&["a b".to_string(), "c".to_string()])),
            "?memberPublicKeys=a%20b&memberPublicKeys=c"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = CloudApi::new(
            CloudClientConfig {
                base_url: "http://localhost:8080/".to_string(),
                ..Default::default()
            },
            Arc::new(crate::StaticToken::new("t")),
        )
        .unwrap();
        assert_eq!(api.base_url(), "http://localhost:8080");
    }
}
