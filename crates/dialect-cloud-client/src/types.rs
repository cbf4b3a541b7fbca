//! Request and response types for the cloud API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone)]
pub struct CloudClientConfig {
    /// Base URL of the data service
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for CloudClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dialectapi.to".to_string(),
            timeout_secs: 30,
        }
    }
}

// ==================== Threads ====================

/// Permission scope of a thread member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberScope {
    Admin,
    Write,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub public_key: String,
    pub scopes: Vec<MemberScope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub owner: String,
    /// Raw (possibly encrypted) message bytes
    pub text: Vec<u8>,
    /// Unix millis
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialectDto {
    pub members: Vec<MemberDto>,
    #[serde(default)]
    pub messages: Vec<MessageDto>,
    #[serde(default)]
    pub next_message_idx: u32,
    /// Unix millis
    pub last_message_timestamp: i64,
    pub encrypted: bool,
}

/// A thread as stored by the data service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialectAccountDto {
    pub id: String,
    pub dialect: DialectDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDialectCommand {
    pub members: Vec<MemberDto>,
    pub encrypted: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageCommand {
    pub text: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct FindDialectQuery {
    pub member_public_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialectsSummaryDto {
    pub unread_messages_count: u32,
}

// ==================== Dapps ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappDto {
    pub id: String,
    pub public_key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDappCommand {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Kind of delivery address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    #[serde(rename = "EMAIL")]
    Email,
    #[serde(rename = "PHONE_NUMBER")]
    PhoneNumber,
    #[serde(rename = "TELEGRAM")]
    Telegram,
    #[serde(rename = "WALLET")]
    Wallet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDto {
    pub id: String,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub id: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<WalletDto>,
}

/// A subscriber's address as seen by a dapp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappAddressDto {
    pub id: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    pub address: AddressDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnicastDappMessageCommand {
    pub title: String,
    pub message: String,
    pub recipient_public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_type_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticastDappMessageCommand {
    pub title: String,
    pub message: String,
    pub recipient_public_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_type_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastDappMessageCommand {
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_type_id: Option<String>,
}

// ==================== Notification types ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfigDto {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTypeDto {
    pub id: String,
    pub name: String,
    pub human_readable_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default)]
    pub ordering_priority: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub default_config: NotificationConfigDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationTypeCommand {
    pub name: String,
    pub human_readable_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    pub ordering_priority: i32,
    pub tags: Vec<String>,
    pub default_config: NotificationConfigDto,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchNotificationTypeCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_readable_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering_priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_config: Option<NotificationConfigDto>,
}

// ==================== Subscriptions ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSubscriptionDto {
    pub wallet: WalletDto,
    pub config: NotificationConfigDto,
}

/// All subscribers of one notification type of a dapp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappNotificationSubscriptionDto {
    pub notification_type: NotificationTypeDto,
    pub subscriptions: Vec<NotificationSubscriptionDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSubscriptionDto {
    pub wallet_id: String,
    pub config: NotificationConfigDto,
}

/// The wallet's own subscription to one notification type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletNotificationSubscriptionDto {
    pub notification_type: NotificationTypeDto,
    pub subscription: WalletSubscriptionDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertNotificationSubscriptionCommand {
    pub notification_type_id: String,
    pub config: NotificationConfigDto,
}

// ==================== Wallet ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressCommand {
    pub value: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchAddressCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyAddressCommand {
    pub code: String,
}

/// A wallet's binding of one of its addresses to a dapp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDappAddressDto {
    pub id: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    pub address: AddressDto,
    /// Dapp public key
    pub dapp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletDappAddressCommand {
    pub address_id: String,
    pub dapp_public_key: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchWalletDappAddressCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDappMessageDto {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub owner: String,
}

#[derive(Debug, Clone, Default)]
pub struct FindWalletMessagesQuery {
    pub dapp_verified: Option<bool>,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_scope_wire_names() {
        let member = MemberDto {
            public_key: "abc".to_string(),
            scopes: vec![MemberScope::Admin, MemberScope::Write],
        };
        let json = serde_json::to_string(&member).unwrap();
        assert_eq!(json, r#"{"publicKey":"abc","scopes":["ADMIN","WRITE"]}"#);
    }

    #[test]
    fn test_address_type_field_renamed() {
        let cmd = CreateAddressCommand {
            value: "+15550000".to_string(),
            address_type: AddressType::PhoneNumber,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "PHONE_NUMBER");
    }

    #[test]
    fn test_patch_commands_omit_unset_fields() {
        let patch = PatchNotificationTypeCommand {
            name: Some("Liquidations".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"name":"Liquidations"}"#);
    }

    #[test]
    fn test_dialect_defaults_missing_messages() {
        let json = r#"{
            "id": "t1",
            "dialect": {
                "members": [],
                "lastMessageTimestamp": 0,
                "encrypted": false
            }
        }"#;
        let account: DialectAccountDto = serde_json::from_str(json).unwrap();
        assert!(account.dialect.messages.is_empty());
        assert_eq!(account.dialect.next_message_idx, 0);
    }
}
