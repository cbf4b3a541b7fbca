//! Wallet-side management of addresses, dapp bindings, inbox and
//! subscriptions. Data service only.

use crate::error::Result;
use crate::wallet::PublicKey;
use dialect_cloud_client::{
    AddressDto, CloudApi, CreateAddressCommand, CreateWalletDappAddressCommand,
    FindWalletMessagesQuery, NotificationConfigDto, PatchAddressCommand,
    PatchWalletDappAddressCommand, UpsertNotificationSubscriptionCommand, VerifyAddressCommand,
    WalletAddressesClient, WalletDappAddressDto, WalletDappAddressesClient, WalletDappMessageDto,
    WalletMessagesClient, WalletNotificationSubscriptionDto, WalletNotificationSubscriptionsClient,
};

/// Delivery addresses (email, phone, telegram, wallet) owned by the wallet
#[derive(Clone)]
pub struct WalletAddresses {
    api: WalletAddressesClient,
}

impl WalletAddresses {
    pub async fn find_all(&self) -> Result<Vec<AddressDto>> {
        Ok(self.api.find_all().await?)
    }

    pub async fn find(&self, id: &str) -> Result<Option<AddressDto>> {
        Ok(self.api.find(id).await?)
    }

    pub async fn create(&self, command: &CreateAddressCommand) -> Result<AddressDto> {
        Ok(self.api.create(command).await?)
    }

    /// Confirm an address with the code sent to it
    pub async fn verify(&self, id: &str, code: &str) -> Result<AddressDto> {
        let command = VerifyAddressCommand {
            code: code.to_string(),
        };
        Ok(self.api.verify(id, &command).await?)
    }

    pub async fn update(&self, id: &str, command: &PatchAddressCommand) -> Result<AddressDto> {
        Ok(self.api.patch(id, command).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        Ok(self.api.delete(id).await?)
    }
}

/// Bindings of the wallet's addresses to dapps
#[derive(Clone)]
pub struct WalletDappAddresses {
    api: WalletDappAddressesClient,
}

impl WalletDappAddresses {
    pub async fn find_all(&self, dapp: Option<&PublicKey>) -> Result<Vec<WalletDappAddressDto>> {
        let dapp = dapp.map(|d| d.to_string());
        Ok(self.api.find_all(dapp.as_deref()).await?)
    }

    pub async fn create(&self, address_id: &str, dapp: &PublicKey, enabled: bool) -> Result<WalletDappAddressDto> {
        let command = CreateWalletDappAddressCommand {
            address_id: address_id.to_string(),
            dapp_public_key: dapp.to_string(),
            enabled,
        };
        Ok(self.api.create(&command).await?)
    }

    pub async fn update(&self, id: &str, enabled: bool) -> Result<WalletDappAddressDto> {
        let command = PatchWalletDappAddressCommand {
            enabled: Some(enabled),
        };
        Ok(self.api.patch(id, &command).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        Ok(self.api.delete(id).await?)
    }
}

/// Messages dapps sent to the wallet
#[derive(Clone)]
pub struct WalletMessages {
    api: WalletMessagesClient,
}

impl WalletMessages {
    pub async fn find_all(&self, query: &FindWalletMessagesQuery) -> Result<Vec<WalletDappMessageDto>> {
        Ok(self.api.find_all_dapp_messages(query).await?)
    }
}

#[derive(Clone)]
pub struct WalletNotificationSubscriptions {
    api: WalletNotificationSubscriptionsClient,
}

impl WalletNotificationSubscriptions {
    pub async fn find_all(&self, dapp: &PublicKey) -> Result<Vec<WalletNotificationSubscriptionDto>> {
        Ok(self.api.find_all(&dapp.to_string()).await?)
    }

    /// Enable or disable one notification type
    pub async fn upsert(&self, notification_type_id: &str, enabled: bool) -> Result<WalletNotificationSubscriptionDto> {
        let command = UpsertNotificationSubscriptionCommand {
            notification_type_id: notification_type_id.to_string(),
            config: NotificationConfigDto { enabled },
        };
        Ok(self.api.upsert(&command).await?)
    }
}

/// Wallet-side data service surface
#[derive(Clone)]
pub struct Wallets {
    pub addresses: WalletAddresses,
    pub dapp_addresses: WalletDappAddresses,
    pub messages: WalletMessages,
    pub notification_subscriptions: WalletNotificationSubscriptions,
}

impl Wallets {
    pub fn new(api: &CloudApi) -> Self {
        Self {
            addresses: WalletAddresses {
                api: api.wallet_addresses.clone(),
            },
            dapp_addresses: WalletDappAddresses {
                api: api.wallet_dapp_addresses.clone(),
            },
            messages: WalletMessages {
                api: api.wallet_messages.clone(),
            },
            notification_subscriptions: WalletNotificationSubscriptions {
                api: api.wallet_notification_subscriptions.clone(),
            },
        }
    }
}
