use crate::error::Result;
use crate::wallet::PublicKey;
use dialect_cloud_client::{
    CreateNotificationTypeCommand, DappNotificationSubscriptionDto,
    DappNotificationSubscriptionsClient, DappNotificationTypesClient, NotificationTypeDto,
    PatchNotificationTypeCommand,
};

/// Notification types a dapp offers its subscribers
#[derive(Clone)]
pub struct DappNotificationTypes {
    dapp: String,
    api: DappNotificationTypesClient,
}

impl DappNotificationTypes {
    pub fn new(dapp: PublicKey, api: DappNotificationTypesClient) -> Self {
        Self {
            dapp: dapp.to_string(),
            api,
        }
    }

    pub async fn find_all(&self) -> Result<Vec<NotificationTypeDto>> {
        Ok(self.api.find_all(&self.dapp).await?)
    }

    pub async fn create(&self, command: &CreateNotificationTypeCommand) -> Result<NotificationTypeDto> {
        Ok(self.api.create(&self.dapp, command).await?)
    }

    pub async fn update(&self, id: &str, command: &PatchNotificationTypeCommand) -> Result<NotificationTypeDto> {
        Ok(self.api.patch(&self.dapp, id, command).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        Ok(self.api.delete(&self.dapp, id).await?)
    }
}

/// Subscribers per notification type
#[derive(Clone)]
pub struct DappNotificationSubscriptions {
    dapp: String,
    api: DappNotificationSubscriptionsClient,
}

impl DappNotificationSubscriptions {
    pub fn new(dapp: PublicKey, api: DappNotificationSubscriptionsClient) -> Self {
        Self {
            dapp: dapp.to_string(),
            api,
        }
    }

    pub async fn find_all(&self) -> Result<Vec<DappNotificationSubscriptionDto>> {
        Ok(self.api.find_all(&self.dapp).await?)
    }

    /// Wallets with an enabled subscription to one notification type
    pub async fn subscribed_wallets(&self, notification_type_id: &str) -> Result<Vec<PublicKey>> {
        let mut wallets = Vec::new();
        for entry in self.find_all().await? {
            if entry.notification_type.id != notification_type_id {
                continue;
            }
            for subscription in entry.subscriptions {
                if subscription.config.enabled {
                    wallets.push(subscription.wallet.public_key.parse()?);
                }
            }
        }
        Ok(wallets)
    }
}
