//! Dapp records, subscriber addresses, dapp messages and notifications
//!
//! The wallet the SDK runs with acts as the dapp. Dapp records and
//! notification metadata live in the data service only; subscriber
//! addresses and message delivery are available on every backend and go
//! through facades.

mod addresses;
mod messages;
mod notifications;

pub use addresses::{
    Address, CloudDappAddresses, DappAddress, DappAddresses, DappAddressesFacade,
    LedgerDappAddresses,
};
pub use messages::{
    CloudDappMessages, DappMessages, DappMessagesFacade, DeliveryReport, LedgerDappMessages,
    Recipients, SendDappMessageCommand,
};
pub use notifications::{DappNotificationSubscriptions, DappNotificationTypes};

use crate::backend::{BackendBinding, BackendContext, BackendKind, Bindings};
use crate::error::Result;
use crate::wallet::PublicKey;
use dialect_cloud_client::{CreateDappCommand, DappDto, DappsClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A dapp as registered with the data service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dapp {
    pub id: String,
    pub public_key: PublicKey,
    pub name: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
}

impl TryFrom<DappDto> for Dapp {
    type Error = crate::error::SdkError;

    fn try_from(dto: DappDto) -> Result<Self> {
        Ok(Self {
            id: dto.id,
            public_key: dto.public_key.parse()?,
            name: dto.name,
            description: dto.description,
            avatar_url: dto.avatar_url,
            verified: dto.verified,
        })
    }
}

/// Dapp-side operations for the SDK wallet
pub struct Dapps {
    dapp: PublicKey,
    api: DappsClient,
    addresses: DappAddressesFacade,
    messages: DappMessagesFacade,
    notification_types: DappNotificationTypes,
    notification_subscriptions: DappNotificationSubscriptions,
}

impl Dapps {
    /// Register the wallet as a dapp
    pub async fn create(&self, command: &CreateDappCommand) -> Result<Dapp> {
        self.api.create(command).await?.try_into()
    }

    /// The wallet's dapp record, if registered
    pub async fn find(&self) -> Result<Option<Dapp>> {
        self.api
            .find(&self.dapp.to_string())
            .await?
            .map(Dapp::try_from)
            .transpose()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.dapp
    }

    pub fn addresses(&self) -> &DappAddressesFacade {
        &self.addresses
    }

    pub fn messages(&self) -> &DappMessagesFacade {
        &self.messages
    }

    pub fn notification_types(&self) -> &DappNotificationTypes {
        &self.notification_types
    }

    pub fn notification_subscriptions(&self) -> &DappNotificationSubscriptions {
        &self.notification_subscriptions
    }
}

/// Build the dapp surface with address and message facades over `backends`
pub fn create_dapps(backends: &[BackendKind], context: &BackendContext) -> Result<Dapps> {
    let notification_subscriptions = DappNotificationSubscriptions::new(
        context.wallet,
        context.cloud.dapp_notification_subscriptions.clone(),
    );

    let mut address_bindings = Vec::with_capacity(backends.len());
    let mut message_bindings = Vec::with_capacity(backends.len());
    for &backend in backends {
        let (addresses, messages): (Arc<dyn DappAddresses>, Arc<dyn DappMessages>) = match backend {
            BackendKind::Ledger => (
                Arc::new(LedgerDappAddresses::new(
                    context.wallet,
                    context.ledger_program.clone(),
                )),
                Arc::new(LedgerDappMessages::new(
                    context.wallet,
                    context.ledger_program.clone(),
                    notification_subscriptions.clone(),
                )),
            ),
            BackendKind::Cloud => (
                Arc::new(CloudDappAddresses::new(context.wallet, context.cloud.dapps.clone())),
                Arc::new(CloudDappMessages::new(context.wallet, context.cloud.dapps.clone())),
            ),
        };
        address_bindings.push(BackendBinding::new(backend, addresses));
        message_bindings.push(BackendBinding::new(backend, messages));
    }

    Ok(Dapps {
        dapp: context.wallet,
        api: context.cloud.dapps.clone(),
        addresses: DappAddressesFacade::new(Bindings::new(address_bindings)?),
        messages: DappMessagesFacade::new(Bindings::new(message_bindings)?),
        notification_types: DappNotificationTypes::new(
            context.wallet,
            context.cloud.dapp_notification_types.clone(),
        ),
        notification_subscriptions,
    })
}
