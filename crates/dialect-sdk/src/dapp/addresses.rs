use crate::backend::{BackendKind, Bindings};
use crate::error::Result;
use crate::ledger::LedgerProgram;
use crate::wallet::PublicKey;
use async_trait::async_trait;
use dialect_cloud_client::{AddressDto, AddressType, DappAddressDto, DappsClient};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub address_type: AddressType,
    pub verified: bool,
    pub value: Option<String>,
    pub wallet: Option<PublicKey>,
}

/// A subscriber address reachable by the dapp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappAddress {
    pub id: String,
    pub backend: BackendKind,
    pub enabled: bool,
    pub channel_id: Option<String>,
    pub address: Address,
}

#[async_trait]
pub trait DappAddresses: Send + Sync {
    async fn find_all(&self) -> Result<Vec<DappAddress>>;
}

pub struct CloudDappAddresses {
    dapp: PublicKey,
    api: DappsClient,
}

impl CloudDappAddresses {
    pub fn new(dapp: PublicKey, api: DappsClient) -> Self {
        Self { dapp, api }
    }
}

fn from_address_dto(dto: AddressDto) -> Result<Address> {
    Ok(Address {
        id: dto.id,
        address_type: dto.address_type,
        verified: dto.verified,
        value: dto.value,
        wallet: dto.wallet.map(|w| w.public_key.parse()).transpose()?,
    })
}

fn from_dapp_address_dto(dto: DappAddressDto) -> Result<DappAddress> {
    Ok(DappAddress {
        id: dto.id,
        backend: BackendKind::Cloud,
        enabled: dto.enabled,
        channel_id: dto.channel_id,
        address: from_address_dto(dto.address)?,
    })
}

#[async_trait]
impl DappAddresses for CloudDappAddresses {
    async fn find_all(&self) -> Result<Vec<DappAddress>> {
        self.api
            .find_all_dapp_addresses(&self.dapp.to_string())
            .await?
            .into_iter()
            .map(from_dapp_address_dto)
            .collect()
    }
}

/// Every wallet holding a thread with the dapp is a verified wallet address
pub struct LedgerDappAddresses {
    dapp: PublicKey,
    program: Arc<dyn LedgerProgram>,
}

impl LedgerDappAddresses {
    pub fn new(dapp: PublicKey, program: Arc<dyn LedgerProgram>) -> Self {
        Self { dapp, program }
    }
}

#[async_trait]
impl DappAddresses for LedgerDappAddresses {
    async fn find_all(&self) -> Result<Vec<DappAddress>> {
        let threads = self.program.find_threads(&self.dapp).await?;
        Ok(threads
            .into_iter()
            .filter_map(|thread| {
                let subscriber = thread
                    .members
                    .iter()
                    .map(|m| m.public_key)
                    .find(|k| *k != self.dapp)?;
                let id = thread.address.to_string();
                Some(DappAddress {
                    id: id.clone(),
                    backend: BackendKind::Ledger,
                    enabled: true,
                    channel_id: None,
                    address: Address {
                        id,
                        address_type: AddressType::Wallet,
                        verified: true,
                        value: Some(subscriber.to_string()),
                        wallet: Some(subscriber),
                    },
                })
            })
            .collect())
    }
}

/// Merges subscriber addresses from every backend, failing if any fails.
/// The same wallet may appear once per backend.
pub struct DappAddressesFacade {
    bindings: Bindings<dyn DappAddresses>,
}

impl DappAddressesFacade {
    pub fn new(bindings: Bindings<dyn DappAddresses>) -> Self {
        Self { bindings }
    }
}

#[async_trait]
impl DappAddresses for DappAddressesFacade {
    async fn find_all(&self) -> Result<Vec<DappAddress>> {
        let per_backend =
            try_join_all(self.bindings.iter().map(|b| b.capability.find_all())).await?;
        Ok(per_backend.into_iter().flatten().collect())
    }
}
