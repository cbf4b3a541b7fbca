//! SDK assembly
//!
//! [`SdkFactory::create`] resolves configuration and wires every
//! capability into one immutable [`Sdk`] handle. Assembly performs no
//! network I/O and either returns a complete handle or fails.

use crate::auth::{create_token_provider, token_signer_for, BearerTokens, TokenProvider};
use crate::backend::BackendContext;
use crate::config::{resolve, ConfigInput, ConfigReporter, Environment, ResolvedConfig, TracingConfigReporter};
use crate::dapp::{create_dapps, Dapps};
use crate::encryption::EncryptionKeysProvider;
use crate::error::Result;
use crate::identity::{create_identity_resolver, IdentityResolver};
use crate::ledger::{LedgerProgram, LedgerProgramFactory, RpcLedgerProgramFactory};
use crate::messaging::{create_messaging, MessagingFacade};
use crate::wallet::WalletAdapter;
use crate::wallets::Wallets;
use chrono::Duration;
use dialect_cloud_client::{CloudApi, CloudClientConfig};
use std::sync::Arc;
use tracing::debug;

/// Shared collaborators of an assembled SDK
#[derive(Clone)]
pub struct SdkInfo {
    pub wallet: Arc<dyn WalletAdapter>,
    pub config: ResolvedConfig,
    pub ledger_program: Arc<dyn LedgerProgram>,
    pub token_provider: Arc<dyn TokenProvider>,
}

/// Assembled SDK handle
pub struct Sdk {
    info: SdkInfo,
    threads: MessagingFacade,
    dapps: Dapps,
    wallet: Wallets,
    identity: Arc<dyn IdentityResolver>,
}

impl Sdk {
    /// Assemble with the default ledger program factory and reporter
    pub fn create(input: ConfigInput) -> Result<Self> {
        SdkFactory::new(input).create()
    }

    pub fn info(&self) -> &SdkInfo {
        &self.info
    }

    /// Messaging across the enabled backends
    pub fn threads(&self) -> &MessagingFacade {
        &self.threads
    }

    pub fn dapps(&self) -> &Dapps {
        &self.dapps
    }

    pub fn wallet(&self) -> &Wallets {
        &self.wallet
    }

    pub fn identity(&self) -> &Arc<dyn IdentityResolver> {
        &self.identity
    }
}

/// Builds [`Sdk`] handles with injectable collaborators
pub struct SdkFactory {
    input: ConfigInput,
    ledger_program_factory: Arc<dyn LedgerProgramFactory>,
    reporter: Arc<dyn ConfigReporter>,
}

impl SdkFactory {
    pub fn new(input: ConfigInput) -> Self {
        Self {
            input,
            ledger_program_factory: Arc::new(RpcLedgerProgramFactory),
            reporter: Arc::new(TracingConfigReporter),
        }
    }

    pub fn with_ledger_program_factory(mut self, factory: Arc<dyn LedgerProgramFactory>) -> Self {
        self.ledger_program_factory = factory;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ConfigReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn create(&self) -> Result<Sdk> {
        let config = resolve(&self.input)?;
        let identity = create_identity_resolver(
            &config.identity.strategy,
            config.identity.resolvers.clone(),
        )?;

        if config.environment != Environment::Production {
            self.reporter.report(&config.summary());
        }

        let wallet = config.wallet.clone();
        let wallet_key = wallet.public_key();

        let ledger_program = self.ledger_program_factory.create(
            wallet.clone(),
            config.solana.dialect_program_address,
            &config.solana.rpc_url,
        )?;

        let encryption = Arc::new(EncryptionKeysProvider::new(
            wallet.clone(),
            config.encryption_keys_store.clone(),
            config.message_cipher.clone(),
        ));

        let token_provider = create_token_provider(
            token_signer_for(wallet.clone()),
            Duration::minutes(i64::from(config.dialect_cloud.token_lifetime_minutes)),
            config.dialect_cloud.token_store.clone(),
        );

        let cloud = CloudApi::new(
            CloudClientConfig {
                base_url: config.dialect_cloud.url.clone(),
                ..Default::default()
            },
            Arc::new(BearerTokens(token_provider.clone())),
        )?;

        let context = BackendContext {
            wallet: wallet_key,
            ledger_program: ledger_program.clone(),
            cloud: cloud.clone(),
            encryption,
        };
        let threads = create_messaging(&config.backends, &context)?;
        let dapps = create_dapps(&config.backends, &context)?;
        let wallets = Wallets::new(&cloud);

        debug!(
            wallet = %wallet_key,
            backends = ?threads.backends(),
            identity_strategy = %identity.strategy(),
            "Dialect SDK assembled"
        );

        Ok(Sdk {
            info: SdkInfo {
                wallet,
                config,
                ledger_program,
                token_provider,
            },
            threads,
            dapps,
            wallet: wallets,
            identity,
        })
    }
}
