//! dialect-sdk-config - print the resolved SDK configuration
//!
//! Resolves flags and environment variables exactly as `Sdk::create`
//! would and prints the redacted summary as JSON.

use clap::Parser;
use dialect_sdk::config::{resolve, StoreInput};
use dialect_sdk::{
    create_identity_resolver, BackendKind, ConfigInput, DialectCloudConfigInput, Environment,
    IdentityConfigInput, PublicKey, SolanaConfigInput, SolanaNetwork, StoreSelector,
    WalletAdapter,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dialect-sdk-config")]
#[command(about = "Resolve and print Dialect SDK configuration")]
struct Args {
    /// production, development or local-development
    #[arg(long, env = "DIALECT_SDK_ENVIRONMENT")]
    environment: Option<Environment>,

    /// Enabled backends in priority order, e.g. cloud,ledger
    #[arg(long, env = "DIALECT_SDK_BACKENDS", value_delimiter = ',')]
    backends: Option<Vec<BackendKind>>,

    /// Environment preset for the data service only
    #[arg(long, env = "DIALECT_SDK_CLOUD_ENVIRONMENT")]
    cloud_environment: Option<Environment>,

    /// Data service base URL
    #[arg(long, env = "DIALECT_SDK_CLOUD_URL")]
    cloud_url: Option<String>,

    /// in-memory, session-storage or local-storage
    #[arg(long, env = "DIALECT_SDK_TOKEN_STORE")]
    token_store: Option<String>,

    #[arg(long, env = "DIALECT_SDK_TOKEN_LIFETIME_MINUTES")]
    token_lifetime_minutes: Option<u32>,

    /// mainnet-beta, devnet or localnet
    #[arg(long, env = "DIALECT_SDK_SOLANA_NETWORK")]
    solana_network: Option<SolanaNetwork>,

    /// Dialect program address
    #[arg(long, env = "DIALECT_SDK_PROGRAM_ADDRESS")]
    program_address: Option<PublicKey>,

    /// Solana RPC URL
    #[arg(long, env = "DIALECT_SDK_RPC_URL")]
    rpc_url: Option<String>,

    /// in-memory, session-storage or local-storage
    #[arg(long, env = "DIALECT_SDK_ENCRYPTION_KEYS_STORE")]
    encryption_keys_store: Option<String>,

    /// first-found, first-found-fast or aggregate-sequential
    #[arg(long, env = "DIALECT_SDK_IDENTITY_STRATEGY")]
    identity_strategy: Option<String>,

    /// Wallet public key to report
    #[arg(long, env = "DIALECT_SDK_PUBLIC_KEY", default_value = "11111111111111111111111111111111")]
    public_key: PublicKey,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Wallet that only knows its public key
struct ReadOnlyWallet(PublicKey);

impl WalletAdapter for ReadOnlyWallet {
    fn public_key(&self) -> PublicKey {
        self.0
    }
}

fn selector(name: &str) -> StoreSelector {
    name.parse().unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("dialect_sdk={}", args.log_level).parse()?),
        )
        .init();

    let mut input = ConfigInput::new(Arc::new(ReadOnlyWallet(args.public_key)));
    input.environment = args.environment;
    input.backends = args.backends;
    input.dialect_cloud = Some(DialectCloudConfigInput {
        environment: args.cloud_environment,
        url: args.cloud_url,
        token_store: args.token_store.as_deref().map(|s| StoreInput::Selector(selector(s))),
        token_lifetime_minutes: args.token_lifetime_minutes,
    });
    input.solana = Some(SolanaConfigInput {
        network: args.solana_network,
        dialect_program_address: args.program_address,
        rpc_url: args.rpc_url,
    });
    input.encryption_keys_store = args
        .encryption_keys_store
        .as_deref()
        .map(|s| StoreInput::Selector(selector(s)));
    if args.identity_strategy.is_some() {
        input.identity = Some(IdentityConfigInput {
            strategy: args.identity_strategy,
            resolvers: None,
        });
    }

    let config = resolve(&input)?;
    create_identity_resolver(&config.identity.strategy, Vec::new())?;

    let summary = config.summary();
    info!(environment = %summary.environment, "configuration resolved");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
