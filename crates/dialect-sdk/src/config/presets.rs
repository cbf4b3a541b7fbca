//! Per-environment endpoint presets

use super::{Environment, SolanaNetwork};
use crate::error::Result;
use crate::wallet::PublicKey;

/// Dialect program deployed on mainnet-beta
pub const MAINNET_PROGRAM_ADDRESS: &str = "CeNUxGUsSeb5RuAGvaMLNx3tEZrpBwQqA7Gs99vMPCAb";

/// Dialect program deployed on devnet and used for local validators
pub const DEVNET_PROGRAM_ADDRESS: &str = "2YFyZAg8rBtuvzFFiGvXwPHFAQJ2FXZoS7bYCKticpjk";

/// Data service base URL for an environment
pub fn cloud_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => "https://dialectapi.to",
        Environment::Development => "https://dev.dialectapi.to",
        Environment::LocalDevelopment => "http://localhost:8080",
    }
}

/// Program address and RPC endpoint of one Solana network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolanaPreset {
    pub network: SolanaNetwork,
    pub program_address: &'static str,
    pub rpc_url: &'static str,
}

impl SolanaPreset {
    pub fn program_address(&self) -> Result<PublicKey> {
        self.program_address.parse()
    }
}

pub fn solana_preset(network: SolanaNetwork) -> SolanaPreset {
    match network {
        SolanaNetwork::MainnetBeta => SolanaPreset {
            network,
            program_address: MAINNET_PROGRAM_ADDRESS,
            rpc_url: "https://api.mainnet-beta.solana.com",
        },
        SolanaNetwork::Devnet => SolanaPreset {
            network,
            program_address: DEVNET_PROGRAM_ADDRESS,
            rpc_url: "https://api.devnet.solana.com",
        },
        SolanaNetwork::Localnet => SolanaPreset {
            network,
            program_address: DEVNET_PROGRAM_ADDRESS,
            rpc_url: "http://127.0.0.1:8899",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_program_addresses_parse() {
        for network in [
            SolanaNetwork::MainnetBeta,
            SolanaNetwork::Devnet,
            SolanaNetwork::Localnet,
        ] {
            assert!(solana_preset(network).program_address().is_ok(), "{}", network);
        }
    }

    #[test]
    fn test_environment_maps_to_network() {
        assert_eq!(
            solana_preset(Environment::Development.solana_network()).rpc_url,
            "https://api.devnet.solana.com"
        );
        assert_eq!(cloud_url(Environment::LocalDevelopment), "http://localhost:8080");
    }
}
