//! Resolved configuration reporting

use super::ConfigSummary;
use tracing::info;

/// Receives the redacted configuration once per SDK assembly
pub trait ConfigReporter: Send + Sync {
    fn report(&self, summary: &ConfigSummary);
}

/// Logs the summary at `info`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfigReporter;

impl ConfigReporter for TracingConfigReporter {
    fn report(&self, summary: &ConfigSummary) {
        let backends: Vec<&str> = summary.backends.iter().map(|b| b.as_str()).collect();
        info!(
            environment = %summary.environment,
            wallet = %summary.wallet,
            backends = ?backends,
            cloud_url = %summary.dialect_cloud.url,
            solana_network = %summary.solana.network,
            program_address = %summary.solana.dialect_program_address,
            rpc_url = %summary.solana.rpc_url,
            identity_strategy = %summary.identity.strategy,
            "Initialized Dialect SDK"
        );
    }
}
