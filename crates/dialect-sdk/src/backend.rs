//! Backend kinds and per-backend capability bindings

use crate::encryption::EncryptionKeysProvider;
use crate::error::{Result, SdkError};
use crate::ledger::LedgerProgram;
use crate::wallet::PublicKey;
use dialect_cloud_client::CloudApi;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A backend provider implementing messaging and dapp capabilities.
///
/// The position of a kind in the enabled list is its priority: facades
/// iterate backends in that order and "first" semantics pick the earliest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// On-chain Dialect program
    #[serde(alias = "solana")]
    Ledger,
    /// Dialect cloud data service
    #[serde(alias = "dialect-cloud")]
    Cloud,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ledger => "ledger",
            Self::Cloud => "cloud",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ledger" | "solana" => Ok(Self::Ledger),
            "cloud" | "dialect-cloud" | "dialect_cloud" => Ok(Self::Cloud),
            _ => Err(SdkError::IllegalArgument(format!("unknown backend {}", s))),
        }
    }
}

/// Default backend order when none is configured
pub const DEFAULT_BACKENDS: [BackendKind; 2] = [BackendKind::Cloud, BackendKind::Ledger];

/// Resolve the enabled backend list.
///
/// Absent means the default `[Cloud, Ledger]`. An explicit list is kept
/// exactly as given, order included, and must not be empty.
pub fn resolve_backends(explicit: Option<&[BackendKind]>) -> Result<Vec<BackendKind>> {
    match explicit {
        None => Ok(DEFAULT_BACKENDS.to_vec()),
        Some([]) => Err(SdkError::IllegalArgument(
            "at least one backend required".to_string(),
        )),
        Some(backends) => Ok(backends.to_vec()),
    }
}

/// Parse backend names, failing on the first unknown one
pub fn parse_backends<S: AsRef<str>>(names: &[S]) -> Result<Vec<BackendKind>> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}

/// One backend's implementation of capability `T`
pub struct BackendBinding<T: ?Sized> {
    pub backend: BackendKind,
    pub capability: Arc<T>,
}

impl<T: ?Sized> BackendBinding<T> {
    pub fn new(backend: BackendKind, capability: Arc<T>) -> Self {
        Self { backend, capability }
    }
}

impl<T: ?Sized> Clone for BackendBinding<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend,
            capability: self.capability.clone(),
        }
    }
}

/// Ordered, non-empty set of bindings for one capability
pub struct Bindings<T: ?Sized> {
    bindings: Vec<BackendBinding<T>>,
}

impl<T: ?Sized> Bindings<T> {
    pub fn new(bindings: Vec<BackendBinding<T>>) -> Result<Self> {
        if bindings.is_empty() {
            return Err(SdkError::IllegalArgument(
                "at least one backend required".to_string(),
            ));
        }
        Ok(Self { bindings })
    }

    /// Route to the named backend; fails if it was not enabled
    pub fn route(&self, backend: BackendKind) -> Result<&Arc<T>> {
        self.bindings
            .iter()
            .find(|b| b.backend == backend)
            .map(|b| &b.capability)
            .ok_or_else(|| {
                SdkError::IllegalArgument(format!("backend {} is not enabled", backend))
            })
    }

    /// Highest priority binding
    pub fn first(&self) -> &BackendBinding<T> {
        &self.bindings[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendBinding<T>> {
        self.bindings.iter()
    }

    pub fn backends(&self) -> Vec<BackendKind> {
        self.bindings.iter().map(|b| b.backend).collect()
    }
}

/// Shared dependencies handed to every capability builder.
///
/// Holding these performs no I/O; the ledger program and cloud API only
/// connect on first use.
#[derive(Clone)]
pub struct BackendContext {
    pub wallet: PublicKey,
    pub ledger_program: Arc<dyn LedgerProgram>,
    pub cloud: CloudApi,
    pub encryption: Arc<EncryptionKeysProvider>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_backends_default_to_cloud_then_ledger() {
        assert_eq!(
            resolve_backends(None).unwrap(),
            vec![BackendKind::Cloud, BackendKind::Ledger]
        );
    }

    #[test]
    fn test_empty_backends_rejected() {
        let err = resolve_backends(Some(&[])).unwrap_err();
        assert!(matches!(err, SdkError::IllegalArgument(msg) if msg == "at least one backend required"));
    }

    #[test]
    fn test_explicit_order_and_duplicates_preserved() {
        let explicit = [BackendKind::Ledger, BackendKind::Cloud, BackendKind::Ledger];
        assert_eq!(resolve_backends(Some(&explicit)).unwrap(), explicit.to_vec());
    }

    #[test]
    fn test_unknown_backend_name() {
        let err = parse_backends(&["cloud", "carrier-pigeon"]).unwrap_err();
        assert!(matches!(err, SdkError::IllegalArgument(msg) if msg == "unknown backend carrier-pigeon"));
        assert_eq!(
            parse_backends(&["SOLANA", "dialect-cloud"]).unwrap(),
            vec![BackendKind::Ledger, BackendKind::Cloud]
        );
    }

    #[test]
    fn test_route_to_disabled_backend() {
        let bindings: Bindings<str> =
            Bindings::new(vec![BackendBinding::new(BackendKind::Cloud, Arc::from("cloud impl"))])
                .unwrap();
        assert_eq!(&**bindings.route(BackendKind::Cloud).unwrap(), "cloud impl");
        assert!(matches!(
            bindings.route(BackendKind::Ledger),
            Err(SdkError::IllegalArgument(_))
        ));
    }
}
