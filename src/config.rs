//! Configuration
//!
//! Layered with the `config` crate: serialized defaults, then an optional TOML
//! file, then `AGENT_BRIDGE__*` environment variables (nested keys separated
//! by `__`, e.g. `AGENT_BRIDGE__STORE__SNAPSHOT_INTERVAL=16`).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::bridge::{FidelityConfig, OrchestratorSettings, RetryPolicy, DEFAULT_BATCH_CONCURRENCY};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::store::{ExtensionPolicy, DEFAULT_SNAPSHOT_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ontology: OntologyConfig,
    #[serde(default)]
    pub fidelity: FidelityConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub extensions: ExtensionLimits,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Sled database directory; the platform data dir when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: u64,
}

fn default_snapshot_interval() -> u64 {
    DEFAULT_SNAPSHOT_INTERVAL
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: None,
            snapshot_interval: default_snapshot_interval(),
        }
    }
}

/// Ontology document; the built-in ontology when unset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OntologyConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Bounds on extensions accumulated across translations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionLimits {
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_count() -> usize {
    64
}

fn default_max_bytes() -> usize {
    64 * 1024
}

impl Default for ExtensionLimits {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl ExtensionLimits {
    pub fn policy(&self) -> ExtensionPolicy {
        ExtensionPolicy::accumulate(self.max_count, self.max_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        self.logging.validate()?;

        if self.store.snapshot_interval == 0 {
            return Err(ApiError::ConfigError(
                "store.snapshot_interval must be at least 1".to_string(),
            ));
        }

        let fidelity = &self.fidelity;
        let weights = [
            ("semantic_weight", fidelity.semantic_weight),
            ("completion_weight", fidelity.completion_weight),
            ("structural_weight", fidelity.structural_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ApiError::ConfigError(format!(
                    "fidelity.{} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        if weights.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
            return Err(ApiError::ConfigError(
                "fidelity weights must not all be zero".to_string(),
            ));
        }
        if fidelity.structural_saturation == 0 {
            return Err(ApiError::ConfigError(
                "fidelity.structural_saturation must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&fidelity.min_score) {
            return Err(ApiError::ConfigError(format!(
                "fidelity.min_score must be within [0, 1], got {}",
                fidelity.min_score
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(ApiError::ConfigError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ApiError::ConfigError(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms".to_string(),
            ));
        }

        if self.batch.concurrency == 0 {
            return Err(ApiError::ConfigError(
                "batch.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings handed to the orchestrator
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            fidelity: self.fidelity.clone(),
            retry: self.retry.clone(),
            extensions: self.extensions.policy(),
            batch_concurrency: self.batch.concurrency,
        }
    }
}
