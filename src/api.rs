//! Agent Bridge API
//!
//! Language-level entry points. Transport wrappers are thin shells over
//! [`AgentBridge`].

use crate::adapter::{AdapterInfo, AdapterRegistry};
use crate::bridge::{EventPublisher, Orchestrator, TranslateOptions, TranslationResult};
use crate::canonical::{CanonicalAgent, NativeAgent};
use crate::config::{paths, BridgeConfig, ConfigLoader, StoreBackend};
use crate::error::ApiError;
use crate::framework::AgentFramework;
use crate::ontology::Ontology;
use crate::rdf::Iri;
use crate::store::{KeyValueStore, MemoryKv, SledKv, TemporalStore, VersionMetadata};
use crate::types::VersionId;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Translation bridge assembled from configuration
pub struct AgentBridge {
    config: BridgeConfig,
    orchestrator: Orchestrator,
}

impl AgentBridge {
    /// Build a bridge from an explicit configuration
    pub fn new(config: BridgeConfig) -> Result<Self, ApiError> {
        config.validate()?;

        let ontology = match &config.ontology.path {
            Some(path) => Ontology::load(path)?,
            None => Ontology::builtin(),
        };
        let kv: Arc<dyn KeyValueStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryKv::new()),
            StoreBackend::Sled => {
                let path = config
                    .store
                    .path
                    .clone()
                    .or_else(paths::default_store_dir)
                    .ok_or_else(|| {
                        ApiError::ConfigError("store.path is required for the sled backend".to_string())
                    })?;
                Arc::new(SledKv::open(&path)?)
            }
        };
        let store = TemporalStore::new(kv, ontology).with_snapshot_interval(config.store.snapshot_interval);
        let registry = AdapterRegistry::with_builtin_adapters();

        info!(
            backend = ?config.store.backend,
            snapshot_interval = config.store.snapshot_interval,
            ontology = %store.ontology().version(),
            adapters = registry.list().len(),
            "Agent bridge ready"
        );

        let orchestrator = Orchestrator::new(
            Arc::new(registry),
            Arc::new(store),
            config.orchestrator_settings(),
        );
        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// Load configuration from the default file and environment, then build
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ConfigLoader::load()?)
    }

    /// In-memory bridge with default settings
    pub fn in_memory() -> Result<Self, ApiError> {
        Self::new(BridgeConfig::default())
    }

    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.orchestrator = self.orchestrator.with_events(events);
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        self.orchestrator.registry()
    }

    pub fn store(&self) -> &Arc<TemporalStore> {
        self.orchestrator.store()
    }

    pub async fn translate(
        &self,
        native: &NativeAgent,
        target: AgentFramework,
        options: &TranslateOptions,
    ) -> Result<TranslationResult, ApiError> {
        self.orchestrator.translate(native, target, options).await
    }

    pub async fn batch_translate(
        &self,
        natives: Vec<NativeAgent>,
        target: AgentFramework,
        options: &TranslateOptions,
    ) -> Vec<Result<TranslationResult, ApiError>> {
        self.orchestrator.batch_translate(natives, target, options).await
    }

    pub fn list_adapters(&self) -> Vec<AdapterInfo> {
        self.orchestrator.list_adapters()
    }

    /// Guess the framework of a raw native document from its marker fields
    pub fn detect_framework(&self, data: &Value) -> Option<AgentFramework> {
        self.registry().detect_framework(data)
    }

    pub async fn get_agent(&self, uri: &Iri) -> Result<CanonicalAgent, ApiError> {
        self.orchestrator.get_agent(uri).await
    }

    pub async fn get_agent_history(&self, uri: &Iri) -> Result<Vec<VersionMetadata>, ApiError> {
        self.orchestrator.get_agent_history(uri).await
    }

    pub async fn get_agent_at_version(
        &self,
        uri: &Iri,
        version: VersionId,
    ) -> Result<CanonicalAgent, ApiError> {
        self.orchestrator.get_agent_at_version(uri, version).await
    }

    /// Reload the store's validation ontology
    ///
    /// Uses `path` when given, else the configured document, else the
    /// built-in ontology. Committed versions are unaffected.
    pub fn reload_ontology(&self, path: Option<&Path>) -> Result<semver::Version, ApiError> {
        let ontology = match path.or(self.config.ontology.path.as_deref()) {
            Some(path) => Ontology::load(path)?,
            None => Ontology::builtin(),
        };
        let version = ontology.version().clone();
        self.store().replace_ontology(ontology);
        Ok(version)
    }
}
