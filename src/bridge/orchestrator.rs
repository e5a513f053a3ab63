//! Translation state machine
//!
//! `RECEIVED → VALIDATING → TO_CANONICAL → PERSISTING → FROM_CANONICAL →
//! VALIDATING_OUTPUT → SCORING → DONE`, with any stage able to end in
//! `FAILED`. Adapters are resolved before the first stage so a missing
//! adapter is returned as an error and nothing is written.

use crate::adapter::{AdapterInfo, AdapterRegistry, FrameworkAdapter};
use crate::bridge::events::{
    EventPublisher, NoopPublisher, STAGE_CHANGED, TRANSLATION_COMPLETED, TRANSLATION_FAILED,
};
use crate::bridge::fidelity::{self, FidelityConfig, FidelityInputs};
use crate::bridge::options::TranslateOptions;
use crate::bridge::result::{codes, Diagnostic, TranslationResult, TranslationStage};
use crate::bridge::retry::RetryPolicy;
use crate::canonical::{provenance, CanonicalAgent, NativeAgent};
use crate::error::{ApiError, StorageError};
use crate::framework::AgentFramework;
use crate::rdf::Iri;
use crate::store::{ExtensionPolicy, IngestReceipt, TemporalStore, VersionMetadata};
use crate::types::VersionId;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

/// Tunables shared by every translation
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub fidelity: FidelityConfig,
    pub retry: RetryPolicy,
    pub extensions: ExtensionPolicy,
    pub batch_concurrency: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            fidelity: FidelityConfig::default(),
            retry: RetryPolicy::default(),
            extensions: ExtensionPolicy::accumulate(64, 64 * 1024),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

/// Deadline check failed; the run is already marked failed
struct Halt;

/// Mutable state of one translation
struct Run {
    source: AgentFramework,
    target: AgentFramework,
    started: Instant,
    deadline: Option<Instant>,
    stage: TranslationStage,
    failed_at: Option<TranslationStage>,
    warnings: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
    canonical: Option<CanonicalAgent>,
    result: Option<NativeAgent>,
    version_id: Option<VersionId>,
    fidelity: Option<fidelity::FidelityReport>,
    events: Arc<dyn EventPublisher>,
}

impl Run {
    fn new(
        source: AgentFramework,
        target: AgentFramework,
        deadline: Option<Duration>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let started = Instant::now();
        Self {
            source,
            target,
            started,
            deadline: deadline.map(|d| started + d),
            stage: TranslationStage::Received,
            failed_at: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            canonical: None,
            result: None,
            version_id: None,
            fidelity: None,
            events,
        }
    }

    /// Start `stage` unless the deadline has passed
    fn enter(&mut self, stage: TranslationStage) -> Result<(), Halt> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.stage = stage;
                self.error(codes::TIMEOUT, format!("Deadline exceeded before {}", stage));
                return Err(self.fail());
            }
        }
        debug!(source = %self.source, target = %self.target, from = %self.stage, to = %stage, "Stage transition");
        self.stage = stage;
        self.events.publish(
            STAGE_CHANGED,
            json!({
                "source": self.source,
                "target": self.target,
                "stage": stage,
            }),
        );
        Ok(())
    }

    fn warn(&mut self, code: &str, message: impl Into<String>) {
        self.warnings.push(Diagnostic::new(self.stage, code, message));
    }

    fn error(&mut self, code: &str, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(self.stage, code, message));
    }

    fn fail(&mut self) -> Halt {
        self.failed_at = Some(self.stage);
        self.stage = TranslationStage::Failed;
        Halt
    }

    fn finish(self) -> TranslationResult {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        let success = self.stage == TranslationStage::Done;
        let fidelity_score = match (&self.fidelity, success) {
            (Some(report), true) => report.score,
            _ => 0.0,
        };

        let event = if success {
            info!(
                source = %self.source,
                target = %self.target,
                score = fidelity_score,
                warnings = self.warnings.len(),
                duration_ms,
                "Translation completed"
            );
            TRANSLATION_COMPLETED
        } else {
            warn!(
                source = %self.source,
                target = %self.target,
                failed_at = ?self.failed_at,
                errors = self.errors.len(),
                duration_ms,
                "Translation failed"
            );
            TRANSLATION_FAILED
        };
        self.events.publish(
            event,
            json!({
                "source": self.source,
                "target": self.target,
                "score": fidelity_score,
                "version_id": self.version_id,
                "failed_at": self.failed_at,
            }),
        );

        TranslationResult {
            success,
            result: self.result,
            canonical: self.canonical,
            fidelity_score,
            duration_ms,
            warnings: self.warnings,
            errors: self.errors,
            stage: self.stage,
            failed_at: self.failed_at,
            version_id: self.version_id,
            fidelity: self.fidelity,
        }
    }
}

/// Drives translations between frameworks
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<AdapterRegistry>,
    store: Arc<TemporalStore>,
    events: Arc<dyn EventPublisher>,
    settings: Arc<OrchestratorSettings>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<AdapterRegistry>,
        store: Arc<TemporalStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            registry,
            store,
            events: Arc::new(NoopPublisher),
            settings: Arc::new(settings),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = events;
        self
    }

    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<TemporalStore> {
        &self.store
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Translate one native agent into `target`
    ///
    /// Returns `Err` only when no adapter covers the source or the target.
    pub async fn translate(
        &self,
        native: &NativeAgent,
        target: AgentFramework,
        options: &TranslateOptions,
    ) -> Result<TranslationResult, ApiError> {
        let source_adapter = self.registry.resolve(native.framework, Some(&native.version))?;
        let target_adapter = self.registry.resolve(target, options.target_version.as_ref())?;

        let mut run = Run::new(native.framework, target, options.deadline, self.events.clone());
        // A halted run has already recorded why it stopped
        let _ = self
            .drive(&mut run, native, source_adapter, target_adapter, options)
            .await;
        Ok(run.finish())
    }

    async fn drive(
        &self,
        run: &mut Run,
        native: &NativeAgent,
        source: Arc<dyn FrameworkAdapter>,
        target: Arc<dyn FrameworkAdapter>,
        options: &TranslateOptions,
    ) -> Result<(), Halt> {
        run.enter(TranslationStage::Validating)?;
        let validation = source.validate(native);
        if !validation.is_valid() {
            for err in &validation.errors {
                run.errors.push(Diagnostic::from_adapter(run.stage, err));
            }
            return Err(run.fail());
        }

        run.enter(TranslationStage::ToCanonical)?;
        let lifted = match source.to_canonical(native) {
            Ok(lifted) => lifted,
            Err(err) => {
                run.errors.push(Diagnostic::from_adapter(run.stage, &err));
                return Err(run.fail());
            }
        };
        if let Some(compat) = &lifted.report.compatibility {
            warn!(framework = %native.framework, version = %native.version, "Best-effort mapping for newer version");
            run.warnings.push(Diagnostic::from_adapter(run.stage, compat));
        }
        for message in &lifted.report.warnings {
            run.warn(codes::STRUCTURAL, message.clone());
        }
        let mut canonical = lifted.value;
        canonical.metadata.insert(
            provenance::ONTOLOGY_VERSION.to_string(),
            self.store.ontology().version().to_string(),
        );
        let input_extensions = canonical.extensions.clone();
        run.canonical = Some(canonical.clone());

        if options.persist {
            run.enter(TranslationStage::Persisting)?;
            match self.persist(&canonical).await {
                Ok(receipt) => {
                    for key in &receipt.evicted {
                        run.warnings.push(
                            Diagnostic::new(
                                run.stage,
                                codes::EXTENSION_EVICTED,
                                format!("Carried extension {} evicted over the accumulation limit", key),
                            )
                            .at(key.field_path.to_string()),
                        );
                    }
                    run.version_id = Some(receipt.version_id);
                    canonical = receipt.agent;
                    run.canonical = Some(canonical.clone());
                }
                Err(err) => {
                    error!(uri = %canonical.uri, error = %err, "Persisting canonical agent failed");
                    run.error(codes::STORAGE, err.to_string());
                    return Err(run.fail());
                }
            }
        }

        run.enter(TranslationStage::FromCanonical)?;
        let lowered = match target.from_canonical(&canonical) {
            Ok(lowered) => lowered,
            Err(err) => {
                run.errors.push(Diagnostic::from_adapter(run.stage, &err));
                return Err(run.fail());
            }
        };
        for message in &lowered.report.warnings {
            run.warn(codes::STRUCTURAL, message.clone());
        }

        let target_framework = target.framework();
        for predicate in &lowered.report.dropped_predicates {
            warn!(predicate = %predicate, target = %target_framework, "Predicate dropped by target");
            run.warn(
                codes::PREDICATE_DROPPED,
                format!("Canonical {} has no {} field and was dropped", predicate, target_framework),
            );
        }

        let mut dropped = 0;
        for extension in &input_extensions {
            if extension.framework == target_framework {
                continue;
            }
            dropped += 1;
            let key = extension.key();
            warn!(extension = %key, target = %target_framework, "Extension dropped by target");
            run.warnings.push(
                Diagnostic::new(
                    run.stage,
                    codes::EXTENSION_DROPPED,
                    format!("Extension {} has no {} equivalent and was dropped", key, target_framework),
                )
                .at(extension.field_path.to_string()),
            );
        }
        for extension in &canonical.extensions {
            let key = extension.key();
            if extension.framework != target_framework
                && !input_extensions.iter().any(|e| e.key() == key)
            {
                debug!(extension = %key, target = %target_framework, "Accumulated extension not lowered");
            }
        }
        run.result = Some(lowered.value.clone());

        run.enter(TranslationStage::ValidatingOutput)?;
        let output = target.validate(&lowered.value);
        if !output.is_valid() {
            for err in &output.errors {
                let mut diagnostic = Diagnostic::from_adapter(run.stage, err);
                diagnostic.code = codes::OUTPUT_VALIDATION.to_string();
                run.errors.push(diagnostic);
            }
            return Err(run.fail());
        }

        run.enter(TranslationStage::Scoring)?;
        let report = fidelity::score(
            &FidelityInputs {
                source_fields: lifted.report.source_fields(),
                dropped_extensions: dropped,
                dropped_predicates: lowered.report.dropped_predicates.len(),
                required_fields: lowered.report.required_fields.len(),
                defaulted_fields: lowered.report.defaulted_fields.len(),
                warnings: run.warnings.len(),
            },
            &self.settings.fidelity,
        );
        let threshold = options.min_fidelity.unwrap_or(self.settings.fidelity.min_score);
        let below = report.score < threshold;
        let score = report.score;
        run.fidelity = Some(report);
        if below {
            let message = format!("Fidelity {:.3} is below threshold {:.3}", score, threshold);
            if options.strict {
                run.error(codes::FIDELITY_BELOW_THRESHOLD, message);
                return Err(run.fail());
            }
            run.warn(codes::FIDELITY_BELOW_THRESHOLD, message);
        }

        run.stage = TranslationStage::Done;
        Ok(())
    }

    async fn persist(&self, canonical: &CanonicalAgent) -> Result<IngestReceipt, StorageError> {
        let policy = &self.settings.extensions;
        self.settings
            .retry
            .run("commit", || {
                let store = self.store.clone();
                let agent = canonical.clone();
                let policy = policy.clone();
                async move {
                    tokio::task::spawn_blocking(move || store.commit(&agent, &policy))
                        .await
                        .map_err(|e| StorageError::Backend(format!("Store task failed: {}", e)))?
                }
            })
            .await
    }

    /// Translate many agents with bounded concurrency
    ///
    /// Entries come back in input order; each agent's stages still run in sequence.
    pub async fn batch_translate(
        &self,
        natives: Vec<NativeAgent>,
        target: AgentFramework,
        options: &TranslateOptions,
    ) -> Vec<Result<TranslationResult, ApiError>> {
        let semaphore = Arc::new(Semaphore::new(self.settings.batch_concurrency.max(1)));
        let mut handles = Vec::with_capacity(natives.len());
        for native in natives {
            let this = self.clone();
            let options = options.clone();
            let semaphore = semaphore.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                this.translate(&native, target, &options).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle.await {
                Ok(result) => result,
                Err(err) => {
                    error!(error = %err, "Batch translation task failed");
                    Err(ApiError::Internal(format!("Translation task failed: {}", err)))
                }
            });
        }
        results
    }

    pub fn list_adapters(&self) -> Vec<AdapterInfo> {
        self.registry.list()
    }

    /// Latest canonical version of `uri`
    pub async fn get_agent(&self, uri: &Iri) -> Result<CanonicalAgent, ApiError> {
        let uri = uri.clone();
        self.blocking(move |store| store.get_latest(&uri)).await
    }

    pub async fn get_agent_history(&self, uri: &Iri) -> Result<Vec<VersionMetadata>, ApiError> {
        let uri = uri.clone();
        self.blocking(move |store| store.history(&uri)).await
    }

    pub async fn get_agent_at_version(
        &self,
        uri: &Iri,
        version: VersionId,
    ) -> Result<CanonicalAgent, ApiError> {
        let uri = uri.clone();
        self.blocking(move |store| store.get_at_version(&uri, version))
            .await
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&TemporalStore) -> Result<T, StorageError> + Send + 'static,
    {
        let store = self.store.clone();
        let outcome = tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?;
        Ok(outcome?)
    }
}
