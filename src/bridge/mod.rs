//! Bridge Orchestrator
//!
//! Drives one translation through validation, mapping, persistence and
//! fidelity scoring, aggregating every stage's diagnostics into a
//! [`TranslationResult`].

pub mod events;
pub mod fidelity;
pub mod options;
pub mod orchestrator;
pub mod result;
pub mod retry;

pub use events::{BridgeEvent, ChannelPublisher, EventPublisher, NoopPublisher, TracingPublisher};
pub use fidelity::{FidelityConfig, FidelityInputs, FidelityReport};
pub use options::TranslateOptions;
pub use orchestrator::{Orchestrator, OrchestratorSettings, DEFAULT_BATCH_CONCURRENCY};
pub use result::{codes, Diagnostic, TranslationResult, TranslationStage};
pub use retry::RetryPolicy;
