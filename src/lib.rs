//! Agent Bridge: framework-neutral agent translation
//!
//! Native agent definitions from any supported framework are lifted into a
//! canonical RDF-quad form, persisted as an append-only version chain, and
//! lowered into any other framework with a fidelity score describing what
//! the hop lost.

pub mod adapter;
pub mod api;
pub mod bridge;
pub mod canonical;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod framework;
pub mod logging;
pub mod ontology;
pub mod rdf;
pub mod store;
pub mod types;

pub use adapter::{AdapterRegistry, FrameworkAdapter};
pub use api::AgentBridge;
pub use bridge::{TranslateOptions, TranslationResult, TranslationStage};
pub use canonical::{CanonicalAgent, NativeAgent};
pub use error::{AdapterError, ApiError, OntologyError, StorageError};
pub use framework::AgentFramework;
pub use store::TemporalStore;
