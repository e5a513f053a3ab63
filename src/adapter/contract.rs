//! Framework adapter contract.
//!
//! Adapters are pure: no I/O and no mutable state, so the orchestrator can
//! retry or replay any mapping safely and call them from any number of tasks.

use crate::adapter::validation::ValidationResult;
use crate::canonical::{CanonicalAgent, FieldPath, NativeAgent};
use crate::error::AdapterError;
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::CanonicalPredicate;
use semver::{Version, VersionReq};
use serde_json::Value;

/// Facts about one mapping pass, consumed by fidelity scoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingReport {
    /// Fields carried through canonical predicates
    pub mapped_fields: Vec<FieldPath>,
    /// Fields captured as (or restored from) this framework's extensions
    pub extension_fields: Vec<FieldPath>,
    /// Required fields filled from defaults
    pub defaulted_fields: Vec<FieldPath>,
    /// Every required field of the framework table
    pub required_fields: Vec<FieldPath>,
    /// Canonical predicates present on the agent that the target has no field for
    pub dropped_predicates: Vec<CanonicalPredicate>,
    /// Non-fatal structural warnings
    pub warnings: Vec<String>,
    /// Set when the native version is newer than the adapter's schema
    pub compatibility: Option<AdapterError>,
}

impl MappingReport {
    /// Number of source fields considered by the mapping
    pub fn source_fields(&self) -> usize {
        self.mapped_fields.len() + self.extension_fields.len()
    }
}

/// Mapped value plus the report describing how it was produced
#[derive(Debug, Clone)]
pub struct Mapped<T> {
    pub value: T,
    pub report: MappingReport,
}

/// Bidirectional mapper between one framework's native schema and the canonical form
pub trait FrameworkAdapter: Send + Sync {
    fn framework(&self) -> AgentFramework;

    /// Native versions this adapter accepts
    fn version_range(&self) -> &VersionReq;

    /// Version the field table is authored against
    fn schema_version(&self) -> &Version;

    fn validate(&self, native: &NativeAgent) -> ValidationResult;

    /// Lift a native agent into canonical form
    ///
    /// Fails fast with a field-path-qualified validation error.
    fn to_canonical(&self, native: &NativeAgent) -> Result<Mapped<CanonicalAgent>, AdapterError>;

    /// Lower a canonical agent into this framework's shape
    ///
    /// Extensions of other frameworks are dropped without comment.
    fn from_canonical(&self, canonical: &CanonicalAgent)
        -> Result<Mapped<NativeAgent>, AdapterError>;

    /// Whether raw `data` carries this framework's marker fields
    fn detect(&self, _data: &Value) -> bool {
        false
    }

    fn supports(&self, version: &Version) -> bool {
        self.version_range().matches(version)
    }
}
