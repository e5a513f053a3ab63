//! Translation results and diagnostics.

use crate::bridge::fidelity::FidelityReport;
use crate::canonical::{CanonicalAgent, NativeAgent};
use crate::error::AdapterError;
use crate::types::VersionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic codes
pub mod codes {
    pub const VALIDATION: &str = "validation";
    pub const COMPATIBILITY: &str = "compatibility";
    pub const MAPPING: &str = "mapping";
    pub const STRUCTURAL: &str = "structural";
    pub const EXTENSION_DROPPED: &str = "extension_dropped";
    pub const PREDICATE_DROPPED: &str = "predicate_dropped";
    pub const EXTENSION_EVICTED: &str = "extension_evicted";
    pub const STORAGE: &str = "storage";
    pub const OUTPUT_VALIDATION: &str = "output_validation";
    pub const FIDELITY_BELOW_THRESHOLD: &str = "fidelity_below_threshold";
    pub const TIMEOUT: &str = "timeout";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranslationStage {
    Received,
    Validating,
    ToCanonical,
    Persisting,
    FromCanonical,
    ValidatingOutput,
    Scoring,
    Done,
    Failed,
}

impl TranslationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStage::Received => "RECEIVED",
            TranslationStage::Validating => "VALIDATING",
            TranslationStage::ToCanonical => "TO_CANONICAL",
            TranslationStage::Persisting => "PERSISTING",
            TranslationStage::FromCanonical => "FROM_CANONICAL",
            TranslationStage::ValidatingOutput => "VALIDATING_OUTPUT",
            TranslationStage::Scoring => "SCORING",
            TranslationStage::Done => "DONE",
            TranslationStage::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TranslationStage::Done | TranslationStage::Failed)
    }
}

impl fmt::Display for TranslationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One warning or error, tagged with the stage that raised it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: TranslationStage,
    pub code: String,
    pub message: String,
    pub field_path: Option<String>,
}

impl Diagnostic {
    pub fn new(stage: TranslationStage, code: &str, message: impl Into<String>) -> Self {
        Self {
            stage,
            code: code.to_string(),
            message: message.into(),
            field_path: None,
        }
    }

    pub fn at(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = Some(field_path.into());
        self
    }

    pub fn from_adapter(stage: TranslationStage, err: &AdapterError) -> Self {
        let code = match err {
            AdapterError::Validation { .. } => codes::VALIDATION,
            AdapterError::Compatibility { .. } => codes::COMPATIBILITY,
            AdapterError::Mapping { .. } => codes::MAPPING,
        };
        Self {
            stage,
            code: code.to_string(),
            message: err.to_string(),
            field_path: err.field_path().map(str::to_string),
        }
    }
}

/// Outcome of one translation
///
/// Failures carry whatever partial output and diagnostics the pipeline had
/// produced when it stopped.
#[derive(Debug, Clone)]
pub struct TranslationResult {
    pub success: bool,
    pub result: Option<NativeAgent>,
    pub canonical: Option<CanonicalAgent>,
    /// In [0, 1]; 0 for failed translations
    pub fidelity_score: f64,
    pub duration_ms: u64,
    pub warnings: Vec<Diagnostic>,
    pub errors: Vec<Diagnostic>,
    /// `Done` or `Failed`
    pub stage: TranslationStage,
    /// Stage that was running or about to start when the translation failed
    pub failed_at: Option<TranslationStage>,
    pub version_id: Option<VersionId>,
    pub fidelity: Option<FidelityReport>,
}

impl TranslationResult {
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|d| d.code == code)
    }

    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|d| d.code == code)
    }
}
