//! Error types for the agent translation bridge.

use crate::framework::AgentFramework;
use crate::types::VersionId;
use thiserror::Error;

/// Storage errors raised by the key/value collaborator and the temporal store
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O hiccup worth retrying
    #[error("Transient storage failure: {0}")]
    Transient(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Predicate {predicate} is outside the ontology and the extension namespace")]
    InvalidPredicate { predicate: String },

    #[error("Quad subject {subject} does not belong to agent {uri}")]
    ForeignSubject { uri: String, subject: String },

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Version {version} not found for {uri}")]
    VersionNotFound { uri: String, version: VersionId },

    #[error("History already exists for {0}")]
    HistoryExists(String),

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl StorageError {
    /// Whether the operation may succeed if attempted again
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient(_))
    }
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(e) => StorageError::Transient(e.to_string()),
            other => StorageError::Backend(other.to_string()),
        }
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Encoding(err.to_string())
    }
}

/// Errors raised by framework adapters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// Malformed native structure; fatal and never retried
    #[error("{framework} validation failed at {field_path}: {message}")]
    Validation {
        framework: AgentFramework,
        field_path: String,
        message: String,
    },

    /// Native version newer than the adapter's table; mapping degrades to best effort
    #[error("{framework} version {version} is newer than supported schema {supported}")]
    Compatibility {
        framework: AgentFramework,
        version: String,
        supported: String,
    },

    /// Canonical data that cannot be lowered into the native shape
    #[error("{framework} mapping failed at {field_path}: {message}")]
    Mapping {
        framework: AgentFramework,
        field_path: String,
        message: String,
    },
}

impl AdapterError {
    pub fn validation(
        framework: AgentFramework,
        field_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AdapterError::Validation {
            framework,
            field_path: field_path.into(),
            message: message.into(),
        }
    }

    pub fn mapping(
        framework: AgentFramework,
        field_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AdapterError::Mapping {
            framework,
            field_path: field_path.into(),
            message: message.into(),
        }
    }

    /// Field path the error refers to, if any
    pub fn field_path(&self) -> Option<&str> {
        match self {
            AdapterError::Validation { field_path, .. } | AdapterError::Mapping { field_path, .. } => {
                Some(field_path)
            }
            AdapterError::Compatibility { .. } => None,
        }
    }
}

/// Ontology document errors
#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("Failed to read ontology file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse ontology document: {0}")]
    Parse(String),

    #[error("Unknown predicate in ontology document: {0}")]
    UnknownPredicate(String),

    #[error("Ontology namespace mismatch: expected {expected}, found {found}")]
    NamespaceMismatch { expected: String, found: String },
}

/// Top-level API errors
///
/// Only conditions without a meaningful partial result surface here; everything
/// that happens inside a translation is reported through its result.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No adapter registered for {framework} (version: {})", .version.as_deref().unwrap_or("any"))]
    NoAdapter {
        framework: AgentFramework,
        version: Option<String>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A worker task died before producing a result
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
