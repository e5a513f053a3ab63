//! Persisted version records and their public views.

use crate::canonical::CanonicalAgent;
use crate::error::StorageError;
use crate::framework::AgentFramework;
use crate::rdf::{Iri, Quad};
use crate::types::{content_hash_hex, VersionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Current archive format
pub const ARCHIVE_FORMAT: u32 = 1;

/// Pointer to the latest version of one URI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadRecord {
    pub latest: VersionId,
    pub timestamp: DateTime<Utc>,
}

/// Version payload: a full quad set or a change set against the parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VersionBody {
    Snapshot { quads: Vec<Quad> },
    Delta { added: Vec<Quad>, removed: Vec<Quad> },
}

/// One immutable link of a per-URI version chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub uri: String,
    pub version_id: VersionId,
    pub parent_version_id: Option<VersionId>,
    pub timestamp: DateTime<Utc>,
    pub source_framework: AgentFramework,
    pub metadata: BTreeMap<String, String>,
    pub quad_count: usize,
    /// blake3 of the encoded full quad set
    pub content_hash: String,
    pub body: VersionBody,
}

impl VersionRecord {
    pub fn kind(&self) -> VersionKind {
        match self.body {
            VersionBody::Snapshot { .. } => VersionKind::Snapshot,
            VersionBody::Delta { .. } => VersionKind::Delta,
        }
    }

    pub fn metadata(&self) -> VersionMetadata {
        VersionMetadata {
            version_id: self.version_id,
            parent_version_id: self.parent_version_id,
            timestamp: self.timestamp,
            source_framework: self.source_framework,
            quad_count: self.quad_count,
            kind: self.kind(),
            content_hash: self.content_hash.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    Snapshot,
    Delta,
}

/// Summary of one version, as returned by `history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub version_id: VersionId,
    pub parent_version_id: Option<VersionId>,
    pub timestamp: DateTime<Utc>,
    pub source_framework: AgentFramework,
    pub quad_count: usize,
    pub kind: VersionKind,
    pub content_hash: String,
}

/// Fully materialized version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedSnapshot {
    pub uri: Iri,
    pub version_id: VersionId,
    pub timestamp: DateTime<Utc>,
    pub quads: BTreeSet<Quad>,
    pub parent_version_id: Option<VersionId>,
    pub source_framework: AgentFramework,
    pub metadata: BTreeMap<String, String>,
}

impl VersionedSnapshot {
    pub fn to_agent(&self) -> Result<CanonicalAgent, StorageError> {
        CanonicalAgent::from_quads(
            self.uri.clone(),
            self.source_framework,
            self.quads.iter().cloned(),
            self.metadata.clone(),
        )
    }
}

/// Portable full-chain archive produced by `snapshot`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotArchive {
    pub format: u32,
    pub uri: String,
    pub records: Vec<VersionRecord>,
}

/// Hash of a quad set in its canonical (sorted) encoding
pub fn quad_set_hash(quads: &BTreeSet<Quad>) -> Result<String, StorageError> {
    let encoded = bincode::serialize(quads)?;
    Ok(content_hash_hex(&encoded))
}

pub fn head_key(uri: &str) -> String {
    format!("agent/{}/head", uri)
}

pub fn version_key(uri: &str, version: VersionId) -> String {
    format!("agent/{}/v/{:020}", uri, version)
}

/// URI of a head key, if `key` is one
pub fn uri_of_head_key(key: &str) -> Option<&str> {
    key.strip_prefix("agent/")?.strip_suffix("/head")
}
