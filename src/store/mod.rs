//! Temporal RDF Store
//!
//! Append-only, strictly linear per-URI version chains of canonical agents,
//! persisted over a [`KeyValueStore`]. Each ingest writes a delta against the
//! previous version; every K-th version (1, K+1, 2K+1, ...) is a full
//! snapshot, so reconstruction replays at most K-1 deltas.
//!
//! Writers for one URI are serialized by [`UriLockManager`]. Version records
//! are immutable, so `get_at_version(uri, v)` returns the same agent forever.

pub mod kv;
pub mod record;

pub use kv::{KeyValueStore, MemoryKv, SledKv};
pub use record::{
    SnapshotArchive, VersionBody, VersionKind, VersionMetadata, VersionRecord, VersionedSnapshot,
};

use crate::canonical::CanonicalAgent;
use crate::concurrency::UriLockManager;
use crate::error::StorageError;
use crate::ontology::Ontology;
use crate::rdf::{ExtensionKey, Iri, Quad, TriplePattern};
use crate::types::VersionId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use record::{head_key, quad_set_hash, uri_of_head_key, version_key, HeadRecord, ARCHIVE_FORMAT};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default distance between full snapshots
pub const DEFAULT_SNAPSHOT_INTERVAL: u64 = 8;

/// Bounds on extensions carried forward from earlier versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPolicy {
    /// Carry extensions of the previous version that the incoming agent lacks
    ///
    /// Only other frameworks' extensions carry; the incoming agent's own
    /// framework keeps exactly the extensions it brings.
    pub carry: bool,
    pub max_count: usize,
    pub max_bytes: usize,
}

impl ExtensionPolicy {
    /// Persist the incoming agent exactly as given
    pub fn replace() -> Self {
        Self {
            carry: false,
            max_count: usize::MAX,
            max_bytes: usize::MAX,
        }
    }

    pub fn accumulate(max_count: usize, max_bytes: usize) -> Self {
        Self {
            carry: true,
            max_count,
            max_bytes,
        }
    }
}

/// Outcome of a commit
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub version_id: VersionId,
    /// False when the agent equalled the latest version and nothing was written
    pub created: bool,
    /// The agent as persisted, including carried extensions
    pub agent: CanonicalAgent,
    pub carried: Vec<ExtensionKey>,
    pub evicted: Vec<ExtensionKey>,
}

/// Versioned persistence of canonical agents
pub struct TemporalStore {
    kv: Arc<dyn KeyValueStore>,
    ontology: RwLock<Arc<Ontology>>,
    locks: UriLockManager,
    snapshot_interval: u64,
}

impl TemporalStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, ontology: Ontology) -> Self {
        Self {
            kv,
            ontology: RwLock::new(Arc::new(ontology)),
            locks: UriLockManager::new(),
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }

    /// In-memory store with the built-in ontology
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKv::new()), Ontology::builtin())
    }

    pub fn with_snapshot_interval(mut self, interval: u64) -> Self {
        self.snapshot_interval = interval.max(1);
        self
    }

    pub fn snapshot_interval(&self) -> u64 {
        self.snapshot_interval
    }

    /// Ontology used by the validation gate
    pub fn ontology(&self) -> Arc<Ontology> {
        self.ontology.read().clone()
    }

    /// Swap the validation ontology; in-flight commits keep the one they started with
    pub fn replace_ontology(&self, ontology: Ontology) {
        info!(version = %ontology.version(), "Replacing store ontology");
        *self.ontology.write() = Arc::new(ontology);
    }

    /// Record a new version of `agent` exactly as given
    pub fn ingest(&self, agent: &CanonicalAgent) -> Result<VersionId, StorageError> {
        self.commit(agent, &ExtensionPolicy::replace())
            .map(|receipt| receipt.version_id)
    }

    /// Record a new version, merging extensions from the previous version per `policy`
    ///
    /// Re-ingesting an agent equal to the latest version (quads, source
    /// framework and metadata) writes nothing and returns the existing id.
    pub fn commit(
        &self,
        agent: &CanonicalAgent,
        policy: &ExtensionPolicy,
    ) -> Result<IngestReceipt, StorageError> {
        let ontology = self.ontology();
        let uri = agent.uri.as_str();
        self.check_quads(&ontology, &agent.uri, agent.all_quads().iter())?;

        self.locks
            .with_write_lock(uri, || self.commit_locked(agent, policy))
    }

    /// Body of `commit`; the caller holds the URI's write lock
    fn commit_locked(
        &self,
        agent: &CanonicalAgent,
        policy: &ExtensionPolicy,
    ) -> Result<IngestReceipt, StorageError> {
        let uri = agent.uri.as_str();
        let head = self.read_head(uri)?;
        let previous = match &head {
            Some(head) => Some(self.reconstruct(uri, head.latest)?),
            None => None,
        };

        let mut merged = agent.clone();
        let mut carried = Vec::new();
        let mut evicted = Vec::new();
        if let (true, Some(previous)) = (policy.carry, &previous) {
            let prior = previous.to_agent()?;
            let mut count = merged.extensions.len();
            let mut bytes: usize = merged.extensions.iter().map(|e| e.encoded_len()).sum();
            for extension in prior.extensions {
                // The incoming document is authoritative for its own framework
                if extension.framework == merged.source_framework {
                    continue;
                }
                let key = extension.key();
                if merged.extension(&key).is_some() {
                    continue;
                }
                let size = extension.encoded_len();
                if count < policy.max_count && bytes.saturating_add(size) <= policy.max_bytes {
                    count += 1;
                    bytes += size;
                    carried.push(key);
                    merged.put_extension(extension);
                } else {
                    warn!(uri = %uri, extension = %key, "Evicting carried extension over limit");
                    evicted.push(key);
                }
            }
        }

        let quads = merged.all_quads();
        if let Some(previous) = &previous {
            if previous.quads == quads
                && previous.source_framework == merged.source_framework
                && previous.metadata == merged.metadata
            {
                debug!(uri = %uri, version = previous.version_id, "Identical re-ingest, no new version");
                return Ok(IngestReceipt {
                    version_id: previous.version_id,
                    created: false,
                    agent: merged,
                    carried,
                    evicted,
                });
            }
        }

        let version_id = head.as_ref().map_or(1, |h| h.latest + 1);
        let timestamp = next_timestamp(head.as_ref().map(|h| h.timestamp));
        let body = if (version_id - 1) % self.snapshot_interval == 0 {
            VersionBody::Snapshot {
                quads: quads.iter().cloned().collect(),
            }
        } else {
            let old = previous.as_ref().map(|p| &p.quads);
            VersionBody::Delta {
                added: quads
                    .iter()
                    .filter(|q| old.map_or(true, |o| !o.contains(*q)))
                    .cloned()
                    .collect(),
                removed: old
                    .map(|o| o.difference(&quads).cloned().collect())
                    .unwrap_or_default(),
            }
        };
        let record = VersionRecord {
            uri: uri.to_string(),
            version_id,
            parent_version_id: head.as_ref().map(|h| h.latest),
            timestamp,
            source_framework: merged.source_framework,
            metadata: merged.metadata.clone(),
            quad_count: quads.len(),
            content_hash: quad_set_hash(&quads)?,
            body,
        };

        self.kv
            .put(&version_key(uri, version_id), bincode::serialize(&record)?)?;
        self.kv.put(
            &head_key(uri),
            bincode::serialize(&HeadRecord {
                latest: version_id,
                timestamp,
            })?,
        )?;
        self.kv.flush()?;

        info!(
            uri = %uri,
            version = version_id,
            kind = ?record.kind(),
            quads = record.quad_count,
            carried = carried.len(),
            evicted = evicted.len(),
            "Committed agent version"
        );
        Ok(IngestReceipt {
            version_id,
            created: true,
            agent: merged,
            carried,
            evicted,
        })
    }

    pub fn get_at_version(
        &self,
        uri: &Iri,
        version: VersionId,
    ) -> Result<CanonicalAgent, StorageError> {
        self.snapshot_at(uri, version)?.to_agent()
    }

    /// Materialized quad set of one version
    pub fn snapshot_at(
        &self,
        uri: &Iri,
        version: VersionId,
    ) -> Result<VersionedSnapshot, StorageError> {
        let head = self
            .read_head(uri.as_str())?
            .ok_or_else(|| StorageError::AgentNotFound(uri.to_string()))?;
        if version == 0 || version > head.latest {
            return Err(StorageError::VersionNotFound {
                uri: uri.to_string(),
                version,
            });
        }
        self.reconstruct(uri.as_str(), version)
    }

    pub fn get_latest(&self, uri: &Iri) -> Result<CanonicalAgent, StorageError> {
        let head = self
            .read_head(uri.as_str())?
            .ok_or_else(|| StorageError::AgentNotFound(uri.to_string()))?;
        self.reconstruct(uri.as_str(), head.latest)?.to_agent()
    }

    pub fn latest_version(&self, uri: &Iri) -> Result<Option<VersionId>, StorageError> {
        Ok(self.read_head(uri.as_str())?.map(|h| h.latest))
    }

    /// Version summaries, oldest first
    pub fn history(&self, uri: &Iri) -> Result<Vec<VersionMetadata>, StorageError> {
        let head = self
            .read_head(uri.as_str())?
            .ok_or_else(|| StorageError::AgentNotFound(uri.to_string()))?;
        (1..=head.latest)
            .map(|v| self.read_record(uri.as_str(), v).map(|r| r.metadata()))
            .collect()
    }

    /// Export the full version chain of `uri`
    pub fn snapshot(&self, uri: &Iri) -> Result<Vec<u8>, StorageError> {
        let head = self
            .read_head(uri.as_str())?
            .ok_or_else(|| StorageError::AgentNotFound(uri.to_string()))?;
        let records = (1..=head.latest)
            .map(|v| self.read_record(uri.as_str(), v))
            .collect::<Result<Vec<_>, _>>()?;
        let archive = SnapshotArchive {
            format: ARCHIVE_FORMAT,
            uri: uri.to_string(),
            records,
        };
        Ok(bincode::serialize(&archive)?)
    }

    /// Import a chain exported by `snapshot` into a URI with no history
    pub fn restore(&self, uri: &Iri, blob: &[u8]) -> Result<VersionId, StorageError> {
        let archive: SnapshotArchive = bincode::deserialize(blob)
            .map_err(|e| StorageError::InvalidArchive(e.to_string()))?;
        let ontology = self.ontology();
        self.check_archive(&ontology, uri, &archive)?;

        self.locks
            .with_write_lock(uri.as_str(), || self.restore_locked(uri, &archive))
    }

    fn restore_locked(&self, uri: &Iri, archive: &SnapshotArchive) -> Result<VersionId, StorageError> {
        if self.read_head(uri.as_str())?.is_some() {
            return Err(StorageError::HistoryExists(uri.to_string()));
        }

        let mut last = None;
        for record in &archive.records {
            self.kv.put(
                &version_key(uri.as_str(), record.version_id),
                bincode::serialize(record)?,
            )?;
            last = Some((record.version_id, record.timestamp));
        }
        let (latest, timestamp) =
            last.ok_or_else(|| StorageError::InvalidArchive("archive is empty".to_string()))?;
        self.kv.put(
            &head_key(uri.as_str()),
            bincode::serialize(&HeadRecord { latest, timestamp })?,
        )?;
        self.kv.flush()?;
        info!(uri = %uri, versions = latest, "Restored agent history");
        Ok(latest)
    }

    /// Quads of the latest version of every agent that match `pattern`
    pub fn query(&self, pattern: &TriplePattern) -> Result<Vec<Quad>, StorageError> {
        let uris = match &pattern.subject {
            Some(subject) => vec![subject.clone()],
            None => self.uris()?,
        };
        let mut matches = Vec::new();
        for uri in uris {
            let Some(head) = self.read_head(uri.as_str())? else {
                continue;
            };
            let snapshot = self.reconstruct(uri.as_str(), head.latest)?;
            matches.extend(snapshot.quads.into_iter().filter(|q| pattern.matches(q)));
        }
        Ok(matches)
    }

    /// Every URI with at least one version
    pub fn uris(&self) -> Result<Vec<Iri>, StorageError> {
        Ok(self
            .kv
            .keys("agent/")?
            .iter()
            .filter_map(|key| uri_of_head_key(key))
            .map(|uri| Iri::new(uri))
            .collect())
    }

    fn check_quads<'a>(
        &self,
        ontology: &Ontology,
        uri: &Iri,
        quads: impl Iterator<Item = &'a Quad>,
    ) -> Result<(), StorageError> {
        for quad in quads {
            if quad.subject != *uri {
                return Err(StorageError::ForeignSubject {
                    uri: uri.to_string(),
                    subject: quad.subject.to_string(),
                });
            }
            ontology.validate_quad(quad)?;
        }
        Ok(())
    }

    fn check_archive(
        &self,
        ontology: &Ontology,
        uri: &Iri,
        archive: &SnapshotArchive,
    ) -> Result<(), StorageError> {
        let invalid = |reason: String| StorageError::InvalidArchive(reason);
        if archive.format != ARCHIVE_FORMAT {
            return Err(invalid(format!("unsupported format {}", archive.format)));
        }
        if archive.uri != uri.as_str() {
            return Err(invalid(format!("archive is for {}, not {}", archive.uri, uri)));
        }
        if archive.records.is_empty() {
            return Err(invalid("archive is empty".to_string()));
        }

        let mut quads: BTreeSet<Quad> = BTreeSet::new();
        let mut previous: Option<&VersionRecord> = None;
        for (index, record) in archive.records.iter().enumerate() {
            let expected = index as VersionId + 1;
            if record.uri != archive.uri || record.version_id != expected {
                return Err(invalid(format!("record {} is out of sequence", expected)));
            }
            if record.parent_version_id != previous.map(|p| p.version_id) {
                return Err(invalid(format!("record {} has a broken parent link", expected)));
            }
            if previous.map_or(false, |p| record.timestamp <= p.timestamp) {
                return Err(invalid(format!("record {} timestamp is not increasing", expected)));
            }
            match &record.body {
                VersionBody::Snapshot { quads: full } => quads = full.iter().cloned().collect(),
                VersionBody::Delta { .. } if previous.is_none() => {
                    return Err(invalid("chain does not start with a snapshot".to_string()));
                }
                VersionBody::Delta { added, removed } => apply_delta(&mut quads, added, removed),
            }
            self.check_quads(ontology, uri, quads.iter())?;
            if quad_set_hash(&quads)? != record.content_hash {
                return Err(invalid(format!("record {} content hash mismatch", expected)));
            }
            previous = Some(record);
        }
        Ok(())
    }

    fn read_head(&self, uri: &str) -> Result<Option<HeadRecord>, StorageError> {
        let key = head_key(uri);
        match self.kv.get(&key)? {
            Some(bytes) => decode(&key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn read_record(&self, uri: &str, version: VersionId) -> Result<VersionRecord, StorageError> {
        let key = version_key(uri, version);
        let bytes = self.kv.get(&key)?.ok_or_else(|| StorageError::Corrupt {
            key: key.clone(),
            reason: "version record missing below head".to_string(),
        })?;
        decode(&key, &bytes)
    }

    /// Walk back to the nearest snapshot, then replay deltas forward
    fn reconstruct(&self, uri: &str, version: VersionId) -> Result<VersionedSnapshot, StorageError> {
        let target = self.read_record(uri, version)?;
        let mut chain = Vec::new();
        let mut cursor = target.clone();
        let mut quads: BTreeSet<Quad> = loop {
            match cursor.body {
                VersionBody::Snapshot { quads } => break quads.into_iter().collect(),
                VersionBody::Delta { .. } => {
                    let parent = cursor.parent_version_id.ok_or_else(|| StorageError::Corrupt {
                        key: version_key(uri, cursor.version_id),
                        reason: "delta without parent".to_string(),
                    })?;
                    chain.push(cursor);
                    cursor = self.read_record(uri, parent)?;
                }
            }
        };
        for record in chain.into_iter().rev() {
            if let VersionBody::Delta { added, removed } = &record.body {
                apply_delta(&mut quads, added, removed);
            }
        }
        Ok(VersionedSnapshot {
            uri: Iri::new(uri),
            version_id: target.version_id,
            timestamp: target.timestamp,
            quads,
            parent_version_id: target.parent_version_id,
            source_framework: target.source_framework,
            metadata: target.metadata,
        })
    }
}

fn apply_delta(quads: &mut BTreeSet<Quad>, added: &[Quad], removed: &[Quad]) {
    for quad in removed {
        quads.remove(quad);
    }
    quads.extend(added.iter().cloned());
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StorageError> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Wall clock, nudged forward so timestamps strictly increase per URI
fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(previous) if now <= previous => previous + chrono::Duration::microseconds(1),
        _ => now,
    }
}
