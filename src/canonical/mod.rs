//! Canonical agent representation.
//!
//! A [`CanonicalAgent`] is the framework-neutral form every adapter lifts into
//! and lowers from. Ontology statements live in a quad set; framework-specific
//! leftovers are kept as a sorted list of [`ExtensionProperty`] values and only
//! become extension-namespace quads when persisted.

pub mod path;

pub use path::FieldPath;

use crate::error::StorageError;
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::{CanonicalPredicate, AGENT_URI_PREFIX};
use crate::rdf::{ExtensionKey, Iri, Literal, Predicate, Quad, Term};
use crate::types::content_hash_hex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Provenance metadata keys attached by `to_canonical`
pub mod provenance {
    pub const CONTENT_HASH: &str = "provenance.content_hash";
    pub const SOURCE_FRAMEWORK: &str = "provenance.source_framework";
    pub const SOURCE_VERSION: &str = "provenance.source_version";
    pub const ONTOLOGY_VERSION: &str = "provenance.ontology_version";
}

/// Native metadata key recording the canonical URI a document was lowered from
pub const CANONICAL_URI_KEY: &str = "canonical.uri";

/// Prefix of canonical metadata copied from the source document's native metadata
pub const NATIVE_METADATA_PREFIX: &str = "native.";

/// Canonical URI recorded by an earlier lowering, if it is an agent URI
pub fn carried_uri(metadata: &BTreeMap<String, String>) -> Option<Iri> {
    metadata
        .get(CANONICAL_URI_KEY)
        .filter(|uri| {
            uri.strip_prefix(AGENT_URI_PREFIX)
                .map_or(false, |slug| !slug.is_empty())
        })
        .map(|uri| Iri::new(uri.as_str()))
}

/// A framework-specific field with no ontology mapping, carried verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionProperty {
    pub framework: AgentFramework,
    pub field_path: FieldPath,
    pub value: Value,
}

impl ExtensionProperty {
    pub fn new(framework: AgentFramework, field_path: FieldPath, value: Value) -> Self {
        Self {
            framework,
            field_path,
            value,
        }
    }

    pub fn key(&self) -> ExtensionKey {
        ExtensionKey {
            framework: self.framework,
            field_path: self.field_path.clone(),
        }
    }

    /// Serialized size of the value, used for accumulation limits
    pub fn encoded_len(&self) -> usize {
        self.value.to_string().len()
    }

    fn to_quad(&self, subject: &Iri) -> Quad {
        Quad::new(
            subject.clone(),
            Predicate::Extension(self.key()),
            Term::Literal(Literal::from_json(&self.value)),
        )
    }
}

/// Framework-neutral agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalAgent {
    pub uri: Iri,
    /// Ontology statements about `uri`
    pub quads: BTreeSet<Quad>,
    pub source_framework: AgentFramework,
    /// Sorted by key, at most one entry per key
    pub extensions: Vec<ExtensionProperty>,
    pub metadata: BTreeMap<String, String>,
}

impl CanonicalAgent {
    pub fn new(uri: Iri, source_framework: AgentFramework) -> Self {
        Self {
            uri,
            quads: BTreeSet::new(),
            source_framework,
            extensions: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Assert a JSON value under a canonical predicate
    ///
    /// Arrays become one positioned literal per item; an empty array is kept as
    /// a single JSON literal so it survives the round trip.
    pub fn set_value(&mut self, predicate: CanonicalPredicate, value: &Value) {
        self.remove_predicate(predicate);
        match value {
            Value::Array(items) if !items.is_empty() => {
                for (position, item) in items.iter().enumerate() {
                    self.insert(predicate, Literal::item(item, position as u32));
                }
            }
            other => self.insert(predicate, Literal::from_json(other)),
        }
    }

    pub fn insert(&mut self, predicate: CanonicalPredicate, literal: Literal) {
        self.quads.insert(Quad::new(
            self.uri.clone(),
            Predicate::Canonical(predicate),
            Term::Literal(literal),
        ));
    }

    fn remove_predicate(&mut self, predicate: CanonicalPredicate) {
        let target = Predicate::Canonical(predicate);
        self.quads.retain(|q| q.predicate != target);
    }

    pub fn has(&self, predicate: CanonicalPredicate) -> bool {
        let target = Predicate::Canonical(predicate);
        self.quads.iter().any(|q| q.predicate == target)
    }

    /// Decode the value asserted under `predicate`
    ///
    /// Positioned literals are reassembled into an array ordered by position.
    pub fn value(&self, predicate: CanonicalPredicate) -> Result<Option<Value>, serde_json::Error> {
        let target = Predicate::Canonical(predicate);
        let mut literals: Vec<&Literal> = self
            .quads
            .iter()
            .filter(|q| q.predicate == target && q.subject == self.uri)
            .filter_map(|q| q.object.as_literal())
            .collect();
        if literals.is_empty() {
            return Ok(None);
        }
        if literals.iter().any(|l| l.position.is_some()) {
            literals.sort_by_key(|l| l.position);
            let items = literals
                .into_iter()
                .filter(|l| l.position.is_some())
                .map(Literal::to_json)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Some(Value::Array(items)));
        }
        literals[0].to_json().map(Some)
    }

    /// Insert or replace an extension, keeping the list sorted by key
    pub fn put_extension(&mut self, extension: ExtensionProperty) {
        let key = extension.key();
        match self.extensions.binary_search_by(|e| e.key().cmp(&key)) {
            Ok(index) => self.extensions[index] = extension,
            Err(index) => self.extensions.insert(index, extension),
        }
    }

    pub fn extension(&self, key: &ExtensionKey) -> Option<&ExtensionProperty> {
        self.extensions
            .binary_search_by(|e| e.key().cmp(key))
            .ok()
            .map(|index| &self.extensions[index])
    }

    pub fn extensions_for(
        &self,
        framework: AgentFramework,
    ) -> impl Iterator<Item = &ExtensionProperty> + '_ {
        self.extensions
            .iter()
            .filter(move |e| e.framework == framework)
    }

    /// Ontology quads plus materialized extension quads
    pub fn all_quads(&self) -> BTreeSet<Quad> {
        let mut quads = self.quads.clone();
        quads.extend(self.extensions.iter().map(|e| e.to_quad(&self.uri)));
        quads
    }

    /// Rebuild an agent from a persisted quad set
    pub fn from_quads(
        uri: Iri,
        source_framework: AgentFramework,
        quads: impl IntoIterator<Item = Quad>,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self, StorageError> {
        let mut agent = Self::new(uri, source_framework);
        agent.metadata = metadata;
        for quad in quads {
            match &quad.predicate {
                Predicate::Extension(key) => {
                    let literal = quad.object.as_literal().ok_or_else(|| StorageError::Corrupt {
                        key: key.to_string(),
                        reason: "extension object is not a literal".to_string(),
                    })?;
                    let value = literal.to_json().map_err(|e| StorageError::Corrupt {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })?;
                    agent.put_extension(ExtensionProperty::new(
                        key.framework,
                        key.field_path.clone(),
                        value,
                    ));
                }
                _ => {
                    agent.quads.insert(quad);
                }
            }
        }
        Ok(agent)
    }

    pub fn content_hash(&self) -> Option<&str> {
        self.metadata.get(provenance::CONTENT_HASH).map(String::as_str)
    }
}

/// Pre/post translation wrapper around a framework's own schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeAgent {
    pub framework: AgentFramework,
    pub data: Value,
    pub version: semver::Version,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl NativeAgent {
    pub fn new(framework: AgentFramework, data: Value, version: semver::Version) -> Self {
        Self {
            framework,
            data,
            version,
            metadata: BTreeMap::new(),
        }
    }
}

/// Lowercase `raw`, collapsing every run of non-alphanumerics into `-`
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Derive the stable canonical URI of an agent
///
/// Identity field first, then name, then a content hash of the whole document.
pub fn agent_uri(identity: Option<&str>, name: Option<&str>, data: &Value) -> Iri {
    let slug = [identity, name]
        .into_iter()
        .flatten()
        .map(slugify)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| {
            let hash = content_hash_hex(data.to_string().as_bytes());
            format!("anon-{}", &hash[..16])
        });
    Iri::new(format!("{}{}", AGENT_URI_PREFIX, slug))
}
