//! Canonical Ontology
//!
//! A versioned, fixed predicate vocabulary plus the reserved extension
//! namespace. The ontology has no behavior beyond validation: the temporal
//! store consults [`Ontology::validate_quad`] before accepting any quad.
//!
//! The active predicate set is read once from a TOML document (or taken from
//! the built-in vocabulary) and never hot-swapped during a translation.

pub mod vocabulary;

use crate::error::{OntologyError, StorageError};
use crate::rdf::{Predicate, Quad};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use vocabulary::{CanonicalPredicate, NAMESPACE, ONTOLOGY_VERSION};

/// On-disk ontology document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyDocument {
    pub version: String,
    pub namespace: String,
    /// Local names of the predicates this version admits
    pub predicates: Vec<String>,
}

/// Loaded ontology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ontology {
    version: Version,
    predicates: BTreeSet<CanonicalPredicate>,
}

impl Ontology {
    /// The full built-in vocabulary
    pub fn builtin() -> Self {
        Self {
            version: Version::new(1, 0, 0),
            predicates: CanonicalPredicate::ALL.into_iter().collect(),
        }
    }

    pub fn from_document(document: &OntologyDocument) -> Result<Self, OntologyError> {
        if document.namespace != NAMESPACE {
            return Err(OntologyError::NamespaceMismatch {
                expected: NAMESPACE.to_string(),
                found: document.namespace.clone(),
            });
        }
        let version = Version::parse(&document.version).map_err(|e| {
            OntologyError::Parse(format!("Invalid version {}: {}", document.version, e))
        })?;
        let mut predicates = BTreeSet::new();
        for name in &document.predicates {
            let predicate = CanonicalPredicate::from_local_name(name)
                .ok_or_else(|| OntologyError::UnknownPredicate(name.clone()))?;
            predicates.insert(predicate);
        }
        Ok(Self {
            version,
            predicates,
        })
    }

    /// Parse a TOML ontology document
    pub fn parse(content: &str) -> Result<Self, OntologyError> {
        let document: OntologyDocument =
            toml::from_str(content).map_err(|e| OntologyError::Parse(e.to_string()))?;
        Self::from_document(&document)
    }

    /// Load an ontology document from disk
    pub fn load(path: &Path) -> Result<Self, OntologyError> {
        let content = std::fs::read_to_string(path).map_err(|e| OntologyError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let ontology = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            version = %ontology.version,
            predicates = ontology.predicates.len(),
            "Loaded ontology document"
        );
        Ok(ontology)
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn predicates(&self) -> impl Iterator<Item = CanonicalPredicate> + '_ {
        self.predicates.iter().copied()
    }

    /// Predicate-membership check: canonical members of this version or the extension namespace
    pub fn contains(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Canonical(p) => self.predicates.contains(p),
            Predicate::Extension(_) => true,
            Predicate::Foreign(_) => false,
        }
    }

    pub fn validate_quad(&self, quad: &Quad) -> Result<(), StorageError> {
        if self.contains(&quad.predicate) {
            Ok(())
        } else {
            Err(StorageError::InvalidPredicate {
                predicate: quad.predicate.iri(),
            })
        }
    }

    pub fn to_document(&self) -> OntologyDocument {
        OntologyDocument {
            version: self.version.to_string(),
            namespace: NAMESPACE.to_string(),
            predicates: self
                .predicates
                .iter()
                .map(|p| p.local_name().to_string())
                .collect(),
        }
    }
}

impl Default for Ontology {
    fn default() -> Self {
        Self::builtin()
    }
}
