//! Canonical vocabulary constants.
//!
//! The fixed predicate set every adapter maps into, plus the reserved
//! namespaces used for extension data and graphs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical ontology namespace
pub const NAMESPACE: &str = "https://agent-bridge.dev/ontology/v1#";

/// Reserved namespace for unmapped framework data: `<ns><framework>/<path>`
pub const EXTENSION_NAMESPACE: &str = "https://agent-bridge.dev/ext/";

/// Graph every canonical statement is asserted in
pub const DEFAULT_GRAPH: &str = "urn:agent-bridge:graph:default";

/// Prefix of canonical agent URIs
pub const AGENT_URI_PREFIX: &str = "urn:agent:";

/// Version of the built-in vocabulary
pub const ONTOLOGY_VERSION: &str = "1.0.0";

// XSD / RDF datatypes
pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const JSON: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON";
}

/// Predicate grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredicateCategory {
    Identity,
    Capability,
    Execution,
    Memory,
    Protocol,
}

/// Canonical predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalPredicate {
    HasIdentity,
    HasName,
    HasDescription,
    HasRole,
    HasGoal,
    HasBackstory,
    HasInstructions,
    HasCapability,
    HasTool,
    AllowsDelegation,
    UsesModel,
    HasTemperature,
    HasMaxTokens,
    HasMemory,
    SupportsProtocol,
}

impl CanonicalPredicate {
    pub const ALL: [CanonicalPredicate; 15] = [
        CanonicalPredicate::HasIdentity,
        CanonicalPredicate::HasName,
        CanonicalPredicate::HasDescription,
        CanonicalPredicate::HasRole,
        CanonicalPredicate::HasGoal,
        CanonicalPredicate::HasBackstory,
        CanonicalPredicate::HasInstructions,
        CanonicalPredicate::HasCapability,
        CanonicalPredicate::HasTool,
        CanonicalPredicate::AllowsDelegation,
        CanonicalPredicate::UsesModel,
        CanonicalPredicate::HasTemperature,
        CanonicalPredicate::HasMaxTokens,
        CanonicalPredicate::HasMemory,
        CanonicalPredicate::SupportsProtocol,
    ];

    pub fn local_name(&self) -> &'static str {
        match self {
            CanonicalPredicate::HasIdentity => "hasIdentity",
            CanonicalPredicate::HasName => "hasName",
            CanonicalPredicate::HasDescription => "hasDescription",
            CanonicalPredicate::HasRole => "hasRole",
            CanonicalPredicate::HasGoal => "hasGoal",
            CanonicalPredicate::HasBackstory => "hasBackstory",
            CanonicalPredicate::HasInstructions => "hasInstructions",
            CanonicalPredicate::HasCapability => "hasCapability",
            CanonicalPredicate::HasTool => "hasTool",
            CanonicalPredicate::AllowsDelegation => "allowsDelegation",
            CanonicalPredicate::UsesModel => "usesModel",
            CanonicalPredicate::HasTemperature => "hasTemperature",
            CanonicalPredicate::HasMaxTokens => "hasMaxTokens",
            CanonicalPredicate::HasMemory => "hasMemory",
            CanonicalPredicate::SupportsProtocol => "supportsProtocol",
        }
    }

    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.local_name() == name)
    }

    pub fn iri(&self) -> String {
        format!("{}{}", NAMESPACE, self.local_name())
    }

    pub fn category(&self) -> PredicateCategory {
        match self {
            CanonicalPredicate::HasIdentity
            | CanonicalPredicate::HasName
            | CanonicalPredicate::HasDescription
            | CanonicalPredicate::HasRole
            | CanonicalPredicate::HasGoal
            | CanonicalPredicate::HasBackstory
            | CanonicalPredicate::HasInstructions => PredicateCategory::Identity,
            CanonicalPredicate::HasCapability
            | CanonicalPredicate::HasTool
            | CanonicalPredicate::AllowsDelegation => PredicateCategory::Capability,
            CanonicalPredicate::UsesModel
            | CanonicalPredicate::HasTemperature
            | CanonicalPredicate::HasMaxTokens => PredicateCategory::Execution,
            CanonicalPredicate::HasMemory => PredicateCategory::Memory,
            CanonicalPredicate::SupportsProtocol => PredicateCategory::Protocol,
        }
    }

    /// Multi-valued predicates carry one positioned literal per list item
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            CanonicalPredicate::HasCapability
                | CanonicalPredicate::HasTool
                | CanonicalPredicate::SupportsProtocol
        )
    }
}

impl fmt::Display for CanonicalPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.local_name())
    }
}
