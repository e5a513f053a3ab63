//! Quads and typed predicates.

use crate::canonical::FieldPath;
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::{CanonicalPredicate, DEFAULT_GRAPH, EXTENSION_NAMESPACE, NAMESPACE};
use crate::rdf::term::{Iri, Term};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of an extension property: the producing framework plus its field path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExtensionKey {
    pub framework: AgentFramework,
    pub field_path: FieldPath,
}

impl fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.framework, self.field_path)
    }
}

/// Predicate position of a quad
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Predicate {
    /// Member of the fixed canonical vocabulary
    Canonical(CanonicalPredicate),
    /// Framework-specific escape data under the extension namespace
    Extension(ExtensionKey),
    /// Any other IRI; never accepted by the store
    Foreign(Iri),
}

impl Predicate {
    pub fn extension(framework: AgentFramework, field_path: FieldPath) -> Self {
        Predicate::Extension(ExtensionKey {
            framework,
            field_path,
        })
    }

    /// Full IRI form
    pub fn iri(&self) -> String {
        match self {
            Predicate::Canonical(p) => p.iri(),
            Predicate::Extension(key) => format!(
                "{}{}/{}",
                EXTENSION_NAMESPACE,
                key.framework,
                percent_encode(&key.field_path.to_string())
            ),
            Predicate::Foreign(iri) => iri.to_string(),
        }
    }

    /// Classify a raw IRI
    pub fn from_iri(iri: &str) -> Self {
        if let Some(local) = iri.strip_prefix(NAMESPACE) {
            if let Some(p) = CanonicalPredicate::from_local_name(local) {
                return Predicate::Canonical(p);
            }
        }
        if let Some(rest) = iri.strip_prefix(EXTENSION_NAMESPACE) {
            if let Some(key) = parse_extension(rest) {
                return Predicate::Extension(key);
            }
        }
        Predicate::Foreign(Iri::new(iri))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iri())
    }
}

fn parse_extension(rest: &str) -> Option<ExtensionKey> {
    let (framework, encoded) = rest.split_once('/')?;
    let framework = framework.parse().ok()?;
    let field_path = percent_decode(encoded)?.parse().ok()?;
    Some(ExtensionKey {
        framework,
        field_path,
    })
}

fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

fn percent_decode(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// RDF quad: immutable, structurally compared, totally ordered
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Iri,
    pub predicate: Predicate,
    pub object: Term,
    pub graph: Iri,
}

impl Quad {
    /// Quad in the default graph
    pub fn new(subject: Iri, predicate: Predicate, object: Term) -> Self {
        Self::in_graph(subject, predicate, object, Iri::new(DEFAULT_GRAPH))
    }

    pub fn in_graph(subject: Iri, predicate: Predicate, object: Term, graph: Iri) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }
}

impl fmt::Display for Quad {
    /// N-Quads style rendering
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}> <{}> {} <{}> .",
            self.subject, self.predicate, self.object, self.graph
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::term::Literal;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality_and_hash() {
        let a = Quad::new(
            Iri::new("urn:agent:ada"),
            Predicate::Canonical(CanonicalPredicate::HasName),
            Term::Literal(Literal::string("Ada")),
        );
        let b = a.clone();
        assert_eq!(a, b);
        let set: HashSet<Quad> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_canonical_predicate_iri_round_trip() {
        for p in CanonicalPredicate::ALL {
            let predicate = Predicate::Canonical(p);
            assert_eq!(Predicate::from_iri(&predicate.iri()), predicate);
        }
    }

    #[test]
    fn test_extension_predicate_iri_round_trip() {
        let predicate = Predicate::extension(
            AgentFramework::Usa,
            FieldPath::new(vec!["custom field".to_string(), "a.b".to_string()]),
        );
        let iri = predicate.iri();
        assert!(iri.starts_with("https://agent-bridge.dev/ext/usa/"));
        assert!(!iri.contains(' '));
        assert_eq!(Predicate::from_iri(&iri), predicate);
    }

    #[test]
    fn test_unknown_iris_are_foreign() {
        assert!(matches!(
            Predicate::from_iri("http://xmlns.com/foaf/0.1/name"),
            Predicate::Foreign(_)
        ));
        assert!(matches!(
            Predicate::from_iri("https://agent-bridge.dev/ontology/v1#hasFavouriteColour"),
            Predicate::Foreign(_)
        ));
        assert!(matches!(
            Predicate::from_iri("https://agent-bridge.dev/ext/smolagents/x"),
            Predicate::Foreign(_)
        ));
    }
}
