//! Quad patterns for store queries.

use crate::rdf::quad::{Predicate, Quad};
use crate::rdf::term::{Iri, Term};
use serde::{Deserialize, Serialize};

/// A pattern for matching quads, where None means "match any"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: Option<Iri>,
    pub predicate: Option<Predicate>,
    pub object: Option<Term>,
    pub graph: Option<Iri>,
}

impl TriplePattern {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: Iri) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    pub fn with_graph(mut self, graph: Iri) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn matches(&self, quad: &Quad) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == quad.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == quad.predicate)
            && self.object.as_ref().map_or(true, |o| *o == quad.object)
            && self.graph.as_ref().map_or(true, |g| *g == quad.graph)
    }
}
