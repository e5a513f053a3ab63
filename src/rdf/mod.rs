//! Quad Model
//!
//! The atomic `(subject, predicate, object, graph)` statement used for all
//! canonical storage. Predicates are typed: the fixed ontology vocabulary, the
//! reserved extension namespace, or a foreign IRI that the store will refuse.

pub mod pattern;
pub mod quad;
pub mod term;

pub use pattern::TriplePattern;
pub use quad::{ExtensionKey, Predicate, Quad};
pub use term::{Datatype, Iri, Literal, Term};
