//! RDF data model: terms, triples, and graphs.

mod graph;
mod term;

pub use graph::{Graph, Triple};
pub use term::{BlankNode, Literal, NamedNode, Object, Subject, TermError};

pub(crate) use term::escape_literal;
