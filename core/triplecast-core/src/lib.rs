//! # Triplecast Core
//!
//! RDF term model and serialization codecs shared by the Triplecast
//! query endpoint.
//!
//! This crate provides the pieces the endpoint's dispatch layer routes
//! bytes through:
//!
//! - An RDF term, triple, and graph model
//! - Graph wire codecs (Turtle/N3, N-Triples, RDF/XML)
//! - Tabular query-result model with the SPARQL Results JSON decoder and
//!   display encoders (JSON, XML, text table, quoted CSV)
//! - A chunked stream-copy helper for pass-through responses

pub mod error;
pub mod format;
pub mod io;
pub mod model;
pub mod results;
pub mod vocab;

pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult, TextPosition};
pub use model::{BlankNode, Graph, Literal, NamedNode, Object, Subject, Triple};

/// Version information for Triplecast Core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
