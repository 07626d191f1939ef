//! Graph wire-format codecs.
//!
//! Decoding turns backend wire bytes into a [`Graph`]; encoding serializes
//! a graph into a display format. N3 payloads are parsed with the Turtle
//! grammar (N3 is treated as its Turtle subset).

mod ntriples;
mod rdfxml;
mod turtle;

pub use ntriples::{NTriplesParser, NTriplesSerializer};
pub use rdfxml::RdfXmlSerializer;
pub use turtle::{TurtleParser, TurtleSerializer};

use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::model::{Graph, NamedNode, Object, Subject};
use std::collections::HashMap;

/// Wire-level graph serializations a backend natively produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfSyntax {
    RdfXml,
    N3,
    Turtle,
    NTriples,
}

impl RdfSyntax {
    /// Canonical media type, used when asking a backend for this syntax.
    pub fn media_type(&self) -> &'static str {
        match self {
            RdfSyntax::RdfXml => "application/rdf+xml",
            RdfSyntax::N3 => "text/n3",
            RdfSyntax::Turtle => "text/turtle",
            RdfSyntax::NTriples => "application/n-triples",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RdfSyntax::RdfXml => "RDF/XML",
            RdfSyntax::N3 => "N3",
            RdfSyntax::Turtle => "Turtle",
            RdfSyntax::NTriples => "N-Triples",
        }
    }
}

impl std::fmt::Display for RdfSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializations a decoded graph can be re-encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphEncoding {
    Turtle,
    NTriples,
    RdfXml,
    RdfXmlAbbrev,
}

/// Decode a graph wire payload.
///
/// Only the syntaxes a conversion path is ever configured with have
/// decoders; the rest report a clean unsupported-syntax error instead of
/// guessing.
pub fn decode_graph(bytes: &[u8], syntax: RdfSyntax) -> DecodeResult<Graph> {
    let graph = match syntax {
        RdfSyntax::N3 | RdfSyntax::Turtle => TurtleParser::new().parse_slice(bytes)?,
        RdfSyntax::NTriples => NTriplesParser::new().parse_slice(bytes)?,
        RdfSyntax::RdfXml => {
            return Err(DecodeError::unsupported(
                "no decoder is wired for RDF/XML payloads",
            ))
        }
    };
    tracing::debug!(%syntax, statements = graph.len(), "decoded graph payload");
    Ok(graph)
}

/// Serialize a graph into the requested display encoding.
pub fn encode_graph(graph: &Graph, encoding: GraphEncoding) -> EncodeResult<Vec<u8>> {
    let payload = match encoding {
        GraphEncoding::Turtle => TurtleSerializer::new().serialize(graph)?,
        GraphEncoding::NTriples => NTriplesSerializer::new().serialize(graph)?,
        GraphEncoding::RdfXml => RdfXmlSerializer::new().serialize(graph)?,
        GraphEncoding::RdfXmlAbbrev => RdfXmlSerializer::abbreviated().serialize(graph)?,
    };
    tracing::debug!(?encoding, bytes = payload.len(), "encoded graph payload");
    Ok(payload)
}

/// Group statements by subject, then by predicate, preserving first-seen
/// order at both levels. Serializers that emit subject blocks share this.
pub(crate) fn group_by_subject(graph: &Graph) -> Vec<(Subject, Vec<(NamedNode, Vec<Object>)>)> {
    let mut groups: Vec<(Subject, Vec<(NamedNode, Vec<Object>)>)> = Vec::new();
    let mut subject_index: HashMap<Subject, usize> = HashMap::new();

    for triple in graph {
        let slot = match subject_index.get(triple.subject()) {
            Some(&i) => i,
            None => {
                subject_index.insert(triple.subject().clone(), groups.len());
                groups.push((triple.subject().clone(), Vec::new()));
                groups.len() - 1
            }
        };
        let predicates = &mut groups[slot].1;
        match predicates
            .iter_mut()
            .find(|(p, _)| p == triple.predicate())
        {
            Some((_, objects)) => objects.push(triple.object().clone()),
            None => predicates.push((triple.predicate().clone(), vec![triple.object().clone()])),
        }
    }
    groups
}
