//! Static format registries.
//!
//! Two registries drive dispatch: one for tabular (SELECT) results, one
//! for graph (CONSTRUCT/DESCRIBE) results. Each maps a symbolic format
//! name to its wire format, conversion flag, optional re-encoding target,
//! and response media type. Both are built once from fixed ordered lists
//! and are read-only afterwards, so unsynchronized concurrent lookups are
//! safe.

use std::collections::HashMap;
use std::sync::LazyLock;
use triplecast_core::format::{GraphEncoding, RdfSyntax};
use triplecast_core::results::ResultSyntax;

/// Registry entry for a tabular (SELECT) result format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularFormat {
    /// Registry key, matched exactly and case-sensitively
    pub name: &'static str,
    /// Whether the wire payload must be decoded and re-encoded
    pub conversion: bool,
    /// The serialization the backend is asked to produce
    pub wire: ResultSyntax,
    /// Response Content-Type
    pub media_type: &'static str,
}

/// Re-encoding hints a graph entry can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphTarget {
    Turtle,
    RdfXmlAbbrev,
}

/// Registry entry for a graph (CONSTRUCT/DESCRIBE) result format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphFormat {
    /// Registry key, matched exactly and case-sensitively
    pub name: &'static str,
    /// Whether the wire payload must be decoded and re-encoded
    pub conversion: bool,
    /// The serialization the backend is asked to produce
    pub wire: RdfSyntax,
    /// Re-encoding target; only meaningful when `conversion` is set
    pub target: Option<GraphTarget>,
    /// Response Content-Type
    pub media_type: &'static str,
}

impl GraphFormat {
    /// Resolve the serialization used on the conversion path. A missing
    /// target falls back to the wire syntax's own display form:
    /// N3/Turtle → Turtle, N-Triples → N-Triples, RDF-XML → plain RDF/XML.
    pub fn resolve_target(&self) -> GraphEncoding {
        match self.target {
            Some(GraphTarget::Turtle) => GraphEncoding::Turtle,
            Some(GraphTarget::RdfXmlAbbrev) => GraphEncoding::RdfXmlAbbrev,
            None => match self.wire {
                RdfSyntax::N3 | RdfSyntax::Turtle => GraphEncoding::Turtle,
                RdfSyntax::NTriples => GraphEncoding::NTriples,
                RdfSyntax::RdfXml => GraphEncoding::RdfXml,
            },
        }
    }
}

/// Tabular formats, in registry order
static TABULAR_FORMATS: [TabularFormat; 4] = [
    TabularFormat {
        name: "XML",
        conversion: false,
        wire: ResultSyntax::Xml,
        media_type: "text/xml",
    },
    TabularFormat {
        name: "TEXT",
        conversion: false,
        wire: ResultSyntax::Text,
        media_type: "text/plain",
    },
    TabularFormat {
        name: "CSV",
        conversion: false,
        wire: ResultSyntax::Csv,
        media_type: "text/csv",
    },
    TabularFormat {
        name: "JSON",
        conversion: false,
        wire: ResultSyntax::Json,
        media_type: "application/javascript",
    },
];

/// Graph formats, in registry order
static GRAPH_FORMATS: [GraphFormat; 6] = [
    GraphFormat {
        name: "RDF/XML",
        conversion: false,
        wire: RdfSyntax::RdfXml,
        target: None,
        media_type: "application/rdf+xml",
    },
    GraphFormat {
        name: "RDF/XML-ABBREV",
        conversion: true,
        wire: RdfSyntax::N3,
        target: Some(GraphTarget::RdfXmlAbbrev),
        media_type: "application/rdf+xml",
    },
    GraphFormat {
        name: "N3",
        conversion: false,
        wire: RdfSyntax::N3,
        target: None,
        media_type: "text/n3",
    },
    GraphFormat {
        name: "N-TRIPLE",
        conversion: false,
        wire: RdfSyntax::NTriples,
        target: None,
        media_type: "text/plain",
    },
    GraphFormat {
        name: "TTL",
        conversion: true,
        wire: RdfSyntax::N3,
        target: Some(GraphTarget::Turtle),
        media_type: "application/x-turtle",
    },
    // TODO: this entry has no target, so conversion falls back to Turtle
    // under a Turtle media type; emitting real JSON-LD needs a JSON-LD
    // serializer and a target pointing at it.
    GraphFormat {
        name: "JSON-LD",
        conversion: true,
        wire: RdfSyntax::N3,
        target: None,
        media_type: "application/x-turtle",
    },
];

static TABULAR_REGISTRY: LazyLock<HashMap<&'static str, &'static TabularFormat>> =
    LazyLock::new(|| TABULAR_FORMATS.iter().map(|f| (f.name, f)).collect());

static GRAPH_REGISTRY: LazyLock<HashMap<&'static str, &'static GraphFormat>> =
    LazyLock::new(|| GRAPH_FORMATS.iter().map(|f| (f.name, f)).collect());

/// Look up a tabular format by its exact name
pub fn lookup_tabular(name: &str) -> Option<&'static TabularFormat> {
    TABULAR_REGISTRY.get(name).copied()
}

/// Look up a graph format by its exact name
pub fn lookup_graph(name: &str) -> Option<&'static GraphFormat> {
    GRAPH_REGISTRY.get(name).copied()
}

/// Tabular format names, in registry order
pub fn tabular_names() -> Vec<&'static str> {
    TABULAR_FORMATS.iter().map(|f| f.name).collect()
}

/// Graph format names, in registry order
pub fn graph_names() -> Vec<&'static str> {
    GRAPH_FORMATS.iter().map(|f| f.name).collect()
}
