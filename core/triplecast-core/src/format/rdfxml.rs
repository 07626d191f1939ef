//! RDF/XML serializer with plain and abbreviated output.
//!
//! Plain output emits one `rdf:Description` block per subject group.
//! Abbreviated output additionally promotes the subject's first `rdf:type`
//! to a typed node element, the way abbreviating writers render class
//! membership.

use crate::error::{EncodeError, EncodeResult};
use crate::model::{Graph, NamedNode, Object, Subject};
use crate::vocab::{owl, rdf, rdfs, xsd};
use std::collections::HashMap;
use std::io::Write;

/// RDF/XML serializer
#[derive(Debug, Clone, Default)]
pub struct RdfXmlSerializer {
    abbreviated: bool,
}

impl RdfXmlSerializer {
    /// Create a serializer producing plain `rdf:Description` output
    pub fn new() -> Self {
        Self { abbreviated: false }
    }

    /// Create a serializer producing abbreviated output
    pub fn abbreviated() -> Self {
        Self { abbreviated: true }
    }

    /// Serialize a graph to a byte buffer
    pub fn serialize(&self, graph: &Graph) -> EncodeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.serialize_to(graph, &mut out)?;
        Ok(out)
    }

    /// Serialize a graph to a writer
    pub fn serialize_to(&self, graph: &Graph, writer: &mut dyn Write) -> EncodeResult<()> {
        let mut nodes = Vec::new();
        for (subject, mut predicates) in super::group_by_subject(graph) {
            let type_element = if self.abbreviated {
                take_first_type(&mut predicates)
            } else {
                None
            };
            nodes.push((subject, type_element, predicates));
        }

        let mut namespaces = Namespaces::new();
        for (_, type_element, predicates) in &nodes {
            if let Some(type_iri) = type_element {
                namespaces.declare(type_iri.as_str())?;
            }
            for (predicate, _) in predicates {
                namespaces.declare(predicate.as_str())?;
            }
        }

        writeln!(writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        write!(writer, "<rdf:RDF xmlns:rdf=\"{}\"", rdf::NAMESPACE)?;
        for (namespace, prefix) in namespaces.declarations() {
            write!(writer, " xmlns:{prefix}=\"{}\"", escape_xml(namespace))?;
        }
        writeln!(writer, ">")?;

        for (subject, type_element, predicates) in &nodes {
            let element = match type_element {
                Some(type_iri) => namespaces.qname(type_iri.as_str())?,
                None => "rdf:Description".to_string(),
            };
            let about = match subject {
                Subject::NamedNode(n) => format!("rdf:about=\"{}\"", escape_xml(n.as_str())),
                Subject::BlankNode(b) => format!("rdf:nodeID=\"{}\"", escape_xml(b.as_str())),
            };

            if predicates.is_empty() {
                writeln!(writer, "  <{element} {about}/>")?;
                continue;
            }

            writeln!(writer, "  <{element} {about}>")?;
            for (predicate, objects) in predicates {
                let qname = namespaces.qname(predicate.as_str())?;
                for object in objects {
                    match object {
                        Object::NamedNode(n) => writeln!(
                            writer,
                            "    <{qname} rdf:resource=\"{}\"/>",
                            escape_xml(n.as_str())
                        )?,
                        Object::BlankNode(b) => writeln!(
                            writer,
                            "    <{qname} rdf:nodeID=\"{}\"/>",
                            escape_xml(b.as_str())
                        )?,
                        Object::Literal(literal) => {
                            if let Some(language) = literal.language() {
                                writeln!(
                                    writer,
                                    "    <{qname} xml:lang=\"{}\">{}</{qname}>",
                                    escape_xml(language),
                                    escape_xml(literal.value())
                                )?;
                            } else if let Some(datatype) = literal.datatype() {
                                writeln!(
                                    writer,
                                    "    <{qname} rdf:datatype=\"{}\">{}</{qname}>",
                                    escape_xml(datatype.as_str()),
                                    escape_xml(literal.value())
                                )?;
                            } else {
                                writeln!(
                                    writer,
                                    "    <{qname}>{}</{qname}>",
                                    escape_xml(literal.value())
                                )?;
                            }
                        }
                    }
                }
            }
            writeln!(writer, "  </{element}>")?;
        }

        writeln!(writer, "</rdf:RDF>")?;
        Ok(())
    }
}

/// Pull the first `rdf:type` object naming a splittable IRI out of the
/// predicate list, leaving any remaining type statements in place.
fn take_first_type(predicates: &mut Vec<(NamedNode, Vec<Object>)>) -> Option<NamedNode> {
    let index = predicates
        .iter()
        .position(|(predicate, _)| predicate.as_str() == rdf::TYPE)?;
    let position = predicates[index].1.iter().position(|object| {
        matches!(object, Object::NamedNode(n) if split_iri(n.as_str()).is_some())
    })?;
    let taken = match predicates[index].1.remove(position) {
        Object::NamedNode(n) => n,
        _ => return None,
    };
    if predicates[index].1.is_empty() {
        predicates.remove(index);
    }
    Some(taken)
}

/// Namespace prefix table: `rdf` is reserved, well-known namespaces keep
/// their conventional prefixes, everything else gets `ns0`, `ns1`, ...
struct Namespaces {
    prefixes: HashMap<String, String>,
    order: Vec<String>,
    next_generated: usize,
}

impl Namespaces {
    fn new() -> Self {
        Self {
            prefixes: HashMap::new(),
            order: Vec::new(),
            next_generated: 0,
        }
    }

    fn declare(&mut self, iri: &str) -> EncodeResult<()> {
        let (namespace, _) = split_iri(iri).ok_or_else(|| unsplittable(iri))?;
        if namespace == rdf::NAMESPACE || self.prefixes.contains_key(namespace) {
            return Ok(());
        }
        let prefix = match namespace {
            rdfs::NAMESPACE => "rdfs".to_string(),
            xsd::NAMESPACE => "xsd".to_string(),
            owl::NAMESPACE => "owl".to_string(),
            _ => {
                let generated = format!("ns{}", self.next_generated);
                self.next_generated += 1;
                generated
            }
        };
        self.prefixes.insert(namespace.to_string(), prefix);
        self.order.push(namespace.to_string());
        Ok(())
    }

    fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().map(|namespace| {
            let prefix = self
                .prefixes
                .get(namespace)
                .map(String::as_str)
                .unwrap_or_default();
            (namespace.as_str(), prefix)
        })
    }

    fn qname(&self, iri: &str) -> EncodeResult<String> {
        let (namespace, local) = split_iri(iri).ok_or_else(|| unsplittable(iri))?;
        if namespace == rdf::NAMESPACE {
            return Ok(format!("rdf:{local}"));
        }
        let prefix = self
            .prefixes
            .get(namespace)
            .ok_or_else(|| unsplittable(iri))?;
        Ok(format!("{prefix}:{local}"))
    }
}

fn unsplittable(iri: &str) -> EncodeError {
    EncodeError::invalid_data(format!(
        "cannot split IRI <{iri}> into a namespace and XML local name"
    ))
}

/// Split an IRI at the last `#`, `/`, or `:` such that the remainder is a
/// usable XML local name.
fn split_iri(iri: &str) -> Option<(&str, &str)> {
    let split = iri.rfind(['#', '/', ':'])?;
    let (namespace, local) = iri.split_at(split + 1);
    let mut chars = local.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_');
    if starts_ok && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        Some((namespace, local))
    } else {
        None
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
