//! W3C SPARQL Results XML serialization.

use super::{CellValue, TabularResult};
use crate::error::EncodeResult;
use std::io::Write;

/// SPARQL Results XML serializer
pub struct XmlResultSerializer;

impl XmlResultSerializer {
    /// Serialize a tabular result to the SPARQL Results XML format
    pub fn serialize<W: Write>(result: &TabularResult, writer: &mut W) -> EncodeResult<()> {
        writeln!(writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            writer,
            "<sparql xmlns=\"http://www.w3.org/2005/sparql-results#\">"
        )?;

        writeln!(writer, "  <head>")?;
        for column in result.columns() {
            writeln!(writer, "    <variable name=\"{}\"/>", escape_xml(column))?;
        }
        writeln!(writer, "  </head>")?;

        writeln!(writer, "  <results>")?;
        for row in result.rows() {
            writeln!(writer, "    <result>")?;
            for (column, cell) in result.columns().iter().zip(row) {
                if let Some(cell) = cell {
                    serialize_binding(writer, column, cell)?;
                }
            }
            writeln!(writer, "    </result>")?;
        }
        writeln!(writer, "  </results>")?;

        writeln!(writer, "</sparql>")?;
        Ok(())
    }
}

fn serialize_binding<W: Write>(writer: &mut W, column: &str, cell: &CellValue) -> EncodeResult<()> {
    let name = escape_xml(column);
    match cell {
        CellValue::Uri(uri) => writeln!(
            writer,
            "      <binding name=\"{name}\"><uri>{}</uri></binding>",
            escape_xml(uri)
        )?,
        CellValue::BlankNode(label) => writeln!(
            writer,
            "      <binding name=\"{name}\"><bnode>{}</bnode></binding>",
            escape_xml(label)
        )?,
        CellValue::Literal {
            value,
            language,
            datatype,
        } => {
            write!(writer, "      <binding name=\"{name}\">")?;
            if let Some(language) = language {
                write!(
                    writer,
                    "<literal xml:lang=\"{}\">{}</literal>",
                    escape_xml(language),
                    escape_xml(value)
                )?;
            } else if let Some(datatype) = datatype {
                write!(
                    writer,
                    "<literal datatype=\"{}\">{}</literal>",
                    escape_xml(datatype),
                    escape_xml(value)
                )?;
            } else {
                write!(writer, "<literal>{}</literal>", escape_xml(value))?;
            }
            writeln!(writer, "</binding>")?;
        }
    }
    Ok(())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_bindings() {
        let mut result = TabularResult::new(vec!["s".into(), "label".into()]);
        result.push_row(vec![
            Some(CellValue::Uri("http://example.org/a".into())),
            Some(CellValue::Literal {
                value: "A & B".into(),
                language: Some("en".into()),
                datatype: None,
            }),
        ]);
        result.push_row(vec![Some(CellValue::BlankNode("b0".into())), None]);

        let mut out = Vec::new();
        XmlResultSerializer::serialize(&result, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("<variable name=\"s\"/>"));
        assert!(text.contains("<variable name=\"label\"/>"));
        assert!(text.contains("<uri>http://example.org/a</uri>"));
        assert!(text.contains("<literal xml:lang=\"en\">A &amp; B</literal>"));
        assert!(text.contains("<bnode>b0</bnode>"));
        // unbound cells emit no binding element
        assert_eq!(text.matches("<binding name=\"label\"").count(), 1);
    }

    #[test]
    fn test_serialize_typed_literal() {
        let mut result = TabularResult::new(vec!["n".into()]);
        result.push_row(vec![Some(CellValue::typed_literal(
            "12",
            "http://www.w3.org/2001/XMLSchema#integer",
        ))]);

        let mut out = Vec::new();
        XmlResultSerializer::serialize(&result, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(
            "<literal datatype=\"http://www.w3.org/2001/XMLSchema#integer\">12</literal>"
        ));
    }
}
