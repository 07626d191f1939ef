//! Tabular (SELECT) query-result model and codecs.
//!
//! The backing service always streams conversions in the SPARQL Results
//! JSON format; [`decode_results_json`] turns that into a [`TabularResult`]
//! and the per-format serializers re-encode it for display.

mod csv;
mod json;
mod text;
mod xml;

pub use csv::CsvResultSerializer;
pub use json::{decode_results_json, JsonResultSerializer};
pub use text::TextResultSerializer;
pub use xml::XmlResultSerializer;

use crate::error::EncodeResult;

/// A typed result cell: URI resource, blank node, or literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Uri(String),
    BlankNode(String),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

impl CellValue {
    /// Plain literal constructor
    pub fn literal(value: impl Into<String>) -> Self {
        CellValue::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// Typed literal constructor
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        CellValue::Literal {
            value: value.into(),
            language: None,
            datatype: Some(datatype.into()),
        }
    }
}

/// A decoded tabular result: ordered columns, ordered rows, `None` cells
/// for unbound variables. Row width always equals the column count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularResult {
    columns: Vec<String>,
    rows: Vec<Vec<Option<CellValue>>>,
}

impl TabularResult {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the column count.
    pub fn push_row(&mut self, row: Vec<Option<CellValue>>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<CellValue>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Display serializations for tabular results; these are also the wire
/// formats a backend natively produces for SELECT queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultSyntax {
    Xml,
    Text,
    Csv,
    Json,
}

impl ResultSyntax {
    /// Canonical media type, used when asking a backend for this syntax.
    pub fn media_type(&self) -> &'static str {
        match self {
            ResultSyntax::Xml => "application/sparql-results+xml",
            ResultSyntax::Text => "text/plain",
            ResultSyntax::Csv => "text/csv",
            ResultSyntax::Json => "application/sparql-results+json",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResultSyntax::Xml => "XML",
            ResultSyntax::Text => "TEXT",
            ResultSyntax::Csv => "CSV",
            ResultSyntax::Json => "JSON",
        }
    }
}

impl std::fmt::Display for ResultSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialize a result in the requested display syntax. Column and row
/// order are always preserved; no serializer reorders or deduplicates.
pub fn encode_results(result: &TabularResult, syntax: ResultSyntax) -> EncodeResult<Vec<u8>> {
    let mut out = Vec::new();
    match syntax {
        ResultSyntax::Json => JsonResultSerializer::serialize(result, &mut out)?,
        ResultSyntax::Xml => XmlResultSerializer::serialize(result, &mut out)?,
        ResultSyntax::Csv => CsvResultSerializer::serialize(result, &mut out)?,
        ResultSyntax::Text => TextResultSerializer::serialize(result, &mut out)?,
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_types() {
        assert_eq!(ResultSyntax::Csv.media_type(), "text/csv");
        assert_eq!(
            ResultSyntax::Json.media_type(),
            "application/sparql-results+json"
        );
        assert_eq!(
            ResultSyntax::Xml.media_type(),
            "application/sparql-results+xml"
        );
    }

    #[test]
    fn test_tabular_result_accessors() {
        let mut result = TabularResult::new(vec!["a".into(), "b".into()]);
        assert!(result.is_empty());
        result.push_row(vec![Some(CellValue::literal("x")), None]);
        assert_eq!(result.len(), 1);
        assert_eq!(result.columns(), ["a", "b"]);
        assert_eq!(result.rows()[0][1], None);
    }
}
