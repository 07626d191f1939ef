//! Quoted-CSV serialization for converted tabular results.
//!
//! Every bound cell is quoted and embedded quotes are doubled, so a
//! round-trip through a CSV reader recovers the original strings exactly.
//! Unbound cells render as an empty, unquoted field. A literal typed
//! `xsd:anyURI` is percent-decoded before being written as a bare string.

use super::{CellValue, TabularResult};
use crate::error::{EncodeError, EncodeResult};
use crate::vocab::xsd;
use percent_encoding::percent_decode_str;
use std::io::Write;

/// Quoted-CSV serializer
pub struct CsvResultSerializer;

impl CsvResultSerializer {
    /// Serialize a tabular result as quoted CSV: a header row of column
    /// names followed by one newline-terminated row per solution.
    pub fn serialize<W: Write>(result: &TabularResult, writer: &mut W) -> EncodeResult<()> {
        let header: Vec<String> = result.columns().iter().map(|c| quote(c)).collect();
        writeln!(writer, "{}", header.join(","))?;

        for row in result.rows() {
            let fields: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(cell) => cell_text(cell).map(|text| quote(&text)),
                    None => Ok(String::new()),
                })
                .collect::<EncodeResult<_>>()?;
            writeln!(writer, "{}", fields.join(","))?;
        }
        Ok(())
    }
}

/// The bare string a cell renders as
fn cell_text(cell: &CellValue) -> EncodeResult<String> {
    match cell {
        CellValue::Uri(uri) => Ok(uri.clone()),
        CellValue::BlankNode(label) => Ok(label.clone()),
        CellValue::Literal {
            value, datatype, ..
        } => {
            if datatype.as_deref() == Some(xsd::ANY_URI) {
                let decoded = percent_decode_str(value).decode_utf8().map_err(|e| {
                    EncodeError::invalid_data(format!("anyURI cell is not valid UTF-8: {e}"))
                })?;
                Ok(decoded.into_owned())
            } else {
                Ok(value.clone())
            }
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(result: &TabularResult) -> String {
        let mut out = Vec::new();
        CsvResultSerializer::serialize(result, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Minimal RFC 4180 field reader used to check round-trips
    fn parse_fields(line: &str) -> Vec<Option<String>> {
        let mut fields = Vec::new();
        let mut chars = line.chars().peekable();
        loop {
            match chars.peek() {
                Some('"') => {
                    chars.next();
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('"') if chars.peek() == Some(&'"') => {
                                chars.next();
                                field.push('"');
                            }
                            Some('"') => break,
                            Some(c) => field.push(c),
                            None => panic!("unterminated field"),
                        }
                    }
                    fields.push(Some(field));
                    if chars.next().is_none() {
                        return fields;
                    }
                }
                Some(_) | None => {
                    // unquoted (empty) field
                    let mut skipped = false;
                    while let Some(&c) = chars.peek() {
                        if c == ',' {
                            break;
                        }
                        chars.next();
                        skipped = true;
                    }
                    assert!(!skipped, "non-empty unquoted field");
                    fields.push(None);
                    if chars.next().is_none() {
                        return fields;
                    }
                }
            }
        }
    }

    #[test]
    fn test_header_and_rows() {
        let mut result = TabularResult::new(vec!["name".into(), "home".into()]);
        result.push_row(vec![
            Some(CellValue::literal("Alice")),
            Some(CellValue::Uri("http://example.org/alice".into())),
        ]);
        result.push_row(vec![Some(CellValue::BlankNode("b0".into())), None]);

        let text = serialize(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "\"name\",\"home\"");
        assert_eq!(lines[1], "\"Alice\",\"http://example.org/alice\"");
        assert_eq!(lines[2], "\"b0\",");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_embedded_quotes_roundtrip() {
        let original = "she said \"hi\", twice";
        let mut result = TabularResult::new(vec!["v".into()]);
        result.push_row(vec![Some(CellValue::literal(original))]);

        let text = serialize(&result);
        let data_line = text.lines().nth(1).unwrap();
        let fields = parse_fields(data_line);
        assert_eq!(fields, vec![Some(original.to_string())]);
    }

    #[test]
    fn test_any_uri_is_percent_decoded() {
        let mut result = TabularResult::new(vec!["link".into()]);
        result.push_row(vec![Some(CellValue::typed_literal(
            "http%3A%2F%2Fexample.org%2Fa%20b",
            xsd::ANY_URI,
        ))]);

        let text = serialize(&result);
        assert!(text.contains("\"http://example.org/a b\""));
    }

    #[test]
    fn test_unbound_cell_is_empty_field() {
        let mut result = TabularResult::new(vec!["a".into(), "b".into(), "c".into()]);
        result.push_row(vec![None, Some(CellValue::literal("x")), None]);

        let text = serialize(&result);
        assert_eq!(text.lines().nth(1).unwrap(), ",\"x\",");
    }
}
