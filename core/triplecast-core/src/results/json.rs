//! SPARQL Results JSON decoding and encoding.
//!
//! The decoder accepts both the W3C `"literal"` term type and the legacy
//! `"typed-literal"` spelling older stores emit.

use super::{CellValue, TabularResult};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use serde_json::{json, Map, Value};
use std::io::Write;

/// Decode a SPARQL Results JSON document into a tabular result.
pub fn decode_results_json(bytes: &[u8]) -> DecodeResult<TabularResult> {
    let document: Value = serde_json::from_slice(bytes)?;

    let vars = document
        .get("head")
        .and_then(|head| head.get("vars"))
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::structure("missing head.vars array"))?;
    let columns: Vec<String> = vars
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| DecodeError::structure("head.vars entries must be strings"))
        })
        .collect::<DecodeResult<_>>()?;

    let bindings = document
        .get("results")
        .and_then(|results| results.get("bindings"))
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::structure("missing results.bindings array"))?;

    let mut result = TabularResult::new(columns);
    for binding in bindings {
        let object = binding
            .as_object()
            .ok_or_else(|| DecodeError::structure("bindings entries must be objects"))?;
        let mut row = Vec::with_capacity(result.columns().len());
        for column in result.columns() {
            match object.get(column) {
                Some(term) => row.push(Some(decode_term(term)?)),
                None => row.push(None),
            }
        }
        result.push_row(row);
    }
    Ok(result)
}

fn decode_term(term: &Value) -> DecodeResult<CellValue> {
    let object = term
        .as_object()
        .ok_or_else(|| DecodeError::structure("binding terms must be objects"))?;
    let term_type = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::structure("binding term is missing its type"))?;
    let value = object
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::structure("binding term is missing its value"))?;

    match term_type {
        "uri" => Ok(CellValue::Uri(value.to_string())),
        "bnode" => Ok(CellValue::BlankNode(value.to_string())),
        "literal" | "typed-literal" => Ok(CellValue::Literal {
            value: value.to_string(),
            language: object
                .get("xml:lang")
                .and_then(Value::as_str)
                .map(str::to_string),
            datatype: object
                .get("datatype")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        other => Err(DecodeError::structure(format!(
            "unknown binding term type {other:?}"
        ))),
    }
}

/// SPARQL Results JSON serializer
pub struct JsonResultSerializer;

impl JsonResultSerializer {
    /// Serialize a tabular result to SPARQL Results JSON
    pub fn serialize<W: Write>(result: &TabularResult, writer: &mut W) -> EncodeResult<()> {
        let document = Self::to_json(result);
        serde_json::to_writer_pretty(&mut *writer, &document).map_err(std::io::Error::other)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Convert a tabular result to a JSON value
    pub fn to_json(result: &TabularResult) -> Value {
        let bindings: Vec<Value> = result
            .rows()
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for (column, cell) in result.columns().iter().zip(row) {
                    if let Some(cell) = cell {
                        object.insert(column.clone(), term_to_json(cell));
                    }
                }
                Value::Object(object)
            })
            .collect();

        json!({
            "head": {
                "vars": result.columns()
            },
            "results": {
                "bindings": bindings
            }
        })
    }
}

fn term_to_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Uri(uri) => json!({
            "type": "uri",
            "value": uri
        }),
        CellValue::BlankNode(label) => json!({
            "type": "bnode",
            "value": label
        }),
        CellValue::Literal {
            value,
            language,
            datatype,
        } => {
            let mut object = Map::new();
            object.insert("type".to_string(), Value::String("literal".to_string()));
            object.insert("value".to_string(), Value::String(value.clone()));
            if let Some(language) = language {
                object.insert("xml:lang".to_string(), Value::String(language.clone()));
            } else if let Some(datatype) = datatype {
                object.insert("datatype".to_string(), Value::String(datatype.clone()));
            }
            Value::Object(object)
        }
    }
}
