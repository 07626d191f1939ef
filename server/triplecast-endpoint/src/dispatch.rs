//! Query dispatch: the format-routing engine.
//!
//! A request is classified once by result shape, a strategy is selected
//! once from the shape and the registry entry's conversion flag, and the
//! strategy then runs to completion. The closed strategy set:
//!
//! - boolean literal: ASK queries write `true`/`false` as plain text and
//!   never consult a registry
//! - stream-through: the backend's wire bytes are copied to the response
//!   unmodified (the preferred, zero-copy path)
//! - decode-encode: the wire payload is decoded into the in-memory
//!   representation and re-encoded into the display format
//!
//! Every branch sets the response content type exactly once, before any
//! body byte, and performs exactly one body write sequence. Nothing is
//! retried; failures propagate to the boundary.

use crate::backend::{BackendError, GraphShape, QueryBackend};
use crate::registry::{lookup_graph, lookup_tabular, GraphFormat, TabularFormat};
use crate::sink::ResponseSink;
use std::io::{Read, Write};
use tracing::debug;
use triplecast_core::error::{DecodeError, EncodeError};
use triplecast_core::format::{decode_graph, encode_graph};
use triplecast_core::io::copy_stream;
use triplecast_core::results::{decode_results_json, encode_results, ResultSyntax};

/// The structural kind of a query's result, derived once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    Select,
    Ask,
    Construct,
    Describe,
}

impl QueryShape {
    /// Classify a query by its first meaningful keyword, skipping
    /// comments and any `PREFIX`/`BASE` prologue. Returns `None` when the
    /// text is not one of the four query forms.
    pub fn classify(query: &str) -> Option<QueryShape> {
        let tokens = tokenize_prologue(query);
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            if keyword(token, "SELECT") {
                return Some(QueryShape::Select);
            }
            if keyword(token, "ASK") {
                return Some(QueryShape::Ask);
            }
            if keyword(token, "CONSTRUCT") {
                return Some(QueryShape::Construct);
            }
            if keyword(token, "DESCRIBE") {
                return Some(QueryShape::Describe);
            }
            if keyword(token, "PREFIX") || keyword(token, "BASE") {
                // skip the declaration through its closing IRI
                index += 1;
                while index < tokens.len() && !tokens[index].ends_with('>') {
                    index += 1;
                }
                index += 1;
                continue;
            }
            return None;
        }
        None
    }
}

/// Whitespace-split tokens with comments removed; `#` inside an IRI
/// reference does not start a comment.
fn tokenize_prologue(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_iri = false;
    let mut chars = query.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                in_iri = true;
                current.push(c);
            }
            '>' => {
                in_iri = false;
                current.push(c);
            }
            '#' if !in_iri => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// True when `token` starts with the keyword followed by nothing or a
/// non-name character (`ASK{...}` matches, `ASKED` does not).
fn keyword(token: &str, word: &str) -> bool {
    if token.len() < word.len() || !token.is_char_boundary(word.len()) {
        return false;
    }
    let (head, tail) = token.split_at(word.len());
    head.eq_ignore_ascii_case(word)
        && tail
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric() && c != '_')
}

/// Dispatch failure taxonomy. `FormatNotFound` reaching this layer is a
/// caller-contract violation, not a user error; validation happens
/// upstream.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("result format {0:?} is not registered")]
    FormatNotFound(String),
    #[error("backend query failed: {0}")]
    Backend(#[from] BackendError),
    #[error("failed to decode wire payload: {0}")]
    Decode(#[from] DecodeError),
    #[error("failed to encode response payload: {0}")]
    Encode(#[from] EncodeError),
    #[error("I/O error while writing response: {0}")]
    Io(#[from] std::io::Error),
}

/// The handler selected for a request, one of the closed strategy set
/// paired with the registry entry it operates on.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    BooleanLiteral,
    StreamTabular(&'static TabularFormat),
    ConvertTabular(&'static TabularFormat),
    StreamGraph(GraphShape, &'static GraphFormat),
    ConvertGraph(GraphShape, &'static GraphFormat),
}

/// Select the strategy for `(shape, conversion flag)`. ASK never touches
/// either registry.
fn select_strategy(
    shape: QueryShape,
    tabular_format: &str,
    graph_format: &str,
) -> Result<Strategy, DispatchError> {
    match shape {
        QueryShape::Ask => Ok(Strategy::BooleanLiteral),
        QueryShape::Select => {
            let config = lookup_tabular(tabular_format)
                .ok_or_else(|| DispatchError::FormatNotFound(tabular_format.to_string()))?;
            if config.conversion {
                Ok(Strategy::ConvertTabular(config))
            } else {
                Ok(Strategy::StreamTabular(config))
            }
        }
        QueryShape::Construct | QueryShape::Describe => {
            let graph_shape = match shape {
                QueryShape::Describe => GraphShape::Describe,
                _ => GraphShape::Construct,
            };
            let config = lookup_graph(graph_format)
                .ok_or_else(|| DispatchError::FormatNotFound(graph_format.to_string()))?;
            if config.conversion {
                Ok(Strategy::ConvertGraph(graph_shape, config))
            } else {
                Ok(Strategy::StreamGraph(graph_shape, config))
            }
        }
    }
}

/// Execute a classified query and write the response to the sink.
pub fn dispatch(
    query: &str,
    shape: QueryShape,
    tabular_format: &str,
    graph_format: &str,
    backend: &dyn QueryBackend,
    sink: &mut dyn ResponseSink,
) -> Result<(), DispatchError> {
    let strategy = select_strategy(shape, tabular_format, graph_format)?;
    debug!(?shape, ?strategy, "dispatching query");

    match strategy {
        Strategy::BooleanLiteral => run_boolean(query, backend, sink),
        Strategy::StreamTabular(config) => stream_tabular(query, config, backend, sink),
        Strategy::ConvertTabular(config) => convert_tabular(query, config, backend, sink),
        Strategy::StreamGraph(shape, config) => stream_graph(query, shape, config, backend, sink),
        Strategy::ConvertGraph(shape, config) => convert_graph(query, shape, config, backend, sink),
    }
}

/// ASK: write the boolean as a plain-text literal, irrespective of any
/// requested format.
fn run_boolean(
    query: &str,
    backend: &dyn QueryBackend,
    sink: &mut dyn ResponseSink,
) -> Result<(), DispatchError> {
    let value = backend.ask_query(query)?;
    sink.set_content_type("text/plain");
    sink.body()
        .write_all(if value { b"true" } else { b"false" })?;
    Ok(())
}

fn stream_tabular(
    query: &str,
    config: &TabularFormat,
    backend: &dyn QueryBackend,
    sink: &mut dyn ResponseSink,
) -> Result<(), DispatchError> {
    let mut results = backend.select_query(query, config.wire)?;
    sink.set_content_type(config.media_type);
    copy_stream(&mut *results, sink.body())?;
    Ok(())
}

fn convert_tabular(
    query: &str,
    config: &TabularFormat,
    backend: &dyn QueryBackend,
    sink: &mut dyn ResponseSink,
) -> Result<(), DispatchError> {
    // conversions always fetch the canonical JSON interchange format,
    // whatever the display target
    let mut results = backend.select_query(query, ResultSyntax::Json)?;
    let mut wire = Vec::new();
    results.read_to_end(&mut wire)?;

    let table = decode_results_json(&wire)?;
    let payload = encode_results(&table, config.wire)?;

    sink.set_content_type(config.media_type);
    sink.body().write_all(&payload)?;
    Ok(())
}

fn stream_graph(
    query: &str,
    shape: GraphShape,
    config: &GraphFormat,
    backend: &dyn QueryBackend,
    sink: &mut dyn ResponseSink,
) -> Result<(), DispatchError> {
    let mut results = backend.graph_query(query, shape, config.wire)?;
    sink.set_content_type(config.media_type);
    copy_stream(&mut *results, sink.body())?;
    Ok(())
}

fn convert_graph(
    query: &str,
    shape: GraphShape,
    config: &GraphFormat,
    backend: &dyn QueryBackend,
    sink: &mut dyn ResponseSink,
) -> Result<(), DispatchError> {
    let mut results = backend.graph_query(query, shape, config.wire)?;
    let mut wire = Vec::new();
    results.read_to_end(&mut wire)?;

    let graph = decode_graph(&wire, config.wire)?;
    let payload = encode_graph(&graph, config.resolve_target())?;

    sink.set_content_type(config.media_type);
    sink.body().write_all(&payload)?;
    Ok(())
}
