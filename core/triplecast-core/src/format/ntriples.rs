//! N-Triples parser and serializer.
//!
//! N-Triples is one triple per line; the parser works line-by-line and the
//! serializer reuses the terms' N-Triples `Display` forms.

use crate::error::{DecodeError, DecodeResult, EncodeResult, TextPosition};
use crate::model::{BlankNode, Graph, Literal, NamedNode, Object, Subject, Triple};
use std::io::Write;

/// N-Triples parser
#[derive(Debug, Clone, Default)]
pub struct NTriplesParser;

impl NTriplesParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a byte slice
    pub fn parse_slice(&self, bytes: &[u8]) -> DecodeResult<Graph> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            DecodeError::syntax(format!("invalid UTF-8: {e}"), TextPosition::start())
        })?;
        self.parse_str(text)
    }

    /// Parse a string
    pub fn parse_str(&self, input: &str) -> DecodeResult<Graph> {
        let mut graph = Graph::new();
        for (index, line) in input.lines().enumerate() {
            if let Some(triple) = self.parse_line(line, index + 1)? {
                graph.insert(triple);
            }
        }
        Ok(graph)
    }

    /// Parse a single line; comments and blank lines yield `None`
    pub fn parse_line(&self, line: &str, line_number: usize) -> DecodeResult<Option<Triple>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let Some(line) = line.strip_suffix('.') else {
            return Err(DecodeError::syntax(
                "N-Triples statement must end with '.'",
                TextPosition::new(line_number, line.len().max(1)),
            ));
        };
        let line = line.trim();

        let tokens = tokenize_line(line, line_number)?;
        if tokens.len() != 3 {
            return Err(DecodeError::syntax(
                format!(
                    "expected 3 terms (subject predicate object), found {}",
                    tokens.len()
                ),
                TextPosition::new(line_number, 1),
            ));
        }

        let subject = parse_subject(&tokens[0], line_number)?;
        let predicate = parse_predicate(&tokens[1], line_number)?;
        let object = parse_object(&tokens[2], line_number)?;
        Ok(Some(Triple::new(subject, predicate, object)))
    }
}

/// Split a statement into terms, keeping quoted strings (and their
/// language/datatype suffixes) intact.
fn tokenize_line(line: &str, line_number: usize) -> DecodeResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in line.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => {
                escaped = true;
                current.push(ch);
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err(DecodeError::syntax(
            "unterminated string literal",
            TextPosition::new(line_number, line.len()),
        ));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_subject(token: &str, line_number: usize) -> DecodeResult<Subject> {
    if let Some(iri) = iri_token(token) {
        return Ok(Subject::NamedNode(NamedNode::new(iri)?));
    }
    if let Some(label) = token.strip_prefix("_:") {
        return Ok(Subject::BlankNode(BlankNode::new(label)?));
    }
    Err(DecodeError::syntax(
        format!("invalid subject: {token}"),
        TextPosition::new(line_number, 1),
    ))
}

fn parse_predicate(token: &str, line_number: usize) -> DecodeResult<NamedNode> {
    match iri_token(token) {
        Some(iri) => Ok(NamedNode::new(iri)?),
        None => Err(DecodeError::syntax(
            format!("invalid predicate: {token}"),
            TextPosition::new(line_number, 1),
        )),
    }
}

fn parse_object(token: &str, line_number: usize) -> DecodeResult<Object> {
    if let Some(iri) = iri_token(token) {
        return Ok(Object::NamedNode(NamedNode::new(iri)?));
    }
    if let Some(label) = token.strip_prefix("_:") {
        return Ok(Object::BlankNode(BlankNode::new(label)?));
    }
    if token.starts_with('"') {
        return Ok(Object::Literal(parse_literal(token, line_number)?));
    }
    Err(DecodeError::syntax(
        format!("invalid object: {token}"),
        TextPosition::new(line_number, 1),
    ))
}

fn parse_literal(token: &str, line_number: usize) -> DecodeResult<Literal> {
    // find the closing quote, honoring escapes
    let chars: Vec<char> = token.chars().collect();
    let mut end_quote = None;
    let mut escaped = false;
    for (i, &ch) in chars.iter().enumerate().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            end_quote = Some(i);
            break;
        }
    }
    let end_quote = end_quote.ok_or_else(|| {
        DecodeError::syntax(
            "unterminated string literal",
            TextPosition::new(line_number, token.len()),
        )
    })?;

    let value: String = chars[1..end_quote].iter().collect();
    let value = unescape(&value, line_number)?;
    let suffix: String = chars[end_quote + 1..].iter().collect();

    if suffix.is_empty() {
        Ok(Literal::new_simple(value))
    } else if let Some(language) = suffix.strip_prefix('@') {
        Ok(Literal::new_language_tagged(value, language)?)
    } else if let Some(datatype) = suffix
        .strip_prefix("^^<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        Ok(Literal::new_typed(value, NamedNode::new(datatype)?))
    } else {
        Err(DecodeError::syntax(
            format!("invalid literal suffix: {suffix}"),
            TextPosition::new(line_number, end_quote + 1),
        ))
    }
}

fn unescape(s: &str, line_number: usize) -> DecodeResult<String> {
    let position = TextPosition::new(line_number, 1);
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => result.push('\t'),
            Some('b') => result.push('\u{8}'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('f') => result.push('\u{c}'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('\\') => result.push('\\'),
            Some(marker @ ('u' | 'U')) => {
                let width = if marker == 'u' { 4 } else { 8 };
                let code: String = chars.by_ref().take(width).collect();
                if code.len() != width || !code.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(DecodeError::syntax(
                        format!("invalid unicode escape \\{marker}{code}"),
                        position,
                    ));
                }
                let value = u32::from_str_radix(&code, 16).map_err(|_| {
                    DecodeError::syntax(format!("invalid unicode escape \\{marker}{code}"), position)
                })?;
                let decoded = char::from_u32(value).ok_or_else(|| {
                    DecodeError::syntax(format!("invalid code point U+{code}"), position)
                })?;
                result.push(decoded);
            }
            Some(other) => {
                return Err(DecodeError::syntax(
                    format!("invalid escape sequence \\{other}"),
                    position,
                ))
            }
            None => {
                return Err(DecodeError::syntax("dangling escape at end of literal", position))
            }
        }
    }
    Ok(result)
}

fn iri_token(token: &str) -> Option<&str> {
    token.strip_prefix('<').and_then(|rest| rest.strip_suffix('>'))
}

/// N-Triples serializer
#[derive(Debug, Clone, Default)]
pub struct NTriplesSerializer;

impl NTriplesSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize a graph to a byte buffer
    pub fn serialize(&self, graph: &Graph) -> EncodeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.serialize_to(graph, &mut out)?;
        Ok(out)
    }

    /// Serialize a graph to a writer, one statement per line
    pub fn serialize_to(&self, graph: &Graph, writer: &mut dyn Write) -> EncodeResult<()> {
        for triple in graph {
            writeln!(writer, "{triple}")?;
        }
        Ok(())
    }
}
