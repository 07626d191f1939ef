//! Turtle parser and serializer, also covering the Turtle subset of N3.
//!
//! The parser handles the constructs machine-generated payloads use:
//! `@prefix`/`@base` (and the SPARQL-style directive spellings), prefixed
//! names, the `a` keyword, blank-node labels and anonymous property lists,
//! short and long strings with escapes, language tags, datatypes, and
//! numeric/boolean shorthand. RDF collections are rejected with a clean
//! unsupported-syntax error rather than silently skipped.

use crate::error::{DecodeError, DecodeResult, EncodeResult, TextPosition};
use crate::model::{escape_literal, BlankNode, Graph, Literal, NamedNode, Object, Subject, Triple};
use crate::vocab::{owl, rdf, rdfs, xsd};
use std::collections::{HashMap, HashSet};
use std::io::Write;

/// Turtle / N3 parser
#[derive(Debug, Clone)]
pub struct TurtleParser {
    base_iri: Option<String>,
    prefixes: HashMap<String, String>,
}

impl Default for TurtleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TurtleParser {
    /// Create a parser seeded with the standard prefixes.
    pub fn new() -> Self {
        let mut prefixes = HashMap::new();
        prefixes.insert("rdf".to_string(), rdf::NAMESPACE.to_string());
        prefixes.insert("rdfs".to_string(), rdfs::NAMESPACE.to_string());
        prefixes.insert("xsd".to_string(), xsd::NAMESPACE.to_string());
        prefixes.insert("owl".to_string(), owl::NAMESPACE.to_string());
        Self {
            base_iri: None,
            prefixes,
        }
    }

    /// Set the base IRI for resolving relative IRIs
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Add a namespace prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), iri.into());
        self
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
        let mut state = ParserState {
            scanner: Scanner::new(input),
            base_iri: self.base_iri.clone(),
            prefixes: self.prefixes.clone(),
            blank_counter: 0,
            triples: Vec::new(),
        };
        state.parse_document()?;
        Ok(Graph::from(state.triples))
    }
}

/// Character scanner with position tracking
struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn position(&self) -> TextPosition {
        TextPosition::new(self.line, self.column)
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    /// Skip whitespace and `#` comments
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn eat(&mut self, expected: char) -> DecodeResult<()> {
        let position = self.position();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(DecodeError::syntax(
                format!("expected {expected:?}, found {c:?}"),
                position,
            )),
            None => Err(DecodeError::syntax(
                format!("expected {expected:?}, found end of input"),
                position,
            )),
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

struct ParserState {
    scanner: Scanner,
    base_iri: Option<String>,
    prefixes: HashMap<String, String>,
    blank_counter: usize,
    triples: Vec<Triple>,
}

impl ParserState {
    fn parse_document(&mut self) -> DecodeResult<()> {
        loop {
            self.scanner.skip_trivia();
            if self.scanner.at_eof() {
                return Ok(());
            }
            if !self.try_parse_directive()? {
                self.parse_statement()?;
            }
        }
    }

    /// Parse a `@prefix`/`@base` or SPARQL-style `PREFIX`/`BASE` directive.
    /// Returns false if the input is not a directive.
    fn try_parse_directive(&mut self) -> DecodeResult<bool> {
        if self.scanner.peek() == Some('@') {
            self.scanner.bump();
            let keyword = self.read_bare_word();
            match keyword.as_str() {
                "prefix" => self.parse_prefix_declaration(true)?,
                "base" => self.parse_base_declaration(true)?,
                other => {
                    return Err(DecodeError::syntax(
                        format!("unknown directive @{other}"),
                        self.scanner.position(),
                    ))
                }
            }
            return Ok(true);
        }

        // SPARQL-style directives are only directives when the keyword is
        // followed by whitespace; `PREFIX:x` is a prefixed name.
        let mark = self.scanner.mark();
        let keyword = self.read_bare_word();
        let followed_by_space = self.scanner.peek().is_some_and(|c| c.is_whitespace());
        if keyword.eq_ignore_ascii_case("prefix") && followed_by_space {
            self.parse_prefix_declaration(false)?;
            return Ok(true);
        }
        if keyword.eq_ignore_ascii_case("base") && followed_by_space {
            self.parse_base_declaration(false)?;
            return Ok(true);
        }
        self.scanner.reset(mark);
        Ok(false)
    }

    fn parse_prefix_declaration(&mut self, turtle_style: bool) -> DecodeResult<()> {
        self.scanner.skip_trivia();
        let mut name = String::new();
        while let Some(c) = self.scanner.peek() {
            if c == ':' {
                break;
            }
            if !is_name_char(c) {
                return Err(DecodeError::syntax(
                    format!("invalid character {c:?} in prefix name"),
                    self.scanner.position(),
                ));
            }
            name.push(c);
            self.scanner.bump();
        }
        self.scanner.eat(':')?;
        self.scanner.skip_trivia();
        let iri = self.parse_iriref()?;
        let iri = self.resolve_iri(iri);
        if turtle_style {
            self.scanner.skip_trivia();
            self.scanner.eat('.')?;
        }
        self.prefixes.insert(name, iri);
        Ok(())
    }

    fn parse_base_declaration(&mut self, turtle_style: bool) -> DecodeResult<()> {
        self.scanner.skip_trivia();
        let iri = self.parse_iriref()?;
        if turtle_style {
            self.scanner.skip_trivia();
            self.scanner.eat('.')?;
        }
        self.base_iri = Some(iri);
        Ok(())
    }

    fn parse_statement(&mut self) -> DecodeResult<()> {
        let (subject, had_property_list) = self.parse_subject()?;
        self.scanner.skip_trivia();
        // `[ :p :o ] .` is a complete statement on its own
        if !(had_property_list && self.scanner.peek() == Some('.')) {
            self.parse_predicate_object_list(&subject)?;
            self.scanner.skip_trivia();
        }
        self.scanner.eat('.')
    }

    fn parse_predicate_object_list(&mut self, subject: &Subject) -> DecodeResult<()> {
        loop {
            self.scanner.skip_trivia();
            let predicate = self.parse_predicate()?;
            loop {
                self.scanner.skip_trivia();
                let object = self.parse_object()?;
                self.triples
                    .push(Triple::new(subject.clone(), predicate.clone(), object));
                self.scanner.skip_trivia();
                if self.scanner.peek() == Some(',') {
                    self.scanner.bump();
                } else {
                    break;
                }
            }
            if self.scanner.peek() != Some(';') {
                return Ok(());
            }
            while self.scanner.peek() == Some(';') {
                self.scanner.bump();
                self.scanner.skip_trivia();
            }
            // trailing ';' before the statement terminator
            if matches!(self.scanner.peek(), Some('.') | Some(']') | None) {
                return Ok(());
            }
        }
    }

    fn parse_subject(&mut self) -> DecodeResult<(Subject, bool)> {
        self.scanner.skip_trivia();
        match self.scanner.peek() {
            Some('<') => Ok((Subject::NamedNode(self.parse_iri_node()?), false)),
            Some('_') => Ok((Subject::BlankNode(self.parse_blank_node_label()?), false)),
            Some('[') => {
                let (node, had_properties) = self.parse_anonymous_node()?;
                Ok((Subject::BlankNode(node), had_properties))
            }
            Some('(') => Err(DecodeError::unsupported(
                "RDF collections are not supported",
            )),
            Some(_) => Ok((Subject::NamedNode(self.parse_prefixed_name()?), false)),
            None => Err(DecodeError::syntax(
                "unexpected end of input; expected subject",
                self.scanner.position(),
            )),
        }
    }

    fn parse_predicate(&mut self) -> DecodeResult<NamedNode> {
        if self.scanner.peek() == Some('a')
            && self
                .scanner
                .peek_ahead(1)
                .is_none_or(|c| c.is_whitespace() || matches!(c, '<' | '[' | '"' | '\'' | '#'))
        {
            self.scanner.bump();
            return Ok(NamedNode::new(rdf::TYPE)?);
        }
        match self.scanner.peek() {
            Some('<') => self.parse_iri_node(),
            Some(_) => self.parse_prefixed_name(),
            None => Err(DecodeError::syntax(
                "unexpected end of input; expected predicate",
                self.scanner.position(),
            )),
        }
    }

    fn parse_object(&mut self) -> DecodeResult<Object> {
        match self.scanner.peek() {
            Some('<') => Ok(Object::NamedNode(self.parse_iri_node()?)),
            Some('_') => Ok(Object::BlankNode(self.parse_blank_node_label()?)),
            Some('[') => {
                let (node, _) = self.parse_anonymous_node()?;
                Ok(Object::BlankNode(node))
            }
            Some('(') => Err(DecodeError::unsupported(
                "RDF collections are not supported",
            )),
            Some('"') | Some('\'') => Ok(Object::Literal(self.parse_literal()?)),
            Some(c) if c.is_ascii_digit() || c == '+' || c == '-' => {
                Ok(Object::Literal(self.parse_numeric_literal()?))
            }
            Some(_) => {
                let mark = self.scanner.mark();
                let word = self.read_bare_word();
                if (word == "true" || word == "false") && self.scanner.peek() != Some(':') {
                    return Ok(Object::Literal(Literal::new_typed(
                        word,
                        NamedNode::new(xsd::BOOLEAN)?,
                    )));
                }
                self.scanner.reset(mark);
                Ok(Object::NamedNode(self.parse_prefixed_name()?))
            }
            None => Err(DecodeError::syntax(
                "unexpected end of input; expected object",
                self.scanner.position(),
            )),
        }
    }

    /// Parse `[` ... `]`, producing a fresh blank node. Returns whether the
    /// brackets carried a property list.
    fn parse_anonymous_node(&mut self) -> DecodeResult<(BlankNode, bool)> {
        self.scanner.eat('[')?;
        let label = format!("genid{}", self.blank_counter);
        self.blank_counter += 1;
        let node = BlankNode::new(label)?;
        self.scanner.skip_trivia();
        if self.scanner.peek() == Some(']') {
            self.scanner.bump();
            return Ok((node, false));
        }
        let subject = Subject::BlankNode(node.clone());
        self.parse_predicate_object_list(&subject)?;
        self.scanner.skip_trivia();
        self.scanner.eat(']')?;
        Ok((node, true))
    }

    fn parse_iri_node(&mut self) -> DecodeResult<NamedNode> {
        let iri = self.parse_iriref()?;
        let iri = self.resolve_iri(iri);
        Ok(NamedNode::new(iri)?)
    }

    /// Parse `<...>` returning the IRI text with escapes applied
    fn parse_iriref(&mut self) -> DecodeResult<String> {
        self.scanner.eat('<')?;
        let mut iri = String::new();
        loop {
            let position = self.scanner.position();
            match self.scanner.bump() {
                Some('>') => return Ok(iri),
                Some('\\') => iri.push(self.parse_unicode_escape(position)?),
                Some(c) if c == '\n' || c == '\r' => {
                    return Err(DecodeError::syntax("unterminated IRI", position))
                }
                Some(c) => iri.push(c),
                None => return Err(DecodeError::syntax("unterminated IRI", position)),
            }
        }
    }

    /// Parse the `uXXXX` / `UXXXXXXXX` tail of a unicode escape
    fn parse_unicode_escape(&mut self, position: TextPosition) -> DecodeResult<char> {
        let width = match self.scanner.bump() {
            Some('u') => 4,
            Some('U') => 8,
            other => {
                return Err(DecodeError::syntax(
                    format!("invalid escape sequence \\{}", other.map(String::from).unwrap_or_default()),
                    position,
                ))
            }
        };
        let mut code = String::with_capacity(width);
        for _ in 0..width {
            match self.scanner.bump() {
                Some(c) if c.is_ascii_hexdigit() => code.push(c),
                _ => {
                    return Err(DecodeError::syntax(
                        format!("invalid unicode escape \\u{code}"),
                        position,
                    ))
                }
            }
        }
        let value = u32::from_str_radix(&code, 16)
            .map_err(|_| DecodeError::syntax(format!("invalid unicode escape \\u{code}"), position))?;
        char::from_u32(value)
            .ok_or_else(|| DecodeError::syntax(format!("invalid code point U+{code}"), position))
    }

    fn parse_blank_node_label(&mut self) -> DecodeResult<BlankNode> {
        let position = self.scanner.position();
        self.scanner.eat('_')?;
        self.scanner.eat(':')?;
        let label = self.read_name();
        if label.is_empty() {
            return Err(DecodeError::syntax("empty blank node label", position));
        }
        Ok(BlankNode::new(label)?)
    }

    fn parse_prefixed_name(&mut self) -> DecodeResult<NamedNode> {
        let position = self.scanner.position();
        let prefix = self.read_name();
        if self.scanner.peek() != Some(':') {
            return Err(DecodeError::syntax(
                format!("expected prefixed name, found {prefix:?}"),
                position,
            ));
        }
        self.scanner.bump();
        let local = self.read_local_name()?;
        let namespace = self.prefixes.get(&prefix).ok_or_else(|| {
            DecodeError::syntax(format!("undefined prefix {prefix:?}"), position)
        })?;
        Ok(NamedNode::new(format!("{namespace}{local}"))?)
    }

    /// Read name characters; a trailing `.` stays in the stream (it
    /// terminates the statement, not the name).
    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.scanner.peek() {
            if c == '.' {
                if self.scanner.peek_ahead(1).is_some_and(is_name_char) {
                    name.push(c);
                    self.scanner.bump();
                    continue;
                }
                break;
            }
            if is_name_char(c) {
                name.push(c);
                self.scanner.bump();
            } else {
                break;
            }
        }
        name
    }

    /// Local names additionally allow `%`-encoded and `\`-escaped characters
    fn read_local_name(&mut self) -> DecodeResult<String> {
        let mut name = String::new();
        while let Some(c) = self.scanner.peek() {
            match c {
                '.' => {
                    if self.scanner.peek_ahead(1).is_some_and(is_name_char) {
                        name.push(c);
                        self.scanner.bump();
                    } else {
                        break;
                    }
                }
                '%' => {
                    name.push(c);
                    self.scanner.bump();
                }
                '\\' => {
                    let position = self.scanner.position();
                    self.scanner.bump();
                    match self.scanner.bump() {
                        Some(escaped) => name.push(escaped),
                        None => {
                            return Err(DecodeError::syntax(
                                "unterminated local name escape",
                                position,
                            ))
                        }
                    }
                }
                c if is_name_char(c) => {
                    name.push(c);
                    self.scanner.bump();
                }
                _ => break,
            }
        }
        Ok(name)
    }

    fn read_bare_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.scanner.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.scanner.bump();
            } else {
                break;
            }
        }
        word
    }

    fn parse_literal(&mut self) -> DecodeResult<Literal> {
        let value = self.parse_string()?;
        match self.scanner.peek() {
            Some('@') => {
                self.scanner.bump();
                let mut language = String::new();
                while let Some(c) = self.scanner.peek() {
                    if c.is_ascii_alphanumeric() || c == '-' {
                        language.push(c);
                        self.scanner.bump();
                    } else {
                        break;
                    }
                }
                Ok(Literal::new_language_tagged(value, language)?)
            }
            Some('^') if self.scanner.peek_ahead(1) == Some('^') => {
                self.scanner.bump();
                self.scanner.bump();
                let datatype = match self.scanner.peek() {
                    Some('<') => self.parse_iri_node()?,
                    _ => self.parse_prefixed_name()?,
                };
                Ok(Literal::new_typed(value, datatype))
            }
            _ => Ok(Literal::new_simple(value)),
        }
    }

    fn parse_string(&mut self) -> DecodeResult<String> {
        let position = self.scanner.position();
        let quote = match self.scanner.bump() {
            Some(c @ ('"' | '\'')) => c,
            _ => return Err(DecodeError::syntax("expected string literal", position)),
        };

        let long = self.scanner.peek() == Some(quote) && self.scanner.peek_ahead(1) == Some(quote);
        if long {
            self.scanner.bump();
            self.scanner.bump();
            return self.parse_long_string_body(quote, position);
        }

        let mut value = String::new();
        loop {
            let char_position = self.scanner.position();
            match self.scanner.bump() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => value.push(self.parse_string_escape(char_position)?),
                Some('\n') | None => {
                    return Err(DecodeError::syntax("unterminated string literal", position))
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn parse_long_string_body(
        &mut self,
        quote: char,
        start: TextPosition,
    ) -> DecodeResult<String> {
        let mut value = String::new();
        loop {
            if self.scanner.peek() == Some(quote) {
                // a run of n >= 3 quotes closes the string; extras belong
                // to the content (`""""` is `"` followed by the terminator)
                let mut run = 1;
                while self.scanner.peek_ahead(run) == Some(quote) {
                    run += 1;
                }
                if run >= 3 {
                    for _ in 0..run.saturating_sub(3) {
                        value.push(quote);
                    }
                    for _ in 0..run {
                        self.scanner.bump();
                    }
                    return Ok(value);
                }
                for _ in 0..run {
                    value.push(quote);
                    self.scanner.bump();
                }
                continue;
            }
            let char_position = self.scanner.position();
            match self.scanner.bump() {
                Some('\\') => value.push(self.parse_string_escape(char_position)?),
                Some(c) => value.push(c),
                None => {
                    return Err(DecodeError::syntax("unterminated string literal", start))
                }
            }
        }
    }

    fn parse_string_escape(&mut self, position: TextPosition) -> DecodeResult<char> {
        match self.scanner.peek() {
            Some('t') => {
                self.scanner.bump();
                Ok('\t')
            }
            Some('b') => {
                self.scanner.bump();
                Ok('\u{8}')
            }
            Some('n') => {
                self.scanner.bump();
                Ok('\n')
            }
            Some('r') => {
                self.scanner.bump();
                Ok('\r')
            }
            Some('f') => {
                self.scanner.bump();
                Ok('\u{c}')
            }
            Some('"') => {
                self.scanner.bump();
                Ok('"')
            }
            Some('\'') => {
                self.scanner.bump();
                Ok('\'')
            }
            Some('\\') => {
                self.scanner.bump();
                Ok('\\')
            }
            Some('u') | Some('U') => self.parse_unicode_escape(position),
            other => Err(DecodeError::syntax(
                format!(
                    "invalid escape sequence \\{}",
                    other.map(String::from).unwrap_or_default()
                ),
                position,
            )),
        }
    }

    fn parse_numeric_literal(&mut self) -> DecodeResult<Literal> {
        let position = self.scanner.position();
        let mut lexeme = String::new();
        if matches!(self.scanner.peek(), Some('+') | Some('-')) {
            if let Some(sign) = self.scanner.bump() {
                lexeme.push(sign);
            }
        }
        let mut digits = 0;
        while let Some(c) = self.scanner.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                digits += 1;
                self.scanner.bump();
            } else {
                break;
            }
        }
        let mut decimal = false;
        if self.scanner.peek() == Some('.')
            && self.scanner.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
        {
            decimal = true;
            lexeme.push('.');
            self.scanner.bump();
            while let Some(c) = self.scanner.peek() {
                if c.is_ascii_digit() {
                    lexeme.push(c);
                    digits += 1;
                    self.scanner.bump();
                } else {
                    break;
                }
            }
        }
        if digits == 0 {
            return Err(DecodeError::syntax("malformed numeric literal", position));
        }
        let mut double = false;
        if matches!(self.scanner.peek(), Some('e') | Some('E')) {
            double = true;
            if let Some(marker) = self.scanner.bump() {
                lexeme.push(marker);
            }
            if matches!(self.scanner.peek(), Some('+') | Some('-')) {
                if let Some(sign) = self.scanner.bump() {
                    lexeme.push(sign);
                }
            }
            let mut exp_digits = 0;
            while let Some(c) = self.scanner.peek() {
                if c.is_ascii_digit() {
                    lexeme.push(c);
                    exp_digits += 1;
                    self.scanner.bump();
                } else {
                    break;
                }
            }
            if exp_digits == 0 {
                return Err(DecodeError::syntax("malformed numeric exponent", position));
            }
        }
        let datatype = if double {
            xsd::DOUBLE
        } else if decimal {
            xsd::DECIMAL
        } else {
            xsd::INTEGER
        };
        Ok(Literal::new_typed(lexeme, NamedNode::new(datatype)?))
    }

    /// Resolve an IRI against the current base. Absolute IRIs pass through.
    fn resolve_iri(&self, iri: String) -> String {
        if is_absolute_iri(&iri) {
            return iri;
        }
        let Some(base) = &self.base_iri else {
            return iri;
        };
        if iri.is_empty() {
            return base.clone();
        }
        if let Some(fragment) = iri.strip_prefix('#') {
            let stem = base.split('#').next().unwrap_or(base);
            return format!("{stem}#{fragment}");
        }
        if iri.starts_with('/') {
            if let Some(scheme_end) = base.find("://") {
                let authority_end = base[scheme_end + 3..]
                    .find('/')
                    .map(|i| scheme_end + 3 + i)
                    .unwrap_or(base.len());
                return format!("{}{iri}", &base[..authority_end]);
            }
            return format!("{base}{iri}");
        }
        match base.rfind('/') {
            Some(slash) => format!("{}{iri}", &base[..=slash]),
            None => format!("{base}{iri}"),
        }
    }
}

fn is_absolute_iri(iri: &str) -> bool {
    let Some(colon) = iri.find(':') else {
        return false;
    };
    let scheme = &iri[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Turtle serializer: prefix header, subject grouping with `;`, object
/// lists with `,`. Statement order is preserved up to subject grouping,
/// which follows first-seen order.
#[derive(Debug, Clone)]
pub struct TurtleSerializer {
    prefixes: Vec<(String, String)>,
}

impl Default for TurtleSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl TurtleSerializer {
    /// Create a serializer with the standard prefixes.
    pub fn new() -> Self {
        Self {
            prefixes: vec![
                ("rdf".to_string(), rdf::NAMESPACE.to_string()),
                ("rdfs".to_string(), rdfs::NAMESPACE.to_string()),
                ("xsd".to_string(), xsd::NAMESPACE.to_string()),
                ("owl".to_string(), owl::NAMESPACE.to_string()),
            ],
        }
    }

    /// Add a namespace prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), iri.into()));
        self
    }

    /// Serialize a graph to a byte buffer
    pub fn serialize(&self, graph: &Graph) -> EncodeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.serialize_to(graph, &mut out)?;
        Ok(out)
    }

    /// Serialize a graph to a writer
    pub fn serialize_to(&self, graph: &Graph, writer: &mut dyn Write) -> EncodeResult<()> {
        let mut used = HashSet::new();
        let mut body = String::new();

        for (subject, predicates) in super::group_by_subject(graph) {
            let subject_text = match &subject {
                Subject::NamedNode(n) => self.abbreviate(n.as_str(), &mut used),
                Subject::BlankNode(b) => b.to_string(),
            };
            for (i, (predicate, objects)) in predicates.iter().enumerate() {
                if i == 0 {
                    body.push_str(&subject_text);
                    body.push(' ');
                } else {
                    body.push_str(" ;\n    ");
                }
                body.push_str(&self.predicate_text(predicate, &mut used));
                body.push(' ');
                for (j, object) in objects.iter().enumerate() {
                    if j > 0 {
                        body.push_str(", ");
                    }
                    body.push_str(&self.object_text(object, &mut used));
                }
            }
            body.push_str(" .\n");
        }

        let mut declared = false;
        for (name, namespace) in &self.prefixes {
            if used.contains(name.as_str()) {
                writeln!(writer, "@prefix {name}: <{namespace}> .")?;
                declared = true;
            }
        }
        if declared {
            writeln!(writer)?;
        }
        writer.write_all(body.as_bytes())?;
        Ok(())
    }

    fn predicate_text(&self, predicate: &NamedNode, used: &mut HashSet<String>) -> String {
        if predicate.as_str() == rdf::TYPE {
            "a".to_string()
        } else {
            self.abbreviate(predicate.as_str(), used)
        }
    }

    fn object_text(&self, object: &Object, used: &mut HashSet<String>) -> String {
        match object {
            Object::NamedNode(n) => self.abbreviate(n.as_str(), used),
            Object::BlankNode(b) => b.to_string(),
            Object::Literal(l) => {
                let mut text = format!("\"{}\"", escape_literal(l.value()));
                if let Some(language) = l.language() {
                    text.push('@');
                    text.push_str(language);
                } else if let Some(datatype) = l.datatype() {
                    text.push_str("^^");
                    text.push_str(&self.abbreviate(datatype.as_str(), used));
                }
                text
            }
        }
    }

    fn abbreviate(&self, iri: &str, used: &mut HashSet<String>) -> String {
        for (name, namespace) in &self.prefixes {
            if let Some(local) = iri.strip_prefix(namespace.as_str()) {
                if is_serializable_local_name(local) {
                    used.insert(name.clone());
                    return format!("{name}:{local}");
                }
            }
        }
        format!("<{iri}>")
    }
}

/// A local name we can emit without escaping
fn is_serializable_local_name(local: &str) -> bool {
    !local.ends_with('.')
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Graph {
        TurtleParser::new().parse_str(input).unwrap()
    }

    fn node(iri: &str) -> NamedNode {
        NamedNode::new(iri).unwrap()
    }

    #[test]
    fn test_parse_simple_triples() {
        let graph = parse(
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> .\n\
             <http://example.org/s> <http://example.org/q> \"hello\" .",
        );
        assert_eq!(graph.len(), 2);
        let first = graph.iter().next().unwrap();
        assert_eq!(first.subject().to_string(), "<http://example.org/s>");
        assert_eq!(first.object().to_string(), "<http://example.org/o>");
    }

    #[test]
    fn test_parse_prefixes_and_a() {
        let graph = parse(
            "@prefix ex: <http://example.org/> .\n\
             ex:alice a ex:Person ;\n\
                 ex:name \"Alice\" , \"Alicia\"@es .",
        );
        assert_eq!(graph.len(), 3);
        let triples: Vec<_> = graph.iter().collect();
        assert_eq!(triples[0].predicate().as_str(), rdf::TYPE);
        assert_eq!(
            triples[2].object().to_string(),
            "\"Alicia\"@es"
        );
    }

    #[test]
    fn test_parse_sparql_style_prefix() {
        let graph = parse(
            "PREFIX ex: <http://example.org/>\n\
             ex:s ex:p ex:o .",
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_parse_typed_and_numeric_literals() {
        let graph = parse(
            "@prefix ex: <http://example.org/> .\n\
             ex:s ex:age 42 ;\n\
                 ex:height 1.75 ;\n\
                 ex:mass 7.0e2 ;\n\
                 ex:alive true ;\n\
                 ex:id \"x7\"^^xsd:string .",
        );
        let objects: Vec<String> = graph.iter().map(|t| t.object().to_string()).collect();
        assert_eq!(objects[0], format!("\"42\"^^<{}>", xsd::INTEGER));
        assert_eq!(objects[1], format!("\"1.75\"^^<{}>", xsd::DECIMAL));
        assert_eq!(objects[2], format!("\"7.0e2\"^^<{}>", xsd::DOUBLE));
        assert_eq!(objects[3], format!("\"true\"^^<{}>", xsd::BOOLEAN));
        assert_eq!(
            objects[4],
            "\"x7\"^^<http://www.w3.org/2001/XMLSchema#string>"
        );
    }

    #[test]
    fn test_parse_blank_nodes() {
        let graph = parse(
            "@prefix ex: <http://example.org/> .\n\
             _:b0 ex:knows [ ex:name \"Bob\" ] .",
        );
        assert_eq!(graph.len(), 2);
        let triples: Vec<_> = graph.iter().collect();
        // the anonymous node's properties come first, then the outer triple
        assert_eq!(triples[0].object().to_string(), "\"Bob\"");
        assert_eq!(triples[1].subject().to_string(), "_:b0");
        assert_eq!(triples[1].object(), &Object::BlankNode(BlankNode::new("genid0").unwrap()));
    }

    #[test]
    fn test_parse_base_resolution() {
        let graph = parse(
            "@base <http://example.org/data/> .\n\
             <item1> <rel> <#frag> .",
        );
        let triple = graph.iter().next().unwrap();
        assert_eq!(
            triple.subject().to_string(),
            "<http://example.org/data/item1>"
        );
        assert_eq!(
            triple.object().to_string(),
            "<http://example.org/data/#frag>"
        );
    }

    #[test]
    fn test_parse_long_string_and_escapes() {
        let graph = parse(
            "@prefix ex: <http://example.org/> .\n\
             ex:s ex:p \"\"\"line one\nline \"two\"\"\"\" ;\n\
                 ex:q \"tab\\there\" .",
        );
        let objects: Vec<_> = graph.iter().map(|t| t.object().clone()).collect();
        match &objects[0] {
            Object::Literal(l) => assert_eq!(l.value(), "line one\nline \"two\""),
            other => panic!("expected literal, got {other:?}"),
        }
        match &objects[1] {
            Object::Literal(l) => assert_eq!(l.value(), "tab\there"),
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_comments() {
        let graph = parse(
            "# leading comment\n\
             @prefix ex: <http://example.org/> . # trailing\n\
             ex:s ex:p ex:o . # done",
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        let parser = TurtleParser::new();
        assert!(matches!(
            parser.parse_str("<http://example.org/s> <http://example.org/p> \"unterminated ."),
            Err(DecodeError::Syntax { .. })
        ));
        assert!(matches!(
            parser.parse_str("ex:s ex:p ex:o ."),
            Err(DecodeError::Syntax { .. })
        ));
        assert!(matches!(
            parser.parse_str("@prefix ex: <http://example.org/> .\nex:s ex:p (1 2) ."),
            Err(DecodeError::UnsupportedSyntax(_))
        ));
        assert!(matches!(
            parser.parse_str("<http://example.org/s> <http://example.org/p> <http://example.org/o>"),
            Err(DecodeError::Syntax { .. })
        ));
    }

    #[test]
    fn test_serialize_groups_subjects() {
        let ex = "http://example.org/";
        let graph: Graph = vec![
            Triple::new(
                node(&format!("{ex}s")),
                node(rdf::TYPE),
                node(&format!("{ex}Thing")),
            ),
            Triple::new(
                node(&format!("{ex}s")),
                node(&format!("{ex}name")),
                Literal::new_simple("thing"),
            ),
        ]
        .into();

        let bytes = TurtleSerializer::new()
            .with_prefix("ex", ex)
            .serialize(&graph)
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("@prefix ex: <http://example.org/> ."));
        assert!(text.contains("ex:s a ex:Thing ;\n    ex:name \"thing\" ."));
    }

    #[test]
    fn test_serialize_only_declares_used_prefixes() {
        let graph: Graph = vec![Triple::new(
            node("http://other.org/s"),
            node("http://other.org/p"),
            Literal::new_simple("v"),
        )]
        .into();

        let text = String::from_utf8(TurtleSerializer::new().serialize(&graph).unwrap()).unwrap();
        assert!(!text.contains("@prefix"));
        assert!(text.contains("<http://other.org/s> <http://other.org/p> \"v\" ."));
    }

    #[test]
    fn test_roundtrip_preserves_triples() {
        let source = "@prefix ex: <http://example.org/> .\n\
                      ex:a ex:p \"v\\\"w\"@en ;\n\
                          a ex:T .\n\
                      _:b1 ex:q 5 .";
        let graph = parse(source);
        let bytes = TurtleSerializer::new()
            .with_prefix("ex", "http://example.org/")
            .serialize(&graph)
            .unwrap();
        let reparsed = TurtleParser::new().parse_slice(&bytes).unwrap();

        let mut original: Vec<String> = graph.iter().map(|t| t.to_string()).collect();
        let mut roundtripped: Vec<String> = reparsed.iter().map(|t| t.to_string()).collect();
        original.sort();
        roundtripped.sort();
        assert_eq!(original, roundtripped);
    }
}
