use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cst::{MylangSyntaxElement, MylangSyntaxNode};
use crate::source::SourceBuffer;
use crate::tree::CstNode;
use crate::{LANGUAGE_NAME, MylangError, Result};

/// A grammar engine: turns a source buffer into a concrete syntax tree
///
/// The pipeline receives its engine at construction time and the serializer
/// only sees the returned tree through [`CstNode`], so any engine (or a
/// hand-built fake in tests) can be plugged in.
pub trait GrammarEngine {
    type Node: CstNode;

    /// Declared name of the grammar, written to the document root
    fn language(&self) -> &str;

    /// Parse the whole buffer; a returned root is always well formed
    fn parse(&self, source: &SourceBuffer) -> Result<Self::Node>;
}

/// Outcome of parsing mylang content.
#[derive(Debug)]
pub struct ParseResult {
    /// Original source that was parsed.
    pub source: Arc<str>,
    /// Parsed CST root node.
    pub cst: MylangSyntaxNode,
    /// Combined lexer and parser errors, in source order.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn cst(&self) -> &MylangSyntaxNode {
        &self.cst
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Serialize recovered trees (with `ERROR` nodes) instead of failing
    pub allow_errors: bool,
}

/// The mylang grammar engine
///
/// Stateless apart from its configuration; one instance can parse any
/// number of buffers.
#[derive(Debug, Clone, Default)]
pub struct MylangParser {
    config: ParserConfig,
}

impl MylangParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse mylang content
    ///
    /// Never fails: diagnostics are collected in the result next to the
    /// recovered tree.
    pub fn parse_content(content: &str) -> ParseResult {
        let source: Arc<str> = Arc::from(content);
        let (cst, lex_errors, parse_errors) = crate::cst::parse_mylang(&source);

        let mut errors: Vec<ParseError> = lex_errors
            .into_iter()
            .map(|error| {
                ParseError::from_span(&source, error.message, error.span, ParseErrorKind::Lexer)
            })
            .chain(parse_errors.into_iter().map(|error| {
                ParseError::from_span(&source, error.message, error.span, ParseErrorKind::Parser)
            }))
            .collect();
        errors.sort_by_key(|error| error.span.start);

        ParseResult {
            source,
            cst,
            errors,
        }
    }
}

impl GrammarEngine for MylangParser {
    type Node = MylangSyntaxElement;

    fn language(&self) -> &str {
        LANGUAGE_NAME
    }

    fn parse(&self, source: &SourceBuffer) -> Result<Self::Node> {
        let content = source.as_str().map_err(|err| {
            let valid = &source.as_bytes()[..err.valid_up_to()];
            // The prefix up to `valid_up_to` is valid by construction
            let prefix = std::str::from_utf8(valid).unwrap_or_default();
            let offset = err.valid_up_to();
            let length = err.error_len().unwrap_or(source.len() - offset);
            MylangError::parse_failure(vec![ParseError::from_span(
                prefix,
                "source is not valid UTF-8".to_string(),
                offset..offset + length,
                ParseErrorKind::Lexer,
            )])
        })?;

        let result = Self::parse_content(content);
        debug!(
            bytes = content.len(),
            errors = result.errors.len(),
            "Parsed mylang source"
        );

        if !result.is_valid() {
            if !self.config.allow_errors {
                return Err(MylangError::parse_failure(result.errors));
            }
            for error in &result.errors {
                warn!("Recovered from syntax error at {error}");
            }
        }

        Ok(MylangSyntaxElement::Node(result.cst))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Zero-based line
    pub line: usize,
    /// Zero-based column, in characters
    pub column: usize,
    /// Byte range in the source
    pub span: Range<usize>,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Lexer,
    Parser,
}

impl ParseError {
    fn from_span(source: &str, message: String, span: Range<usize>, kind: ParseErrorKind) -> Self {
        let (line, column) = offset_to_line_col(source, span.start);
        Self {
            message,
            line,
            column,
            span,
            kind,
        }
    }
}

/// Renders as `line:column: message`, both one-based
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line + 1, self.column + 1, self.message)
    }
}

fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0usize;
    let mut column = 0usize;
    let mut current = 0usize;

    for ch in source.chars() {
        if current >= offset {
            break;
        }

        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }

        current += ch.len_utf8();
    }

    (line, column)
}
