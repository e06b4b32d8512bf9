//! Error types and handling for mylang serialization runs

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::ParseError;

/// Main error type for a load → parse → serialize → write run
///
/// Every variant is fatal to the run it occurs in.
#[derive(Debug, Error)]
pub enum MylangError {
    /// File system I/O errors (open, read, write, rename)
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Memory could not be reserved for a buffer or the rendered document
    #[error("Allocation of {requested} bytes failed")]
    Allocation { requested: usize },

    /// The grammar engine produced no usable tree
    #[error("Parsing failed: {}", summarize(errors))]
    ParseFailure { errors: Vec<ParseError> },

    /// The document could not be rendered to JSON
    #[error("Encoding failed: {source}")]
    Encoding {
        #[source]
        source: serde_json::Error,
    },

    /// The syntax tree is nested deeper than the serializer allows
    #[error("Syntax tree exceeds the maximum depth of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn summarize(errors: &[ParseError]) -> String {
    match errors {
        [] => "no syntax tree produced".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Allocation,
    Parse,
    Encoding,
    DepthLimit,
    Config,
}

impl MylangError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MylangError::Io { .. } => ErrorKind::Io,
            MylangError::Allocation { .. } => ErrorKind::Allocation,
            MylangError::ParseFailure { .. } => ErrorKind::Parse,
            MylangError::Encoding { .. } => ErrorKind::Encoding,
            MylangError::DepthLimitExceeded { .. } => ErrorKind::DepthLimit,
            MylangError::Config { .. } => ErrorKind::Config,
        }
    }

    /// Parse diagnostics carried by a [`MylangError::ParseFailure`]
    pub fn parse_errors(&self) -> &[ParseError] {
        match self {
            MylangError::ParseFailure { errors } => errors,
            _ => &[],
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn allocation_error(requested: usize) -> Self {
        Self::Allocation { requested }
    }

    /// Create a parse failure from collected diagnostics
    pub fn parse_failure(errors: Vec<ParseError>) -> Self {
        Self::ParseFailure { errors }
    }

    pub fn encoding_error(source: serde_json::Error) -> Self {
        Self::Encoding { source }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseErrorKind;

    fn diagnostic(message: &str, line: usize, column: usize) -> ParseError {
        ParseError {
            message: message.to_string(),
            line,
            column,
            span: 0..1,
            kind: ParseErrorKind::Parser,
        }
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            MylangError::io_error("in.my", std::io::Error::other("boom")).kind(),
            ErrorKind::Io
        );
        assert_eq!(MylangError::allocation_error(8).kind(), ErrorKind::Allocation);
        assert_eq!(MylangError::parse_failure(vec![]).kind(), ErrorKind::Parse);
        assert_eq!(
            MylangError::DepthLimitExceeded { limit: 3 }.kind(),
            ErrorKind::DepthLimit
        );
        assert_eq!(MylangError::config_error("bad").kind(), ErrorKind::Config);
    }

    #[test]
    fn test_parse_failure_display() {
        let none = MylangError::parse_failure(vec![]);
        assert_eq!(none.to_string(), "Parsing failed: no syntax tree produced");

        let one = MylangError::parse_failure(vec![diagnostic("expected ';', found 'end'", 0, 4)]);
        assert_eq!(
            one.to_string(),
            "Parsing failed: 1:5: expected ';', found 'end'"
        );

        let many = MylangError::parse_failure(vec![
            diagnostic("first", 0, 0),
            diagnostic("second", 1, 0),
            diagnostic("third", 2, 0),
        ]);
        assert_eq!(many.to_string(), "Parsing failed: 1:1: first (and 2 more)");
        assert_eq!(many.parse_errors().len(), 3);
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = MylangError::io_error(
            "missing.my",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().contains("missing.my"));
        assert!(err.source().is_some());
        assert!(err.parse_errors().is_empty());
    }
}
