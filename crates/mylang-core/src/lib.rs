//! mylang core
//!
//! Parses mylang sources into a lossless concrete syntax tree and serializes
//! that tree to a JSON document mirroring its shape: every node becomes an
//! object with its grammar `type`, its source `text` and, depending on the
//! text policy, its byte offsets.
//!
//! ```rust
//! use mylang_core::{Config, Pipeline, SourceBuffer};
//!
//! let pipeline = Pipeline::from_config(&Config::default());
//! let document = pipeline
//!     .build_document(&SourceBuffer::from("def main() end"))
//!     .unwrap();
//! assert_eq!(document.language, "mylang");
//! assert_eq!(document.ast.kind, "source");
//! ```

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod document;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod result;
pub mod serializer;
pub mod source;
pub mod tree;

pub use config::{
    CONFIG_ENV, Config, ConfigLoader, MAX_DEPTH_CEILING, OutputConfig, SerializerConfig,
};
pub use document::{DocumentRoot, write_atomically};
pub use error::{ErrorKind, MylangError};
pub use parser::{
    GrammarEngine, MylangParser, ParseError, ParseErrorKind, ParseResult, ParserConfig,
};
pub use pipeline::{Pipeline, RunSummary};
pub use result::Result;
pub use serializer::{
    DEFAULT_MAX_DEPTH, NodeRecord, NodeText, TextPolicy, TreeSerializer, clean_text,
};
pub use source::SourceBuffer;
pub use tree::CstNode;

/// Declared grammar name written to every document
pub const LANGUAGE_NAME: &str = "mylang";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "mylang_core=warn,mylang_cli=warn";

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr so they never mix with a document on stdout or in the
/// output file. `RUST_LOG` takes precedence over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
