//! End-to-end run: load → parse → serialize → write
//!
//! Each run is independent: nothing is cached or shared between runs, and
//! the output file is only created once the whole document has rendered.

use std::path::Path;

use tracing::{debug, info, info_span};

use crate::config::Config;
use crate::document::{DocumentRoot, write_atomically};
use crate::parser::{GrammarEngine, MylangParser};
use crate::serializer::TreeSerializer;
use crate::source::SourceBuffer;
use crate::Result;

/// Figures reported after a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub input_bytes: usize,
    pub node_count: usize,
    pub output_bytes: usize,
}

/// A configured pipeline around a grammar engine
pub struct Pipeline<E: GrammarEngine> {
    engine: E,
    serializer: TreeSerializer,
    pretty: bool,
}

impl Pipeline<MylangParser> {
    /// Pipeline with the mylang engine
    pub fn from_config(config: &Config) -> Self {
        Self::new(MylangParser::with_config(config.parser.clone()), config)
    }
}

impl<E: GrammarEngine> Pipeline<E> {
    pub fn new(engine: E, config: &Config) -> Self {
        Self {
            engine,
            serializer: config.serializer.build(),
            pretty: config.output.pretty,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Parse and serialize `source` into a document
    pub fn build_document(&self, source: &SourceBuffer) -> Result<DocumentRoot> {
        let root = self.engine.parse(source)?;
        debug!(language = self.engine.language(), "Parsed source");

        let ast = self.serializer.serialize(&root, source.as_bytes())?;
        debug!(
            nodes = ast.node_count(),
            policy = ?self.serializer.policy(),
            "Serialized syntax tree"
        );

        Ok(DocumentRoot::new(self.engine.language(), source.len(), ast))
    }

    /// Build the document for `source` and render it to JSON
    pub fn render(&self, source: &SourceBuffer) -> Result<Vec<u8>> {
        self.build_document(source)?.to_json(self.pretty)
    }

    /// Process `input` and write the JSON document to `output`
    ///
    /// Fails without touching `output` if any stage fails.
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let span = info_span!("run", input = %input.display());
        let _guard = span.enter();

        let source = SourceBuffer::load(input)?;
        let document = self.build_document(&source)?;
        let node_count = document.ast.node_count();
        let bytes = document.to_json(self.pretty)?;

        write_atomically(output, &bytes)?;

        let summary = RunSummary {
            input_bytes: source.len(),
            node_count,
            output_bytes: bytes.len(),
        };
        info!(
            output = %output.display(),
            input_bytes = summary.input_bytes,
            nodes = summary.node_count,
            output_bytes = summary.output_bytes,
            "Wrote syntax tree"
        );
        Ok(summary)
    }
}
