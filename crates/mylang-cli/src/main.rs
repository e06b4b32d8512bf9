//! mylang-ast CLI
//!
//! Parses one mylang source file and writes its syntax tree as JSON.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use mylang_core::{
    CONFIG_ENV, Config, ConfigLoader, DEFAULT_LOG_FILTER, MylangError, Pipeline, RunSummary,
    TextPolicy, init_tracing,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "mylang-ast")]
#[command(about = "Dump the concrete syntax tree of a mylang source file as JSON")]
#[command(version = mylang_core::VERSION)]
#[command(
    long_about = "Parses a mylang source file and writes its concrete syntax tree as a JSON\n\
document with the keys `language`, `text_length` and `ast`.\n\
\n\
Examples:\n  \
mylang-ast main.my main.json                  # Cleaned text, pretty JSON\n  \
mylang-ast main.my main.json --text-policy raw # Verbatim text plus byte offsets\n  \
mylang-ast main.my main.json --compact        # Single-line JSON"
)]
struct Cli {
    /// Source file to parse
    input: PathBuf,

    /// Destination of the JSON document
    output: PathBuf,

    /// Configuration file path
    #[arg(
        short,
        long,
        env = CONFIG_ENV,
        help = "Path to configuration file (.toml or .json)"
    )]
    config: Option<PathBuf>,

    /// How node text is written
    #[arg(long, value_enum)]
    text_policy: Option<TextPolicyArg>,

    /// Maximum syntax tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,

    /// Serialize trees with syntax errors instead of failing
    #[arg(long)]
    allow_errors: bool,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TextPolicyArg {
    /// Text without line breaks, no offsets
    Cleaned,
    /// Verbatim text plus start_byte/end_byte
    Raw,
}

impl From<TextPolicyArg> for TextPolicy {
    fn from(arg: TextPolicyArg) -> Self {
        match arg {
            TextPolicyArg::Cleaned => TextPolicy::Cleaned,
            TextPolicyArg::Raw => TextPolicy::Raw,
        }
    }
}

impl Cli {
    /// Command line flags win over file values
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(policy) = self.text_policy {
            config.serializer.text_policy = policy.into();
        }
        if let Some(max_depth) = self.max_depth {
            config.serializer.max_depth = max_depth;
        }
        if self.compact {
            config.output.pretty = false;
        }
        if self.allow_errors {
            config.parser.allow_errors = true;
        }
    }
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => DEFAULT_LOG_FILTER,
        1 => "mylang_core=info,mylang_cli=info",
        2 => "mylang_core=debug,mylang_cli=debug",
        _ => "mylang_core=trace,mylang_cli=trace",
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let mut config =
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    debug!(?config, "Effective configuration");

    Pipeline::from_config(&config)
        .run(&cli.input, &cli.output)
        .with_context(|| format!("Failed to convert '{}'", cli.input.display()))
}

fn report(cli: &Cli, err: &anyhow::Error) {
    eprintln!("error: {err:#}");
    if let Some(error) = err.downcast_ref::<MylangError>() {
        for diagnostic in error.parse_errors() {
            eprintln!("  {}:{diagnostic}", cli.input.display());
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(log_filter(cli.verbose));

    match run(&cli) {
        Ok(summary) => {
            debug!(
                nodes = summary.node_count,
                bytes = summary.output_bytes,
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&cli, &err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_win_over_config() {
        let cli = Cli::parse_from([
            "mylang-ast",
            "in.my",
            "out.json",
            "--text-policy",
            "raw",
            "--max-depth",
            "12",
            "--compact",
            "--allow-errors",
        ]);

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.serializer.text_policy, TextPolicy::Raw);
        assert_eq!(config.serializer.max_depth, 12);
        assert!(!config.output.pretty);
        assert!(config.parser.allow_errors);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["mylang-ast", "in.my", "out.json"]);
        let mut config = Config::default();
        config.output.pretty = false;
        cli.apply_overrides(&mut config);
        assert!(!config.output.pretty);
        assert_eq!(config.serializer.text_policy, TextPolicy::Cleaned);
    }

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(log_filter(0), DEFAULT_LOG_FILTER);
        assert!(log_filter(2).contains("debug"));
        assert!(log_filter(9).contains("trace"));
    }
}
