//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lucy_settings::{EmbeddingProvider, LucySettings};

/// Semantic drift monitor for generated text.
#[derive(Parser, Debug)]
#[command(name = "lucy", version, about = "Semantic drift monitor for generated text")]
pub struct Cli {
    /// Settings file (default: `~/.lucy/settings.json`).
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Response log database (overrides `storage.dbPath`).
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Text embedder: `onnx` or `hash` (overrides `embedding.provider`).
    #[arg(long, global = true, value_parser = parse_provider)]
    pub provider: Option<EmbeddingProvider>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a response against prior responses and record it.
    Evaluate(EvaluateArgs),
    /// Show recently recorded evaluations, newest first.
    Recent {
        /// Number of records.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show index, log and history counts.
    Stats,
}

/// Arguments for `lucy evaluate`.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Response text to evaluate.
    #[arg(conflicts_with = "stdin")]
    pub text: Option<String>,

    /// Read the response from standard input.
    #[arg(long)]
    pub stdin: bool,

    /// Prompt that produced the response, kept in history.
    #[arg(long)]
    pub query: Option<String>,

    /// Prior responses shortlisted (overrides `engine.lookback`).
    #[arg(long)]
    pub lookback: Option<usize>,

    /// Alert when drift exceeds this (overrides `engine.alertThreshold`).
    #[arg(long)]
    pub threshold: Option<f64>,
}

fn parse_provider(val: &str) -> Result<EmbeddingProvider, String> {
    EmbeddingProvider::parse(val).ok_or_else(|| format!("unknown provider {val:?} (expected onnx or hash)"))
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_overrides(&self, settings: &mut LucySettings) {
        if let Some(path) = &self.db_path {
            settings.storage.db_path = path.to_string_lossy().into_owned();
        }
        if let Some(provider) = self.provider {
            settings.embedding.provider = provider;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_evaluate_with_text() {
        let cli = Cli::try_parse_from(["lucy", "evaluate", "The sky is blue."]).unwrap();
        assert_matches!(cli.command, Command::Evaluate(ref args) if args.text.as_deref() == Some("The sky is blue."));
    }

    #[test]
    fn parses_evaluate_options() {
        let cli = Cli::try_parse_from([
            "lucy",
            "--provider",
            "hash",
            "evaluate",
            "--query",
            "sky colour?",
            "--lookback",
            "3",
            "--threshold",
            "0.25",
            "blue",
        ])
        .unwrap();
        assert_eq!(cli.provider, Some(EmbeddingProvider::Hash));
        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.query.as_deref(), Some("sky colour?"));
        assert_eq!(args.lookback, Some(3));
        assert_eq!(args.threshold, Some(0.25));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lucy", "stats", "--db-path", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/x.db")));
        assert_matches!(cli.command, Command::Stats);
    }

    #[test]
    fn recent_default_limit() {
        let cli = Cli::try_parse_from(["lucy", "recent"]).unwrap();
        assert_matches!(cli.command, Command::Recent { limit: 10 });
    }

    #[test]
    fn unknown_provider_rejected() {
        assert!(Cli::try_parse_from(["lucy", "--provider", "bert", "stats"]).is_err());
    }

    #[test]
    fn text_and_stdin_conflict() {
        assert!(Cli::try_parse_from(["lucy", "evaluate", "--stdin", "text"]).is_err());
    }

    #[test]
    fn overrides_replace_settings() {
        let cli = Cli::try_parse_from(["lucy", "--provider", "onnx", "--db-path", "/tmp/a.db", "stats"])
            .unwrap();
        let mut settings = LucySettings::default();
        cli.apply_overrides(&mut settings);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Onnx);
        assert_eq!(settings.storage.db_path, "/tmp/a.db");
    }
}
