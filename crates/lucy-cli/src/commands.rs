//! Subcommand implementations.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use lucy_drift::{DriftConfig, DriftEngine, DriftError, DriftResult, EvaluateOptions};
use lucy_settings::{LucySettings, expand_home};
use lucy_store::{ConnectionConfig, DriftHistory, DriftRecord, SqliteResponseLog, open_pool};
use serde::Serialize;
use tracing::warn;

use crate::cli::EvaluateArgs;
use crate::embedder::build_embedder;

/// One evaluation as printed by `lucy evaluate`.
#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    /// When the evaluation ran.
    pub timestamp: DateTime<Utc>,
    /// Prompt supplied with `--query`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Engine output.
    #[serde(flatten)]
    pub result: DriftResult,
}

/// Output of `lucy stats`.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    /// Vectors in the in-memory index.
    pub indexed: u64,
    /// Entries in the response log.
    pub logged: u64,
    /// Recorded evaluations.
    pub history: u64,
}

/// An opened engine plus the history table beside it.
pub struct App {
    engine: DriftEngine,
    history: DriftHistory,
}

impl App {
    /// Open the database and embedder described by `settings`.
    pub async fn open(settings: &LucySettings) -> Result<Self> {
        settings.validate().context("invalid settings")?;

        let db_path = expand_home(&settings.storage.db_path);
        let pool = open_pool(&db_path, &ConnectionConfig::from_settings(&settings.storage))
            .with_context(|| format!("failed to open database {}", db_path.display()))?;

        let embedder = build_embedder(&settings.embedding).await?;
        let engine = DriftEngine::open(
            embedder,
            Box::new(SqliteResponseLog::new(pool.clone())),
            DriftConfig::from_settings(&settings.engine),
        )
        .context("failed to open drift engine")?;

        Ok(Self {
            engine,
            history: DriftHistory::new(pool),
        })
    }

    /// Evaluate one response and record it in history.
    pub async fn evaluate(&self, text: &str, args: &EvaluateArgs) -> Result<EvaluationReport> {
        let options = EvaluateOptions {
            lookback: args.lookback,
            alert_threshold: args.threshold,
        };
        let timestamp = Utc::now();
        let result = match self.engine.evaluate_with(text, options).await {
            Ok(result) => result,
            Err(DriftError::Storage {
                source,
                result: Some(scored),
            }) => {
                warn!(
                    similarity_score = scored.similarity_score,
                    drift_score = scored.drift_score,
                    alert = scored.alert,
                    "response scored but not stored"
                );
                return Err(anyhow::Error::new(source).context(format!(
                    "response scored (drift {:.4}) but could not be stored",
                    scored.drift_score
                )));
            }
            Err(e) => return Err(e).context("evaluation failed"),
        };

        let _ = self
            .history
            .record(&DriftRecord {
                id: None,
                timestamp,
                query: args.query.clone(),
                response: result.new_response.clone(),
                similarity_score: result.similarity_score,
                drift_score: result.drift_score,
                alert: result.alert,
            })
            .context("failed to record drift history")?;

        Ok(EvaluationReport {
            timestamp,
            query: args.query.clone(),
            result,
        })
    }

    /// Most recent history records, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<DriftRecord>> {
        self.history.recent(limit).context("failed to read drift history")
    }

    /// Index, log and history counts.
    pub async fn stats(&self) -> Result<StatsReport> {
        let stats = self.engine.stats().await?;
        Ok(StatsReport {
            indexed: stats.indexed,
            logged: stats.logged,
            history: self.history.count()?,
        })
    }
}

/// Resolve the response text from the positional argument or stdin.
pub fn read_input(args: &EvaluateArgs, mut stdin: impl Read) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if args.stdin {
        let mut text = String::new();
        let _ = stdin.read_to_string(&mut text).context("failed to read stdin")?;
        return Ok(text.trim_end_matches(['\n', '\r']).to_string());
    }
    bail!("no response given; pass TEXT or --stdin")
}

/// Settings file to load.
pub fn settings_file(explicit: Option<&PathBuf>) -> PathBuf {
    explicit.cloned().unwrap_or_else(lucy_settings::settings_path)
}
