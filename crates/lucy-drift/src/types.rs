//! Engine configuration and result types.

use lucy_settings::EngineSettings;
use serde::{Deserialize, Serialize};

use crate::errors::{DriftError, Result};

/// A prior response scored against the query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Position of the prior response in the log.
    pub sequence_index: u64,
    /// The prior response text.
    pub response_text: String,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub similarity: f32,
}

/// Outcome of one evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    /// The evaluated response.
    pub new_response: String,
    /// Most similar prior response, `None` when there was no history.
    pub best_match: Option<ScoredCandidate>,
    /// Similarity of the best match, `0.0` with no history.
    pub similarity_score: f64,
    /// `1 - similarity_score`.
    pub drift_score: f64,
    /// `drift_score > alert_threshold`, never raised with no history.
    pub alert: bool,
    /// Every re-ranked candidate, best first.
    pub candidates: Vec<ScoredCandidate>,
    /// Position assigned to the new response; `None` if the append failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_index: Option<u64>,
}

/// Strict alert policy: drift exactly at the threshold does not alert.
pub fn is_alert(drift_score: f64, alert_threshold: f64) -> bool {
    drift_score > alert_threshold
}

/// Engine-wide evaluation defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftConfig {
    /// Candidates shortlisted per evaluation.
    pub lookback: usize,
    /// Drift score above which an alert is raised.
    pub alert_threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self::from_settings(&EngineSettings::default())
    }
}

impl DriftConfig {
    /// Build from engine settings.
    pub fn from_settings(s: &EngineSettings) -> Self {
        Self {
            lookback: s.lookback,
            alert_threshold: s.alert_threshold,
        }
    }

    /// Reject a zero lookback or a threshold outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        validate_lookback(self.lookback)?;
        validate_threshold(self.alert_threshold)
    }
}

/// Per-call overrides for [`crate::DriftEngine::evaluate_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EvaluateOptions {
    /// Overrides [`DriftConfig::lookback`].
    pub lookback: Option<usize>,
    /// Overrides [`DriftConfig::alert_threshold`].
    pub alert_threshold: Option<f64>,
}

impl EvaluateOptions {
    pub(crate) fn resolve(self, defaults: &DriftConfig) -> Result<DriftConfig> {
        let resolved = DriftConfig {
            lookback: self.lookback.unwrap_or(defaults.lookback),
            alert_threshold: self.alert_threshold.unwrap_or(defaults.alert_threshold),
        };
        resolved.validate()?;
        Ok(resolved)
    }
}

/// Entry counts on both sides of the alignment invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Vectors in the index.
    pub indexed: u64,
    /// Entries in the response log.
    pub logged: u64,
}

fn validate_lookback(lookback: usize) -> Result<()> {
    if lookback == 0 {
        return Err(DriftError::InvalidArgument("lookback must be at least 1".into()));
    }
    Ok(())
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(DriftError::InvalidArgument(format!(
            "alert threshold must be in [0, 1], got {threshold}"
        )));
    }
    Ok(())
}
