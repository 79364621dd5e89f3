//! Stored record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable response in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Dense, zero-based position in the log.
    pub sequence_index: u64,
    /// The response text as evaluated.
    pub response_text: String,
}

/// Identity of the embedder whose vectors a store holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedderFingerprint {
    /// Model configuration identifier.
    pub model_id: String,
    /// Vector dimensions.
    pub dimensions: usize,
}

impl std::fmt::Display for EmbedderFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}d)", self.model_id, self.dimensions)
    }
}

/// A recorded evaluation, as kept by [`crate::DriftHistory`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftRecord {
    /// Row id, set once the record has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// When the evaluation ran.
    pub timestamp: DateTime<Utc>,
    /// Prompt that produced the response, if the caller supplied one.
    #[serde(default)]
    pub query: Option<String>,
    /// The evaluated response.
    pub response: String,
    /// Similarity to the best prior match.
    pub similarity_score: f64,
    /// `1 - similarity_score`.
    pub drift_score: f64,
    /// Whether the drift exceeded the alert threshold.
    #[serde(default)]
    pub alert: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_display() {
        let fp = EmbedderFingerprint {
            model_id: "lucy/feature-hash-v2/384".into(),
            dimensions: 384,
        };
        assert_eq!(fp.to_string(), "lucy/feature-hash-v2/384 (384d)");
    }

    #[test]
    fn drift_record_json_shape() {
        let record = DriftRecord {
            id: None,
            timestamp: "2026-01-02T03:04:05Z".parse().unwrap(),
            query: Some("What colour is the sky?".into()),
            response: "The sky is blue.".into(),
            similarity_score: 0.75,
            drift_score: 0.25,
            alert: false,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["query"], "What colour is the sky?");
        assert_eq!(json["similarity_score"], 0.75);
        assert_eq!(json["drift_score"], 0.25);
        assert_eq!(json["timestamp"], "2026-01-02T03:04:05Z");
    }
}
