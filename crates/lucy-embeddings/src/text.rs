//! Text normalization ahead of embedding.

use crate::errors::{EmbeddingError, Result};

/// Trim and collapse runs of whitespace to a single space.
///
/// Fails with [`EmbeddingError::EmptyInput`] when nothing is left.
pub fn normalize_text(text: &str) -> Result<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    Ok(normalized)
}

/// Split text into lower-cased alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
