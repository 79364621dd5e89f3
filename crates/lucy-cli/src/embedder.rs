//! Embedder selection from settings.

use std::sync::Arc;

use anyhow::Result;
use lucy_embeddings::{EmbeddingService, HashEmbeddingService};
use lucy_settings::{EmbeddingProvider, EmbeddingSettings};
use tracing::info;

/// Build and initialize the configured embedder.
pub async fn build_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingService>> {
    info!(provider = ?settings.provider, dims = settings.dimensions, "building embedder");
    match settings.provider {
        EmbeddingProvider::Hash => Ok(Arc::new(HashEmbeddingService::new(settings.dimensions))),
        EmbeddingProvider::Onnx => onnx_embedder(settings).await,
    }
}

#[cfg(feature = "onnx")]
async fn onnx_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingService>> {
    use anyhow::Context;
    use lucy_embeddings::{EmbeddingConfig, OnnxEmbeddingService};

    let service = OnnxEmbeddingService::new(EmbeddingConfig::from_settings(settings));
    service
        .initialize()
        .await
        .context("failed to initialize ONNX embedder")?;
    Ok(Arc::new(service))
}

#[cfg(not(feature = "onnx"))]
#[allow(clippy::unused_async)]
async fn onnx_embedder(_settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingService>> {
    anyhow::bail!("lucy was built without ONNX support; rebuild with `--features onnx` or pass `--provider hash`")
}
