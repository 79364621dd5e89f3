//! ONNX Runtime embedding service (feature-gated behind `ort`).
//!
//! Downloads `all-MiniLM-L6-v2` via `hf-hub`, tokenizes with `tokenizers`,
//! runs the transformer via `ort`, then mean-pools the token states under the
//! attention mask and L2-normalizes the result.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::EmbeddingConfig;
use crate::errors::{EmbeddingError, Result};
use crate::normalize::l2_normalize;
use crate::service::{EmbeddingService, validate_embedding};
use crate::text::normalize_text;

struct InferenceState {
    session: ort::session::Session,
    tokenizer: tokenizers::Tokenizer,
}

/// ONNX-based sentence embedder.
pub struct OnnxEmbeddingService {
    config: EmbeddingConfig,
    model_id: String,
    state: Arc<parking_lot::Mutex<Option<InferenceState>>>,
    ready: AtomicBool,
}

impl OnnxEmbeddingService {
    /// Create a new ONNX embedding service (not yet initialized).
    pub fn new(config: EmbeddingConfig) -> Self {
        let model_id = format!("{}/{}", config.model, config.dimensions);
        Self {
            config,
            model_id,
            state: Arc::new(parking_lot::Mutex::new(None)),
            ready: AtomicBool::new(false),
        }
    }

    /// Download model + tokenizer and create the ONNX session.
    pub async fn initialize(&self) -> Result<()> {
        let state = tokio::task::spawn_blocking({
            let config = self.config.clone();
            move || load_state(&config)
        })
        .await
        .map_err(|e| EmbeddingError::Internal(format!("join error: {e}")))??;

        *self.state.lock() = Some(state);
        self.ready.store(true, Ordering::SeqCst);

        info!(model = %self.config.model, dims = self.config.dimensions, "ONNX embedding service ready");
        Ok(())
    }

    /// Local model cache directory.
    pub fn model_path(&self) -> PathBuf {
        self.config.resolved_cache_dir()
    }
}

fn load_state(config: &EmbeddingConfig) -> Result<InferenceState> {
    let (model_path, tokenizer_path) = download_model(config)?;

    info!(model = %model_path.display(), "loading ONNX model");

    let mut tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| EmbeddingError::ModelInit(format!("tokenizer load: {e}")))?;
    let _ = tokenizer
        .with_truncation(Some(tokenizers::TruncationParams {
            max_length: config.max_sequence_length,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::ModelInit(format!("truncation: {e}")))?;
    let _ = tokenizer.with_padding(None);

    let session = ort::session::Session::builder()
        .map_err(|e| EmbeddingError::ModelInit(format!("session builder: {e}")))?
        .with_intra_threads(config.intra_threads)
        .map_err(|e| EmbeddingError::ModelInit(format!("thread config: {e}")))?
        .with_log_level(ort::logging::LogLevel::Warning)
        .map_err(|e| EmbeddingError::ModelInit(format!("log level: {e}")))?
        .commit_from_file(&model_path)
        .map_err(|e| EmbeddingError::ModelInit(format!("model load: {e}")))?;

    Ok(InferenceState { session, tokenizer })
}

/// Download model files via `hf-hub`, returning (`model_path`, `tokenizer_path`).
fn download_model(config: &EmbeddingConfig) -> Result<(PathBuf, PathBuf)> {
    let cache_dir = config.resolved_cache_dir();
    debug!(cache_dir = %cache_dir.display(), model = %config.model, "fetching model via hf-hub");

    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_cache_dir(cache_dir)
        .build()
        .map_err(|e| EmbeddingError::ModelInit(format!("hf-hub api: {e}")))?;

    let repo = api.model(config.model.clone());

    let model_path = repo
        .get("onnx/model.onnx")
        .map_err(|e| EmbeddingError::ModelInit(format!("model download: {e}")))?;
    let tokenizer_path = repo
        .get("tokenizer.json")
        .map_err(|e| EmbeddingError::ModelInit(format!("tokenizer download: {e}")))?;

    info!(model = %model_path.display(), tokenizer = %tokenizer_path.display(), "model files ready");
    Ok((model_path, tokenizer_path))
}

fn run_inference(
    state: &mut InferenceState,
    texts: &[String],
    dims: usize,
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let encodings = state
        .tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| EmbeddingError::Inference(format!("tokenize: {e}")))?;

    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);
    if max_len == 0 {
        return Err(EmbeddingError::Inference("empty tokenization".into()));
    }

    let batch_size = texts.len();
    let mut input_ids = vec![0i64; batch_size * max_len];
    let mut attention_mask = vec![0i64; batch_size * max_len];
    let mut token_type_ids = vec![0i64; batch_size * max_len];

    for (i, enc) in encodings.iter().enumerate() {
        let offset = i * max_len;
        for (j, &id) in enc.get_ids().iter().enumerate() {
            input_ids[offset + j] = i64::from(id);
        }
        for (j, &m) in enc.get_attention_mask().iter().enumerate() {
            attention_mask[offset + j] = i64::from(m);
        }
        for (j, &t) in enc.get_type_ids().iter().enumerate() {
            token_type_ids[offset + j] = i64::from(t);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    let shape = vec![batch_size as i64, max_len as i64];

    let input_ids_tensor = ort::value::Tensor::from_array((shape.clone(), input_ids))
        .map_err(|e| EmbeddingError::Inference(format!("input_ids tensor: {e}")))?;
    let attention_mask_tensor =
        ort::value::Tensor::from_array((shape.clone(), attention_mask.clone()))
            .map_err(|e| EmbeddingError::Inference(format!("attention_mask tensor: {e}")))?;
    let token_type_ids_tensor = ort::value::Tensor::from_array((shape, token_type_ids))
        .map_err(|e| EmbeddingError::Inference(format!("token_type_ids tensor: {e}")))?;

    let outputs = state
        .session
        .run(ort::inputs![
            input_ids_tensor,
            attention_mask_tensor,
            token_type_ids_tensor
        ])
        .map_err(|e| EmbeddingError::Inference(format!("inference: {e}")))?;

    // last_hidden_state: [batch, seq, hidden]
    let (output_shape, output_data) = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|e| EmbeddingError::Inference(format!("extract tensor: {e}")))?;

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let out_dims: Vec<usize> = output_shape.iter().map(|&d| d as usize).collect();
    if out_dims.len() != 3 || out_dims[0] != batch_size {
        return Err(EmbeddingError::Inference(format!(
            "unexpected output shape: {output_shape:?}"
        )));
    }
    let seq_len_out = out_dims[1];
    let hidden_dim = out_dims[2];

    let mut results = Vec::with_capacity(batch_size);
    for i in 0..batch_size {
        let mut embedding = mean_pool(
            output_data,
            &attention_mask[i * max_len..(i + 1) * max_len],
            i,
            seq_len_out,
            hidden_dim,
        );
        l2_normalize(&mut embedding);
        validate_embedding(&embedding, dims)?;
        results.push(embedding);
    }

    Ok(results)
}

/// Average the hidden states of unmasked tokens for batch item `batch_idx`.
#[allow(clippy::cast_precision_loss)]
fn mean_pool(
    data: &[f32],
    mask: &[i64],
    batch_idx: usize,
    seq_len: usize,
    hidden_dim: usize,
) -> Vec<f32> {
    let mut pooled = vec![0.0_f32; hidden_dim];
    let mut count = 0_usize;
    for (j, &m) in mask.iter().enumerate().take(seq_len) {
        if m == 0 {
            continue;
        }
        let base = batch_idx * seq_len * hidden_dim + j * hidden_dim;
        for (acc, x) in pooled.iter_mut().zip(&data[base..base + hidden_dim]) {
            *acc += x;
        }
        count += 1;
    }
    if count > 0 {
        let denom = count as f32;
        for x in &mut pooled {
            *x /= denom;
        }
    }
    pooled
}

#[async_trait]
impl EmbeddingService for OnnxEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.is_ready() {
            return Err(EmbeddingError::NotReady);
        }
        let texts = texts
            .iter()
            .map(|t| normalize_text(t))
            .collect::<Result<Vec<_>>>()?;

        let state = Arc::clone(&self.state);
        let dims = self.config.dimensions;
        tokio::task::spawn_blocking(move || {
            let mut guard = state.lock();
            let state = guard.as_mut().ok_or(EmbeddingError::NotReady)?;
            run_inference(state, &texts, dims)
        })
        .await
        .map_err(|e| EmbeddingError::Internal(format!("join error: {e}")))?
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
