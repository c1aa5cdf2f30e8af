//! Model-backed embedding provider.
//!
//! [`E5Embedder`] runs a BERT-architecture sentence encoder (the multilingual
//! E5 family by default) with the Candle ML framework. Token embeddings are
//! mean-pooled over the attention mask and L2-normalized, so cosine
//! similarity between two vectors is their dot product.
//!
//! # Model directory
//!
//! A model is loaded from a directory holding the usual Hugging Face files:
//!
//! ```text
//! model_dir/
//! ├── config.json
//! ├── tokenizer.json
//! └── model.safetensors
//! ```

use super::config::E5Config;
use super::traits::{EmbedPurpose, EmbeddingProvider};
use crate::error::EmbeddingError;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use std::path::Path;
use tokenizers::tokenizer::{
    PaddingParams, PaddingStrategy, Tokenizer, TruncationDirection, TruncationParams,
    TruncationStrategy,
};
use tracing::{debug, info, instrument};

/// Architecture file inside a model directory
pub const CONFIG_FILE: &str = "config.json";
/// Tokenizer file inside a model directory
pub const TOKENIZER_FILE: &str = "tokenizer.json";
/// Weights file inside a model directory
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// The part of `config.json` needed before the model is built.
#[derive(Deserialize)]
struct ModelShape {
    hidden_size: usize,
}

/// Text handed to the model for `purpose`.
///
/// E5 checkpoints are trained with `query: ` and `passage: ` prefixes;
/// other models get the text unchanged.
pub fn prepare_input(config: &E5Config, text: &str, purpose: EmbedPurpose) -> String {
    if !config.uses_instruction_prefixes() {
        return text.to_string();
    }
    match purpose {
        EmbedPurpose::Query => format!("query: {}", text),
        EmbedPurpose::Document => format!("passage: {}", text),
    }
}

/// Sentence embedding model running locally on Candle.
///
/// # Examples
///
/// ```ignore
/// let embedder = E5Embedder::from_dir(Path::new("models/multilingual-e5-small"), E5Config::default())?;
/// let index = RetrievalIndex::new(embedder, IndexConfig::default())?;
/// ```
pub struct E5Embedder {
    model: BertModel,
    tokenizer: Tokenizer,
    config: E5Config,
    name: String,
    dimension: usize,
    device: Device,
}

impl E5Embedder {
    /// Loads `config.json`, `tokenizer.json` and `model.safetensors` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::ModelLoad` if a file is missing or invalid.
    pub fn from_dir(dir: &Path, config: E5Config) -> Result<Self, EmbeddingError> {
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read(&path).map_err(|e| {
                EmbeddingError::ModelLoad(format!("Failed to read {}: {}", path.display(), e))
            })
        };

        let config_json = String::from_utf8(read(CONFIG_FILE)?).map_err(|e| {
            EmbeddingError::ModelLoad(format!("{} is not valid UTF-8: {}", CONFIG_FILE, e))
        })?;
        let tokenizer_bytes = read(TOKENIZER_FILE)?;
        let model_bytes = read(WEIGHTS_FILE)?;

        Self::from_bytes(model_bytes, &tokenizer_bytes, &config_json, config)
    }

    /// Creates the model from in-memory files.
    ///
    /// # Arguments
    ///
    /// * `model_bytes` - Safetensors-format model weights
    /// * `tokenizer_bytes` - Serialized tokenizer JSON
    /// * `config_json` - The model's `config.json`
    /// * `config` - How the model is driven
    pub fn from_bytes(
        model_bytes: Vec<u8>,
        tokenizer_bytes: &[u8],
        config_json: &str,
        config: E5Config,
    ) -> Result<Self, EmbeddingError> {
        let shape: ModelShape = serde_json::from_str(config_json)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Invalid model config: {}", e)))?;
        let bert_config: BertConfig = serde_json::from_str(config_json)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Invalid model config: {}", e)))?;

        let tokenizer = load_tokenizer(tokenizer_bytes, config.max_sequence_length)?;

        info!(
            "Loading embedding model '{}' ({:.2}MB, {} dims)",
            config.model_id,
            model_bytes.len() as f64 / 1_000_000.0,
            shape.hidden_size
        );
        let device = select_device();
        let vb = VarBuilder::from_buffered_safetensors(model_bytes, DType::F32, &device)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Failed to create VarBuilder: {}", e)))?;
        let model = BertModel::load(vb, &bert_config)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Failed to create BertModel: {}", e)))?;

        Ok(Self {
            model,
            tokenizer,
            name: format!("local:{}", config.model_id),
            config,
            dimension: shape.hidden_size,
            device,
        })
    }

    /// Returns the driving configuration.
    pub fn config(&self) -> &E5Config {
        &self.config
    }

    /// One padded forward pass over `inputs`.
    fn embed_batch(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = self
            .tokenizer
            .encode_batch(inputs, true)
            .map_err(|e| EmbeddingError::Tokenization(e.to_string()))?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());
        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            mask.extend_from_slice(encoding.get_attention_mask());
        }
        debug!(batch, seq_len, "Running forward pass");

        let forward = || -> candle_core::Result<Vec<Vec<f32>>> {
            let input_ids = Tensor::from_vec(ids, (batch, seq_len), &self.device)?;
            let attention_mask = Tensor::from_vec(mask, (batch, seq_len), &self.device)?;
            let token_type_ids = input_ids.zeros_like()?;

            let hidden = self
                .model
                .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
            let pooled = mean_pool(&hidden, &attention_mask)?;
            let pooled = if self.config.normalize_embeddings {
                normalize_l2(&pooled)?
            } else {
                pooled
            };
            pooled.to_vec2::<f32>()
        };
        forward().map_err(|e| EmbeddingError::Inference(e.to_string()))
    }
}

impl EmbeddingProvider for E5Embedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    #[instrument(skip_all, fields(texts = texts.len()))]
    fn embed(
        &self,
        texts: &[String],
        purpose: EmbedPurpose,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size.max(1)) {
            let inputs = batch
                .iter()
                .map(|text| prepare_input(&self.config, text, purpose))
                .collect();
            vectors.extend(self.embed_batch(inputs)?);
        }
        Ok(vectors)
    }
}

/// Deserializes the tokenizer with truncation and batch padding configured.
fn load_tokenizer(bytes: &[u8], max_length: usize) -> Result<Tokenizer, EmbeddingError> {
    let mut tokenizer = Tokenizer::from_bytes(bytes)
        .map_err(|e| EmbeddingError::ModelLoad(format!("Failed to deserialize tokenizer: {}", e)))?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            stride: 0,
            strategy: TruncationStrategy::LongestFirst,
            direction: TruncationDirection::Right,
        }))
        .map_err(|e| {
            EmbeddingError::ModelLoad(format!("Failed to configure tokenizer truncation: {}", e))
        })?;

    // XLM-R vocabularies pad with `<pad>`, BERT ones with `[PAD]`
    let (pad_id, pad_token) = ["<pad>", "[PAD]"]
        .iter()
        .find_map(|&token| tokenizer.token_to_id(token).map(|id| (id, token.to_string())))
        .unwrap_or((0, "[PAD]".to_string()));
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        pad_id,
        pad_token,
        ..PaddingParams::default()
    }));

    Ok(tokenizer)
}

/// Selects the best available compute device: CUDA, then Metal, then CPU.
fn select_device() -> Device {
    if let Ok(device) = Device::new_cuda(0) {
        info!("Using CUDA GPU");
        return device;
    }
    if let Ok(device) = Device::new_metal(0) {
        info!("Using Metal GPU");
        return device;
    }
    info!("Using CPU");
    Device::Cpu
}

/// Averages token embeddings `[batch, seq, hidden]` over unmasked tokens.
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?;
    summed.broadcast_div(&counts)
}

/// Scales each row to unit length.
fn normalize_l2(v: &Tensor) -> candle_core::Result<Tensor> {
    v.broadcast_div(&v.sqr()?.sum_keepdim(1)?.sqrt()?)
}
