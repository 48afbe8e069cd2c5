use crate::settings::ModelSettings;
use antiprompt_core::{Error, Result};
use antiprompt_lexicon::{MaskFiller, MaskPrediction};
use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{LayerNorm, Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::{AddedToken, Tokenizer, TruncationDirection};

/// Special tokens registered on tokenizers built from a bare `vocab.txt`
const BERT_SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

/// Masked-language-model dimensions read from `config.json`
#[derive(Debug, Deserialize)]
struct HeadDims {
    hidden_size: usize,
    vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    layer_norm_eps: f64,
}

fn default_layer_norm_eps() -> f64 {
    1e-12
}

/// Prediction head on top of the BERT encoder: transform, normalize, then
/// project onto the vocabulary
struct MlmHead {
    dense: Linear,
    layer_norm: LayerNorm,
    decoder: Linear,
}

impl MlmHead {
    fn forward(&self, hidden: &Tensor) -> candle_core::Result<Tensor> {
        let transformed = self.dense.forward(hidden)?.gelu_erf()?;
        let normalized = self.layer_norm.forward(&transformed)?;
        self.decoder.forward(&normalized)
    }
}

/// Candle BERT model answering fill-mask queries.
///
/// Inference runs on the blocking pool so a forward pass never stalls the
/// async workers.
pub struct BertMaskFiller {
    name: String,
    model: Arc<MaskModel>,
}

/// Loaded weights, tokenizer and device shared with blocking inference tasks
struct MaskModel {
    model: BertModel,
    head: MlmHead,
    tokenizer: Tokenizer,
    device: Device,
    mask_token: String,
    mask_id: u32,
    max_length: usize,
}

impl BertMaskFiller {
    /// Resolve the model from a local directory or the HuggingFace hub and
    /// load it onto the configured device.
    pub fn load(settings: &ModelSettings, mask_token: &str) -> Result<Self> {
        let model_dir = resolve_model_dir(settings)?;
        let name = match &settings.local_path {
            Some(path) => path.display().to_string(),
            None => settings.repo_id.clone(),
        };
        Self::from_dir(
            name,
            &model_dir,
            &settings.device,
            mask_token,
            settings.max_length,
        )
    }

    /// Load from a directory holding `config.json`, `model.safetensors` and
    /// a tokenizer.
    pub fn from_dir(
        name: impl Into<String>,
        model_dir: &Path,
        device: &str,
        mask_token: &str,
        max_length: usize,
    ) -> Result<Self> {
        let name = name.into();
        let device = get_device(device)?;

        let config_path = model_dir.join("config.json");
        let bert_config: BertConfig = parse_json_config(&config_path)?;
        let dims: HeadDims = parse_json_config(&config_path)?;

        let tokenizer = load_tokenizer(model_dir)?;
        let mask_id = tokenizer.token_to_id(mask_token).ok_or_else(|| {
            Error::model(format!(
                "Mask token '{}' is not in the tokenizer vocabulary",
                mask_token
            ))
        })?;

        let vb = load_var_builder(model_dir, &device)?;
        let model = load_bert_backbone(&vb, &bert_config, &["bert", ""])?;
        let head = load_mlm_head(&vb, &dims)?;

        tracing::info!(
            "Loaded fill-mask model '{}' ({} vocab entries, mask id {})",
            name,
            dims.vocab_size,
            mask_id
        );

        Ok(Self {
            name,
            model: Arc::new(MaskModel {
                model,
                head,
                tokenizer,
                device,
                mask_token: mask_token.to_string(),
                mask_id,
                max_length: max_length.max(1),
            }),
        })
    }
}

impl MaskModel {
    /// Vocabulary logits at the masked position
    fn mask_logits(&self, text: &str) -> Result<Tensor> {
        let mut encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(model_error("Tokenization failed"))?;

        encoding.truncate(self.max_length, 0, TruncationDirection::Right);

        let position = encoding
            .get_ids()
            .iter()
            .position(|&id| id == self.mask_id)
            .ok_or_else(|| {
                Error::model(format!("No {} token in input: {:?}", self.mask_token, text))
            })?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)
            .map_err(model_error("Failed to create input tensor"))?
            .unsqueeze(0)
            .map_err(model_error("Failed to unsqueeze"))?;

        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)
            .map_err(model_error("Failed to create token type tensor"))?
            .unsqueeze(0)
            .map_err(model_error("Failed to unsqueeze"))?;

        let hidden_states = self
            .model
            .forward(&input_ids, &token_type_ids, None)
            .map_err(model_error("Model forward pass failed"))?;

        let masked = hidden_states
            .i((0, position))
            .map_err(model_error("Failed to get masked position"))?
            .unsqueeze(0)
            .map_err(model_error("Failed to unsqueeze masked position"))?;

        self.head
            .forward(&masked)
            .map_err(model_error("Prediction head failed"))
    }

    /// Best `top_k` tokens for the masked position
    fn predict(&self, text: &str, top_k: usize) -> Result<Vec<MaskPrediction>> {
        let logits = self.mask_logits(text)?;
        let probs = to_probabilities(&logits)?;

        let mut predictions = Vec::with_capacity(top_k);
        for (id, score) in top_candidates(&probs, top_k) {
            let token = self
                .tokenizer
                .decode(&[id], true)
                .map_err(model_error("Failed to decode token"))?;
            predictions.push(MaskPrediction::new(token.trim(), score));
        }

        tracing::debug!("fill-mask '{}' -> {:?}", text, predictions);
        Ok(predictions)
    }
}

#[async_trait]
impl MaskFiller for BertMaskFiller {
    async fn fill_mask(&self, text: &str, top_k: usize) -> Result<Vec<MaskPrediction>> {
        let model = self.model.clone();
        let text = text.to_string();
        run_blocking(move || model.predict(&text, top_k)).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn mask_token(&self) -> &str {
        &self.model.mask_token
    }
}

/// Run CPU-bound model work on the blocking pool
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(model_error("Inference task failed"))?
}

fn model_error<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::model(format!("{}: {}", context, e))
}

/// Local directory when configured, otherwise a hub download into the
/// antiprompt cache
fn resolve_model_dir(settings: &ModelSettings) -> Result<PathBuf> {
    if let Some(path) = &settings.local_path {
        if !path.exists() {
            return Err(Error::model(format!(
                "Model path does not exist: {}",
                path.display()
            )));
        }
        return Ok(path.clone());
    }

    download_from_huggingface(&settings.repo_id, &settings.revision)
}

fn download_from_huggingface(repo: &str, revision: &str) -> Result<PathBuf> {
    tracing::info!("Downloading model from HuggingFace: {}@{}", repo, revision);

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("antiprompt/models");

    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_cache_dir(cache_dir)
        .build()
        .map_err(model_error("Failed to initialize HuggingFace API"))?;

    let repo_obj = api.repo(hf_hub::Repo::with_revision(
        repo.to_string(),
        hf_hub::RepoType::Model,
        revision.to_string(),
    ));

    repo_obj
        .get("model.safetensors")
        .map_err(model_error("Failed to download model.safetensors"))?;

    let found_tokenizer = ["tokenizer.json", "vocab.txt"].iter().any(|file| {
        match repo_obj.get(file) {
            Ok(_) => {
                tracing::debug!("Found tokenizer file: {}", file);
                true
            }
            Err(_) => {
                tracing::debug!("File not found: {}", file);
                false
            }
        }
    });

    if !found_tokenizer {
        return Err(Error::model(
            "No tokenizer found (tried tokenizer.json, vocab.txt)",
        ));
    }

    let config_path = repo_obj
        .get("config.json")
        .map_err(model_error("Failed to download config.json"))?;

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::model("Invalid cache path"))?;

    tracing::info!("Model available at: {}", model_dir.display());
    Ok(model_dir.to_path_buf())
}

fn get_device(device_str: &str) -> Result<Device> {
    match device_str.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0).map_err(model_error("Failed to initialize CUDA")),
        "mps" | "metal" => Device::new_metal(0).map_err(model_error("Failed to initialize Metal")),
        _ => Ok(Device::Cpu),
    }
}

fn parse_json_config<T: DeserializeOwned>(config_path: &Path) -> Result<T> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        Error::model(format!(
            "Failed to read config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&config_str).map_err(|e| {
        Error::model(format!(
            "Failed to parse config {}: {}",
            config_path.display(),
            e
        ))
    })
}

fn load_var_builder(model_path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_path.join("model.safetensors");
    if !weights_path.exists() {
        return Err(Error::model(format!(
            "model.safetensors not found in {}",
            model_path.display()
        )));
    }

    // SAFETY: the weights file is only read and stays in place while mapped.
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
            .map_err(model_error("Failed to load weights"))?
    };

    Ok(vb)
}

fn load_bert_backbone(vb: &VarBuilder, config: &BertConfig, prefixes: &[&str]) -> Result<BertModel> {
    let mut errors = Vec::new();

    for prefix in prefixes {
        let vb_prefix = if prefix.is_empty() {
            vb.clone()
        } else {
            vb.pp(prefix)
        };
        let shown = if prefix.is_empty() { "<root>" } else { prefix };

        match BertModel::load(vb_prefix, config) {
            Ok(model) => {
                tracing::info!("Loaded BERT backbone from '{}'", shown);
                return Ok(model);
            }
            Err(e) => errors.push(format!("{}: {}", shown, e)),
        }
    }

    Err(Error::model(format!(
        "Failed to load BERT backbone with tried prefixes [{}]",
        errors.join(" | ")
    )))
}

/// Checkpoints differ in LayerNorm parameter names and in whether the
/// decoder is stored or tied to the word embeddings.
fn load_mlm_head(vb: &VarBuilder, dims: &HeadDims) -> Result<MlmHead> {
    let predictions = vb.pp("cls.predictions");
    let transform = predictions.pp("transform");

    let dense = candle_nn::linear(dims.hidden_size, dims.hidden_size, transform.pp("dense"))
        .map_err(model_error("Failed to load prediction transform"))?;

    let ln = transform.pp("LayerNorm");
    let layer_norm = match (
        ln.get(dims.hidden_size, "weight"),
        ln.get(dims.hidden_size, "bias"),
    ) {
        (Ok(weight), Ok(bias)) => LayerNorm::new(weight, bias, dims.layer_norm_eps),
        _ => {
            let gamma = ln
                .get(dims.hidden_size, "gamma")
                .map_err(model_error("Failed to load prediction LayerNorm"))?;
            let beta = ln
                .get(dims.hidden_size, "beta")
                .map_err(model_error("Failed to load prediction LayerNorm"))?;
            LayerNorm::new(gamma, beta, dims.layer_norm_eps)
        }
    };

    let shape = (dims.vocab_size, dims.hidden_size);
    let weight = predictions
        .pp("decoder")
        .get(shape, "weight")
        .or_else(|_| {
            tracing::debug!("Decoder weights tied to word embeddings");
            vb.pp("bert.embeddings.word_embeddings").get(shape, "weight")
        })
        .map_err(model_error("Failed to load decoder weights"))?;
    let bias = predictions
        .get(dims.vocab_size, "bias")
        .or_else(|_| predictions.pp("decoder").get(dims.vocab_size, "bias"))
        .map_err(model_error("Failed to load decoder bias"))?;

    Ok(MlmHead {
        dense,
        layer_norm,
        decoder: Linear::new(weight, Some(bias)),
    })
}

fn load_tokenizer(model_path: &Path) -> Result<Tokenizer> {
    let tokenizer_json_path = model_path.join("tokenizer.json");
    if tokenizer_json_path.exists() {
        tracing::debug!("Loading tokenizer from tokenizer.json");
        return Tokenizer::from_file(&tokenizer_json_path)
            .map_err(model_error("Failed to load tokenizer.json"));
    }

    let vocab_path = model_path.join("vocab.txt");
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(model_error("Failed to build WordPiece model"))?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

        let specials: Vec<AddedToken> = BERT_SPECIAL_TOKENS
            .iter()
            .map(|token| AddedToken::from(*token, true))
            .collect();
        tokenizer.add_special_tokens(&specials);

        let sep = ("[SEP]".to_string(), tokenizer.token_to_id("[SEP]").unwrap_or(102));
        let cls = ("[CLS]".to_string(), tokenizer.token_to_id("[CLS]").unwrap_or(101));
        tokenizer.with_post_processor(Some(BertProcessing::new(sep, cls)));

        return Ok(tokenizer);
    }

    Err(Error::model(format!(
        "No tokenizer found in {:?} (tried tokenizer.json, vocab.txt)",
        model_path
    )))
}

fn to_probabilities(logits: &Tensor) -> Result<Vec<f32>> {
    candle_nn::ops::softmax(logits, D::Minus1)
        .map_err(model_error("Softmax failed"))?
        .squeeze(0)
        .map_err(model_error("Squeeze failed"))?
        .to_vec1()
        .map_err(model_error("Failed to convert to vec"))
}

/// Token ids of the `k` highest probabilities, best first
fn top_candidates(probs: &[f32], k: usize) -> Vec<(u32, f32)> {
    let mut ranked: Vec<(u32, f32)> = probs
        .iter()
        .enumerate()
        .map(|(id, &p)| (id as u32, p))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}
