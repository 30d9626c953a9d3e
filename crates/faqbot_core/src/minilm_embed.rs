use anyhow::{anyhow, ensure, Context, Result};
use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::{Embedding, LayerNorm, Linear, VarBuilder};
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use crate::embed::EmbeddingProvider;

// all-MiniLM-L6-v2 and -L12-v2 share everything but depth.
const HIDDEN: usize = 384;
const INTERMEDIATE: usize = 1536;
const HEADS: usize = 12;
const VOCAB: usize = 30522;
const MAX_POSITIONS: usize = 512;
const TYPE_VOCAB: usize = 2;
const LAYER_NORM_EPS: f64 = 1e-12;
const MAX_SEQ_LEN: usize = 256;
const MAX_LAYERS: usize = 48;

struct SelfAttention {
    query: Linear,
    key: Linear,
    value: Linear,
    out: Linear,
    norm: LayerNorm,
}

impl SelfAttention {
    fn load(vb: VarBuilder) -> Result<Self> {
        let inner = vb.pp("self");
        Ok(Self {
            query: candle_nn::linear(HIDDEN, HIDDEN, inner.pp("query"))?,
            key: candle_nn::linear(HIDDEN, HIDDEN, inner.pp("key"))?,
            value: candle_nn::linear(HIDDEN, HIDDEN, inner.pp("value"))?,
            out: candle_nn::linear(HIDDEN, HIDDEN, vb.pp("output").pp("dense"))?,
            norm: candle_nn::layer_norm(HIDDEN, LAYER_NORM_EPS, vb.pp("output").pp("LayerNorm"))?,
        })
    }

    fn split_heads(&self, x: Tensor, seq_len: usize) -> Result<Tensor> {
        Ok(x
            .reshape((1, seq_len, HEADS, HIDDEN / HEADS))?
            .transpose(1, 2)?
            .contiguous()?)
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let (_, seq_len, _) = x.dims3()?;
        let q = self.split_heads(self.query.forward(x)?, seq_len)?;
        let k = self.split_heads(self.key.forward(x)?, seq_len)?;
        let v = self.split_heads(self.value.forward(x)?, seq_len)?;

        let scale = 1.0 / ((HIDDEN / HEADS) as f64).sqrt();
        let weights = q.matmul(&k.t()?)?.affine(scale, 0.0)?;
        let weights = candle_nn::ops::softmax_last_dim(&weights)?;
        let ctx = weights
            .matmul(&v)?
            .transpose(1, 2)?
            .contiguous()?
            .reshape((1, seq_len, HIDDEN))?;

        Ok(self.norm.forward(&(x + self.out.forward(&ctx)?)?)?)
    }
}

struct EncoderLayer {
    attention: SelfAttention,
    up: Linear,
    down: Linear,
    norm: LayerNorm,
}

impl EncoderLayer {
    fn load(vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            attention: SelfAttention::load(vb.pp("attention"))?,
            up: candle_nn::linear(HIDDEN, INTERMEDIATE, vb.pp("intermediate").pp("dense"))?,
            down: candle_nn::linear(INTERMEDIATE, HIDDEN, vb.pp("output").pp("dense"))?,
            norm: candle_nn::layer_norm(HIDDEN, LAYER_NORM_EPS, vb.pp("output").pp("LayerNorm"))?,
        })
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let x = self.attention.forward(x)?;
        let h = self.down.forward(&self.up.forward(&x)?.gelu_erf()?)?;
        Ok(self.norm.forward(&(x + h)?)?)
    }
}

struct MiniLm {
    words: Embedding,
    positions: Embedding,
    token_types: Embedding,
    embed_norm: LayerNorm,
    layers: Vec<EncoderLayer>,
    device: Device,
}

impl MiniLm {
    fn load(path: &Path, device: &Device) -> Result<Self> {
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)? };
        // Some exports nest the encoder under `bert.`.
        let vb = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            vb.pp("bert")
        } else {
            vb
        };

        let depth = (0..MAX_LAYERS)
            .take_while(|i| {
                vb.contains_tensor(&format!("encoder.layer.{i}.attention.self.query.weight"))
            })
            .count();
        ensure!(
            depth > 0,
            "{} does not look like a MiniLM/BERT encoder",
            path.display()
        );

        let emb = vb.pp("embeddings");
        let layers = (0..depth)
            .map(|i| EncoderLayer::load(vb.pp("encoder").pp("layer").pp(i.to_string())))
            .collect::<Result<Vec<_>>>()?;
        info!(layers = depth, "loaded MiniLM encoder");

        Ok(Self {
            words: candle_nn::embedding(VOCAB, HIDDEN, emb.pp("word_embeddings"))?,
            positions: candle_nn::embedding(MAX_POSITIONS, HIDDEN, emb.pp("position_embeddings"))?,
            token_types: candle_nn::embedding(TYPE_VOCAB, HIDDEN, emb.pp("token_type_embeddings"))?,
            embed_norm: candle_nn::layer_norm(HIDDEN, LAYER_NORM_EPS, emb.pp("LayerNorm"))?,
            layers,
            device: device.clone(),
        })
    }

    /// Mean-pooled, L2-normalized sentence embedding.
    fn encode(&self, ids: &[u32]) -> Result<Vec<f32>> {
        let seq_len = ids.len();
        ensure!(seq_len > 0, "empty token sequence");
        ensure!(
            seq_len <= MAX_POSITIONS,
            "input length {seq_len} exceeds max {MAX_POSITIONS}"
        );

        let ids = Tensor::new(ids, &self.device)?;
        let positions = Tensor::arange(0u32, seq_len as u32, &self.device)?;
        let types = Tensor::zeros(seq_len, DType::U32, &self.device)?;

        let hidden = ((self.words.forward(&ids)? + self.positions.forward(&positions)?)?
            + self.token_types.forward(&types)?)?;
        let mut hidden = self.embed_norm.forward(&hidden)?.unsqueeze(0)?;
        for layer in &self.layers {
            hidden = layer.forward(&hidden)?;
        }

        let pooled = hidden.mean(1)?.squeeze(0)?;
        let norm = pooled.sqr()?.sum_keepdim(D::Minus1)?.sqrt()?;
        let pooled = pooled.broadcast_div(&norm.clamp(1e-12f32, f32::MAX)?)?;
        Ok(pooled.to_vec1::<f32>()?)
    }
}

/// Local sentence-transformer embeddings (all-MiniLM family) on CPU.
pub struct MiniLmEmbeddingProvider {
    model: MiniLm,
    tokenizer: Tokenizer,
}

impl MiniLmEmbeddingProvider {
    pub fn load(model_path: &Path, tokenizer_path: &Path) -> Result<Self> {
        let model = MiniLm::load(model_path, &Device::Cpu)
            .with_context(|| format!("load model {}", model_path.display()))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("load tokenizer {}: {e}", tokenizer_path.display()))?;
        tokenizer
            .with_padding(None)
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("configure tokenizer: {e}"))?;

        Ok(Self { model, tokenizer })
    }
}

impl EmbeddingProvider for MiniLmEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenize: {e}"))?;
        self.model.encode(encoding.get_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::cosine_similarity;
    use std::path::PathBuf;

    fn model_files() -> Option<(PathBuf, PathBuf)> {
        let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models");
        ["all-MiniLM-L12-v2", "all-MiniLM-L6-v2"]
            .iter()
            .map(|name| {
                (
                    base.join(format!("{name}.safetensors")),
                    base.join(format!("{name}-tokenizer.json")),
                )
            })
            .find(|(m, t)| m.exists() && t.exists())
    }

    #[test]
    fn minilm_embeds_unit_vectors() {
        let Some((model, tokenizer)) = model_files() else {
            eprintln!("Skipping: no all-MiniLM model under models/");
            return;
        };
        let provider = MiniLmEmbeddingProvider::load(&model, &tokenizer).unwrap();
        let embedding = provider.embed("How do I reset my PIN?").unwrap();

        assert_eq!(embedding.len(), HIDDEN);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01, "L2 norm should be ~1.0, got {norm}");
    }

    #[test]
    fn minilm_separates_related_from_unrelated() {
        let Some((model, tokenizer)) = model_files() else {
            eprintln!("Skipping: no all-MiniLM model under models/");
            return;
        };
        let provider = MiniLmEmbeddingProvider::load(&model, &tokenizer).unwrap();

        let faq = provider
            .embed("How do I reset my PIN? Go to Settings > Security > Reset PIN.")
            .unwrap();
        let related = provider.embed("forgot my pin").unwrap();
        let unrelated = provider.embed("what is the weather today").unwrap();

        let sim_related = cosine_similarity(&faq, &related);
        let sim_unrelated = cosine_similarity(&faq, &unrelated);
        assert!(sim_related > sim_unrelated);
        assert!(sim_related >= 0.2, "related similarity {sim_related}");
    }

    #[test]
    fn long_input_is_truncated_not_rejected() {
        let Some((model, tokenizer)) = model_files() else {
            eprintln!("Skipping: no all-MiniLM model under models/");
            return;
        };
        let provider = MiniLmEmbeddingProvider::load(&model, &tokenizer).unwrap();
        let long = "account ".repeat(2000);
        assert_eq!(provider.embed(&long).unwrap().len(), HIDDEN);
    }
}
