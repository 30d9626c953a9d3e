use anyhow::Result;

pub const DEFAULT_HASH_DIM: usize = 384;

/// Maps text to a fixed-dimension vector. Implementations must be
/// deterministic for a given model.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl EmbeddingProvider for Box<dyn EmbeddingProvider> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}

impl<E: EmbeddingProvider + ?Sized> EmbeddingProvider for &E {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}

/// Bag-of-words hashed into `dim` buckets, L2-normalized.
///
/// Needs no model files; two texts score above zero only when they share a
/// token.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dim: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(8) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn bucket(&self, token: &str) -> usize {
        // FNV-1a
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for b in token.bytes() {
            h ^= u64::from(b);
            h = h.wrapping_mul(0x0100_0000_01b3);
        }
        (h % self.dim as u64) as usize
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dim];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            v[self.bucket(token)] += 1.0;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::cosine_similarity;

    #[test]
    fn hash_embedding_is_deterministic_and_normalized() {
        let p = HashEmbeddingProvider::default();
        let a = p.embed("How do I reset my PIN?").unwrap();
        let b = p.embed("how do i reset my pin").unwrap();
        assert_eq!(a.len(), DEFAULT_HASH_DIM);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_tokens_score_higher() {
        let p = HashEmbeddingProvider::new(1024);
        let q = p.embed("forgot my pin").unwrap();
        let related = p.embed("How do I reset my PIN?").unwrap();
        let unrelated = p.embed("What are UPI limits?").unwrap();
        assert!(cosine_similarity(&q, &related) > cosine_similarity(&q, &unrelated));
    }

    #[test]
    fn empty_text_gives_zero_vector() {
        let p = HashEmbeddingProvider::new(4);
        let v = p.embed("  ?! ").unwrap();
        assert_eq!(v.len(), 8);
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
