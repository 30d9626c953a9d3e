use crate::corpus::Corpus;
use crate::embed::EmbeddingProvider;
use anyhow::{Context, Result};
use tracing::info;

/// One embedding per corpus entry, same order as the corpus.
///
/// There is no update path: a different corpus needs a fresh `build`.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingIndex {
    pub fn build<E>(corpus: &Corpus, embedder: &E) -> Result<Self>
    where
        E: EmbeddingProvider + ?Sized,
    {
        let mut vectors = Vec::with_capacity(corpus.len());
        for (i, entry) in corpus.iter().enumerate() {
            let v = embedder
                .embed(&entry.index_text())
                .with_context(|| format!("embed corpus entry {i}"))?;
            if let Some(first) = vectors.first().map(Vec::len) {
                anyhow::ensure!(
                    v.len() == first,
                    "embedding for entry {i} has dimension {} (expected {first})",
                    v.len()
                );
            }
            vectors.push(v);
        }
        info!(entries = vectors.len(), "built embedding index");
        Ok(Self { vectors })
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> Option<usize> {
        self.vectors.first().map(Vec::len)
    }
}
