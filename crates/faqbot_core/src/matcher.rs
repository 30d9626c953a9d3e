use crate::corpus::Corpus;
use crate::embed::EmbeddingProvider;
use crate::index::EmbeddingIndex;
use crate::model::{FaqEntry, QueryResult};
use crate::retrieval::{best_match, ScoredMatch};
use anyhow::{Context, Result};
use tracing::debug;

pub const DEFAULT_THRESHOLD: f32 = 0.2;

/// Top-1 semantic matcher over a fixed corpus.
///
/// Owns the corpus, its index and the embedder used to build it, so queries
/// are always embedded with the same model as the corpus.
pub struct QueryMatcher<E> {
    corpus: Corpus,
    index: EmbeddingIndex,
    embedder: E,
}

impl<E: EmbeddingProvider> QueryMatcher<E> {
    pub fn new(corpus: Corpus, embedder: E) -> Result<Self> {
        let index = EmbeddingIndex::build(&corpus, &embedder)?;
        Ok(Self {
            corpus,
            index,
            embedder,
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).context("embed query")
    }

    /// Best entry for `query` regardless of threshold.
    pub fn best(&self, query: &str) -> Result<Option<(&FaqEntry, ScoredMatch)>> {
        let q = self.embed_one(query)?;
        let Some(m) = best_match(&q, self.index.vectors()) else {
            return Ok(None);
        };
        debug!(index = m.index, score = m.score, "best corpus match");
        Ok(self.corpus.get(m.index).map(|entry| (entry, m)))
    }

    pub fn match_query(&self, query: &str, threshold: f32) -> Result<QueryResult> {
        Ok(match self.best(query)? {
            Some((entry, m)) if m.score >= threshold => QueryResult::Confident {
                matched_question: entry.question.clone(),
                answer: entry.answer.clone(),
                category: entry.category,
                score: m.score,
            },
            _ => QueryResult::unsure(),
        })
    }
}
