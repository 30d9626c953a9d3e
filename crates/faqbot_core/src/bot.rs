use crate::corpus::Corpus;
use crate::embed::EmbeddingProvider;
use crate::generate::TextGenerator;
use crate::matcher::QueryMatcher;
use crate::model::QueryResult;
use crate::rephrase::AnswerRephraser;
use anyhow::Result;
use tracing::info;

/// Query front door: match, then restate the answer when a rephraser is set.
///
/// Everything is built in [`FaqBot::new`] and only read afterwards; dropping
/// the bot releases the model and the index.
pub struct FaqBot<E, G> {
    matcher: QueryMatcher<E>,
    rephraser: Option<AnswerRephraser<G>>,
}

impl<E, G> FaqBot<E, G>
where
    E: EmbeddingProvider,
    G: TextGenerator,
{
    pub fn new(corpus: Corpus, embedder: E, rephraser: Option<AnswerRephraser<G>>) -> Result<Self> {
        let matcher = QueryMatcher::new(corpus, embedder)?;
        info!(
            entries = matcher.corpus().len(),
            rephrase = rephraser.is_some(),
            "faq bot ready"
        );
        Ok(Self { matcher, rephraser })
    }

    pub fn matcher(&self) -> &QueryMatcher<E> {
        &self.matcher
    }

    pub fn get_faq_response(&self, query: &str, threshold: f32) -> Result<QueryResult> {
        match self.matcher.match_query(query, threshold)? {
            QueryResult::Confident {
                matched_question,
                answer,
                category,
                score,
            } => {
                let answer = match &self.rephraser {
                    Some(rephraser) => rephraser.rephrase(query, &answer),
                    None => answer,
                };
                Ok(QueryResult::Confident {
                    matched_question,
                    answer,
                    category,
                    score,
                })
            }
            unsure => Ok(unsure),
        }
    }
}
