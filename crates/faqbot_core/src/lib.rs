pub mod bot;
pub mod categorize;
pub mod corpus;
pub mod dedup;
pub mod embed;
pub mod eval;
pub mod generate;
pub mod index;
pub mod matcher;
pub mod minilm_embed;
pub mod model;
pub mod normalize;
pub mod rephrase;
pub mod retrieval;
pub mod storage;

pub use bot::FaqBot;
pub use categorize::{categorize, categorize_with, CategoryRule, CATEGORY_RULES};
pub use corpus::{preprocess, Corpus};
pub use dedup::{dedupe, QuestionKey};
pub use embed::{EmbeddingProvider, HashEmbeddingProvider, DEFAULT_HASH_DIM};
pub use eval::{
    evaluate_cases, EvalCase, EvalOutcome, EvalSummary, Expectation, DEFAULT_REQUIRED_PASS_RATE,
};
pub use generate::{
    GeminiGenerator, GenerationError, TextGenerator, DEFAULT_GENERATION_BASE_URL,
    DEFAULT_GENERATION_MODEL,
};
pub use index::EmbeddingIndex;
pub use matcher::{QueryMatcher, DEFAULT_THRESHOLD};
pub use minilm_embed::MiniLmEmbeddingProvider;
pub use model::{Category, FaqEntry, QueryResult, RawFaq, RawText, UNSURE_MESSAGE};
pub use normalize::{clean, clean_raw, normalize_key, normalize_key_raw};
pub use rephrase::{or_original_answer, rephrase_prompt, AnswerRephraser};
pub use retrieval::{best_match, cosine_similarity, ScoredMatch};
pub use storage::{
    load_corpus_csv, load_raw_csv, load_raw_jsonl, load_raw_pairs, save_corpus_csv,
};
