use crate::model::{FaqEntry, RawFaq};
use crate::normalize::{normalize_key, normalize_key_raw};
use std::collections::HashSet;

/// Anything that can be deduplicated by its question.
///
/// Missing, empty and punctuation-only questions all share the key `""`.
pub trait QuestionKey {
    fn question_key(&self) -> String;
}

impl QuestionKey for RawFaq {
    fn question_key(&self) -> String {
        normalize_key_raw(&self.question)
    }
}

impl QuestionKey for FaqEntry {
    fn question_key(&self) -> String {
        normalize_key(&self.question)
    }
}

/// Keeps the first record per normalized question, in input order.
pub fn dedupe<T: QuestionKey>(entries: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.question_key()))
        .collect()
}
