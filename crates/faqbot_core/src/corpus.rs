use crate::categorize::categorize;
use crate::dedup::dedupe;
use crate::model::{Category, FaqEntry, RawFaq};
use crate::normalize::clean_raw;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Ordered, deduplicated FAQ entries. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    entries: Vec<FaqEntry>,
}

impl Corpus {
    /// Builds a corpus, dropping any entry whose normalized question was
    /// already seen earlier in `entries`.
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        let before = entries.len();
        let entries = dedupe(entries);
        if entries.len() < before {
            debug!(
                dropped = before - entries.len(),
                "dropped duplicate corpus entries"
            );
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&FaqEntry> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaqEntry> {
        self.entries.iter()
    }

    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category).or_insert(0) += 1;
        }
        counts
    }
}

/// Clean → dedupe → categorize. Missing fields end up as empty strings.
pub fn preprocess(raw: Vec<RawFaq>) -> Corpus {
    let raw_len = raw.len();
    let cleaned: Vec<RawFaq> = raw
        .into_iter()
        .map(|r| RawFaq {
            question: clean_raw(r.question),
            answer: clean_raw(r.answer),
        })
        .collect();

    let entries: Vec<FaqEntry> = dedupe(cleaned)
        .into_iter()
        .map(|r| {
            let question = r.question.into_text_or_empty();
            let answer = r.answer.into_text_or_empty();
            let category = categorize(&question, &answer);
            FaqEntry {
                question,
                answer,
                category,
            }
        })
        .collect();

    let corpus = Corpus::new(entries);
    info!(
        raw = raw_len,
        kept = corpus.len(),
        "preprocessed faq pairs"
    );
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawText;

    #[test]
    fn preprocess_cleans_dedupes_and_categorizes() {
        let corpus = preprocess(vec![
            RawFaq::new("<b>How do I reset my PIN?</b>", "Go to Settings >\n Security."),
            RawFaq::new("how do I reset my pin", "duplicate"),
            RawFaq::new("Is  KYC needed?", "Yes, write to us atkyc@bank.com"),
            RawFaq::new("What is my card limit?", RawText::Missing),
        ]);

        assert_eq!(corpus.len(), 3);
        let e = &corpus.entries()[0];
        assert_eq!(e.question, "How do I reset my PIN?");
        assert_eq!(e.answer, "Go to Settings > Security.");
        assert_eq!(e.category, Category::General);

        let kyc = &corpus.entries()[1];
        assert_eq!(kyc.question, "Is KYC needed?");
        assert_eq!(kyc.answer, "Yes, write to us at kyc@bank.com");
        assert_eq!(kyc.category, Category::Kyc);

        let card = &corpus.entries()[2];
        assert_eq!(card.answer, "");
        assert_eq!(card.category, Category::Cards);
    }

    #[test]
    fn dedup_runs_on_cleaned_question() {
        // Identical once tags are stripped.
        let corpus = preprocess(vec![
            RawFaq::new("<p>Open account</p>", "a"),
            RawFaq::new("Open   account", "b"),
        ]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.entries()[0].answer, "a");
    }

    #[test]
    fn missing_question_survives_as_empty_entry() {
        let corpus = preprocess(vec![
            RawFaq::new(RawText::Missing, "orphan"),
            RawFaq::new(RawText::Missing, "second orphan"),
        ]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.entries()[0].question, "");
        assert_eq!(corpus.entries()[0].category, Category::General);
    }

    #[test]
    fn missing_empty_and_punctuation_questions_collapse() {
        let corpus = preprocess(vec![
            RawFaq::new(RawText::Missing, "missing q"),
            RawFaq::new("", "empty q"),
            RawFaq::new("?!", "punct q"),
            RawFaq::new("<br>", "tag only q"),
        ]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.entries()[0].question, "");
        assert_eq!(corpus.entries()[0].answer, "missing q");
        assert_eq!(Corpus::new(corpus.entries().to_vec()), corpus);
    }

    #[test]
    fn preprocess_output_has_unique_keys() {
        let corpus = preprocess(vec![
            RawFaq::new("Card?", "1"),
            RawFaq::new(RawText::Missing, "2"),
            RawFaq::new("card", "3"),
            RawFaq::new("", "4"),
            RawFaq::new("Loan", "5"),
        ]);
        let answers: Vec<_> = corpus.iter().map(|e| e.answer.as_str()).collect();
        assert_eq!(answers, vec!["1", "2", "5"]);
        assert_eq!(Corpus::new(corpus.entries().to_vec()), corpus);
    }

    #[test]
    fn corpus_new_enforces_unique_keys() {
        let corpus = Corpus::new(vec![
            FaqEntry::new("Card?", "1", Category::Cards),
            FaqEntry::new("card", "2", Category::Cards),
        ]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get(0).map(|e| e.answer.as_str()), Some("1"));
        assert_eq!(corpus.category_counts().get(&Category::Cards), Some(&1));
    }
}
