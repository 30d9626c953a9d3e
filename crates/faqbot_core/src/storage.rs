use crate::corpus::Corpus;
use crate::model::{Category, FaqEntry, RawFaq, RawText};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const CORPUS_HEADER: [&str; 3] = ["Question", "Answer", "Category"];

#[derive(Debug, Deserialize)]
struct RawCsvRow {
    question: Option<String>,
    answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct CorpusRow<'a> {
    #[serde(rename = "Question")]
    question: &'a str,
    #[serde(rename = "Answer")]
    answer: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
}

/// Reads scraped pairs from `.jsonl` or `.csv`, picked by extension.
pub fn load_raw_pairs(path: &Path) -> Result<Vec<RawFaq>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => load_raw_csv(path),
        Some("jsonl") | Some("ndjson") => load_raw_jsonl(path),
        other => anyhow::bail!(
            "unsupported input format '{}' for {} (expected .jsonl or .csv)",
            other.unwrap_or(""),
            path.display()
        ),
    }
}

pub fn load_raw_jsonl(path: &Path) -> Result<Vec<RawFaq>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut out = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("read input line")?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawFaq = serde_json::from_str(&line)
            .with_context(|| format!("parse raw faq json on line {}", lineno + 1))?;
        out.push(raw);
    }

    Ok(out)
}

/// Scraper CSV with `question,answer` headers. Empty cells count as missing.
pub fn load_raw_csv(path: &Path) -> Result<Vec<RawFaq>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
    let mut out = Vec::new();
    for row in reader.deserialize::<RawCsvRow>() {
        let row = row.context("parse raw faq csv row")?;
        out.push(RawFaq {
            question: RawText::from(row.question),
            answer: RawText::from(row.answer),
        });
    }
    Ok(out)
}

pub fn save_corpus_csv(path: &Path, corpus: &Corpus) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    if corpus.is_empty() {
        writer
            .write_record(CORPUS_HEADER)
            .context("write corpus header")?;
    }
    for entry in corpus.iter() {
        writer
            .serialize(CorpusRow {
                question: &entry.question,
                answer: &entry.answer,
                category: entry.category.label(),
            })
            .context("write corpus row")?;
    }
    writer.flush().context("flush corpus csv")
}

/// Loads a preprocessed corpus. Columns are read by position, so the header
/// row must exist but its names are not checked.
pub fn load_corpus_csv(path: &Path) -> Result<Corpus> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut entries = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read corpus row {}", idx + 1))?;
        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let category: Category = field(2)
            .parse()
            .with_context(|| format!("corpus row {}", idx + 1))?;
        entries.push(FaqEntry {
            question: field(0),
            answer: field(1),
            category,
        });
    }

    Ok(Corpus::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn corpus_csv_round_trips_with_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        let corpus = Corpus::new(vec![
            FaqEntry::new("Fees, charges?", "None.\nReally, none.", Category::General),
            FaqEntry::new("Say \"hi\"", "ok", Category::SupportContact),
        ]);

        save_corpus_csv(&path, &corpus).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Question,Answer,Category\n"));

        let loaded = load_corpus_csv(&path).unwrap();
        assert_eq!(loaded, corpus);
    }

    #[test]
    fn preprocessed_corpus_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        let corpus = crate::corpus::preprocess(vec![
            RawFaq::new(RawText::Missing, "orphan"),
            RawFaq::new("", "blank"),
            RawFaq::new("Is KYC needed?", "Yes."),
        ]);
        assert_eq!(corpus.len(), 2);

        save_corpus_csv(&path, &corpus).unwrap();
        assert_eq!(load_corpus_csv(&path).unwrap(), corpus);
    }

    #[test]
    fn empty_corpus_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        save_corpus_csv(&path, &Corpus::default()).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim(),
            "Question,Answer,Category"
        );
        assert!(load_corpus_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Question,Answer,Category\nq,a,Mortgages\n").unwrap();
        let err = load_corpus_csv(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Mortgages"));
    }

    #[test]
    fn raw_jsonl_skips_blank_lines_and_keeps_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.jsonl");
        fs::write(
            &path,
            "{\"question\":\"Q1\",\"answer\":\"A1\"}\n\n{\"question\":null,\"answer\":\"A2\"}\n",
        )
        .unwrap();
        let raw = load_raw_pairs(&path).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1].question, RawText::Missing);
    }

    #[test]
    fn raw_csv_treats_empty_cells_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, "question,answer\nQ1,A1\n,A2\n").unwrap();
        let raw = load_raw_pairs(&path).unwrap();
        assert_eq!(raw[0], RawFaq::new("Q1", "A1"));
        assert_eq!(raw[1].question, RawText::Missing);
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(load_raw_pairs(Path::new("faqs.xml")).is_err());
    }
}
