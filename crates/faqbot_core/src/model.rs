use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const UNSURE_MESSAGE: &str = "I'm sorry, I couldn't find a relevant answer to your question. Could you please rephrase it or ask something else?";

/// A scraped text field that may be absent.
///
/// Cleaning and key derivation are no-ops on `Missing`, so a record with a
/// hole in it flows through ingestion without failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum RawText {
    Text(String),
    #[default]
    Missing,
}

impl RawText {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            RawText::Text(text) => Some(text),
            RawText::Missing => None,
        }
    }

    pub fn map(self, f: impl FnOnce(&str) -> String) -> RawText {
        match self {
            RawText::Text(text) => RawText::Text(f(&text)),
            RawText::Missing => RawText::Missing,
        }
    }

    pub fn into_text_or_empty(self) -> String {
        match self {
            RawText::Text(text) => text,
            RawText::Missing => String::new(),
        }
    }
}

impl From<Option<String>> for RawText {
    fn from(value: Option<String>) -> Self {
        value.map_or(RawText::Missing, RawText::Text)
    }
}

impl From<RawText> for Option<String> {
    fn from(value: RawText) -> Self {
        match value {
            RawText::Text(text) => Some(text),
            RawText::Missing => None,
        }
    }
}

impl From<&str> for RawText {
    fn from(value: &str) -> Self {
        RawText::Text(value.to_string())
    }
}

/// One question/answer pair as handed over by the scraper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFaq {
    #[serde(default)]
    pub question: RawText,
    #[serde(default)]
    pub answer: RawText,
}

impl RawFaq {
    pub fn new(question: impl Into<RawText>, answer: impl Into<RawText>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "KYC")]
    Kyc,
    #[serde(rename = "Cards")]
    Cards,
    #[serde(rename = "Payments")]
    Payments,
    #[serde(rename = "Account Management")]
    AccountManagement,
    #[serde(rename = "Rewards")]
    Rewards,
    #[serde(rename = "Loans/Credit")]
    LoansCredit,
    #[serde(rename = "Support/Contact")]
    SupportContact,
    #[serde(rename = "General")]
    General,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Kyc,
        Category::Cards,
        Category::Payments,
        Category::AccountManagement,
        Category::Rewards,
        Category::LoansCredit,
        Category::SupportContact,
        Category::General,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Kyc => "KYC",
            Category::Cards => "Cards",
            Category::Payments => "Payments",
            Category::AccountManagement => "Account Management",
            Category::Rewards => "Rewards",
            Category::LoansCredit => "Loans/Credit",
            Category::SupportContact => "Support/Contact",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("unknown category label '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    pub category: Category,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, category: Category) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category,
        }
    }

    /// Text handed to the embedder for this entry.
    pub fn index_text(&self) -> String {
        format!("{} {}", self.question, self.answer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryResult {
    Confident {
        #[serde(rename = "question")]
        matched_question: String,
        answer: String,
        category: Category,
        score: f32,
    },
    Unsure {
        message: String,
    },
}

impl QueryResult {
    pub fn unsure() -> Self {
        QueryResult::Unsure {
            message: UNSURE_MESSAGE.to_string(),
        }
    }

    pub fn is_confident(&self) -> bool {
        matches!(self, QueryResult::Confident { .. })
    }
}
