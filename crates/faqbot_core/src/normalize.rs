use crate::model::RawText;
use regex::Regex;
use std::sync::LazyLock;

const EMAIL: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("tag pattern is valid"));
static EMAIL_THEN_OR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("({EMAIL})or")).expect("email/or pattern is valid")
});
static AT_THEN_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("at({EMAIL})")).expect("at/email pattern is valid")
});

/// Strips markup tags, collapses whitespace and repairs the
/// `foo@bar.comor` / `atfoo@bar.com` run-ons left behind by scraping.
pub fn clean(text: &str) -> String {
    let untagged = TAG_RE.replace_all(text, "");
    let collapsed = untagged.split_whitespace().collect::<Vec<_>>().join(" ");
    let repaired = EMAIL_THEN_OR_RE.replace_all(&collapsed, "${1} or");
    AT_THEN_EMAIL_RE
        .replace_all(&repaired, "at ${1}")
        .into_owned()
}

pub fn clean_raw(text: RawText) -> RawText {
    text.map(clean)
}

/// Dedup key: lower-case with everything except `[a-z0-9]` and whitespace removed.
pub fn normalize_key(question: &str) -> String {
    question
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect()
}

/// A missing question keys the same as an empty one.
pub fn normalize_key_raw(question: &RawText) -> String {
    question.as_deref().map(normalize_key).unwrap_or_default()
}
