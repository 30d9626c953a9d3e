use crate::embed::EmbeddingProvider;
use crate::matcher::QueryMatcher;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const DEFAULT_REQUIRED_PASS_RATE: f32 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Confident,
    Unsure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    pub case_id: String,
    pub question: String,
    pub expect: Expectation,
    #[serde(default)]
    pub expected_question: Option<String>,
    #[serde(default)]
    pub min_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalOutcome {
    pub case_id: String,
    pub passed: bool,
    pub actual: Expectation,
    pub matched_question: Option<String>,
    pub score: f32,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f32,
    pub outcomes: Vec<EvalOutcome>,
}

impl EvalSummary {
    pub fn meets(&self, required_pass_rate: f32) -> bool {
        self.total > 0 && self.pass_rate >= required_pass_rate
    }
}

impl EvalCase {
    /// `expected_question` is only checked for confident outcomes.
    pub fn is_satisfied_by(&self, actual: Expectation, matched: Option<&str>, score: f32) -> bool {
        if self.expect != actual {
            return false;
        }
        if actual == Expectation::Confident {
            if let Some(expected) = self.expected_question.as_deref() {
                if matched != Some(expected) {
                    return false;
                }
            }
        }
        self.min_score.map_or(true, |min| score >= min)
    }
}

/// Runs each case through the matcher only; answers are never rephrased here.
pub fn evaluate_cases<E: EmbeddingProvider>(
    matcher: &QueryMatcher<E>,
    cases: &[EvalCase],
    threshold: f32,
) -> anyhow::Result<EvalSummary> {
    let mut outcomes = Vec::with_capacity(cases.len());

    for case in cases {
        let start = Instant::now();
        let best = matcher.best(&case.question)?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let score = best.map_or(0.0, |(_, m)| m.score);
        let (actual, matched_question) = match best {
            Some((entry, m)) if m.score >= threshold => {
                (Expectation::Confident, Some(entry.question.clone()))
            }
            _ => (Expectation::Unsure, None),
        };
        let passed = case.is_satisfied_by(actual, matched_question.as_deref(), score);

        outcomes.push(EvalOutcome {
            case_id: case.case_id.clone(),
            passed,
            actual,
            matched_question,
            score,
            latency_ms,
        });
    }

    let total = outcomes.len();
    let passed = outcomes.iter().filter(|o| o.passed).count();
    let failed = total.saturating_sub(passed);
    let pass_rate = if total == 0 {
        0.0
    } else {
        passed as f32 / total as f32
    };

    Ok(EvalSummary {
        total,
        passed,
        failed,
        pass_rate,
        outcomes,
    })
}
