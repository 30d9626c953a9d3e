use crate::generate::{GenerationError, TextGenerator};
use tracing::warn;

pub fn rephrase_prompt(query: &str, original_answer: &str) -> String {
    format!(
        "User asked: '{query}'. Please respond in a simple, friendly, and natural tone. Answer: {original_answer}"
    )
}

/// Restates matched answers through a [`TextGenerator`].
pub struct AnswerRephraser<G> {
    generator: G,
}

impl<G: TextGenerator> AnswerRephraser<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The raw outcome of the single generation call, trimmed on success.
    pub fn try_rephrase(&self, query: &str, original_answer: &str) -> Result<String, GenerationError> {
        self.generator
            .generate(&rephrase_prompt(query, original_answer))
            .map(|text| text.trim().to_string())
    }

    /// Never fails: any generation error yields `original_answer`.
    pub fn rephrase(&self, query: &str, original_answer: &str) -> String {
        or_original_answer(self.try_rephrase(query, original_answer), original_answer)
    }
}

pub fn or_original_answer(outcome: Result<String, GenerationError>, original_answer: &str) -> String {
    match outcome {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => {
            warn!(error = %GenerationError::Empty, "rephrase failed, using original answer");
            original_answer.to_string()
        }
        Err(err) => {
            warn!(error = %err, "rephrase failed, using original answer");
            original_answer.to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    pub(crate) struct ScriptedGenerator {
        pub reply: Option<String>,
        pub prompts: RefCell<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompts: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                reply: None,
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.reply.clone().ok_or(GenerationError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    #[test]
    fn prompt_embeds_query_and_answer() {
        assert_eq!(
            rephrase_prompt("forgot my pin", "Go to Settings."),
            "User asked: 'forgot my pin'. Please respond in a simple, friendly, and natural tone. Answer: Go to Settings."
        );
    }

    #[test]
    fn returns_trimmed_generation() {
        let r = AnswerRephraser::new(ScriptedGenerator::replying("\n  Sure! Head to Settings.  \n"));
        assert_eq!(r.rephrase("q", "a"), "Sure! Head to Settings.");
    }

    #[test]
    fn failure_falls_back_after_exactly_one_attempt() {
        let r = AnswerRephraser::new(ScriptedGenerator::failing());
        assert_eq!(r.rephrase("q", "original"), "original");
        assert_eq!(r.generator.prompts.borrow().len(), 1);
    }

    #[test]
    fn blank_generation_falls_back() {
        let r = AnswerRephraser::new(ScriptedGenerator::replying("   "));
        assert_eq!(r.rephrase("q", "original"), "original");
    }

    #[test]
    fn fallback_branch_is_explicit() {
        assert_eq!(
            or_original_answer(Err(GenerationError::Malformed("x".into())), "orig"),
            "orig"
        );
        assert_eq!(or_original_answer(Ok("new".into()), "orig"), "new");
    }
}
