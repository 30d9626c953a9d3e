use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use faqbot_core::DEFAULT_REQUIRED_PASS_RATE;

#[derive(Debug, Parser)]
#[command(name = "faqbot", version, about = "Semantic FAQ assistant")]
pub struct Cli {
    /// TOML config file. Defaults to <config dir>/faqbot/config.toml when present.
    #[arg(long, global = true, env = "FAQBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Preprocessed corpus CSV (Question,Answer,Category).
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    /// all-MiniLM safetensors weights. Needs --tokenizer-path; without both the hashing embedder is used.
    #[arg(long, global = true)]
    pub model_path: Option<PathBuf>,

    #[arg(long, global = true)]
    pub tokenizer_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean, dedupe and categorize scraped pairs into a corpus CSV.
    Preprocess {
        /// Raw pairs as .jsonl or .csv (question,answer).
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Answer a single question.
    Ask {
        question: String,
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long)]
        json: bool,
    },
    /// Answer questions read line by line until `exit`.
    Chat {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Score labeled cases against the corpus (no rephrasing).
    Eval {
        #[arg(long)]
        cases: PathBuf,
        #[arg(long, env = "FAQBOT_THRESHOLD")]
        threshold: Option<f32>,
        #[arg(long, default_value_t = DEFAULT_REQUIRED_PASS_RATE)]
        min_pass_rate: f32,
    },
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[arg(long, env = "FAQBOT_THRESHOLD")]
    pub threshold: Option<f32>,

    /// Return matched answers verbatim; no generation credential needed.
    #[arg(long)]
    pub no_rephrase: bool,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "GEMINI_BASE_URL")]
    pub generation_base_url: Option<String>,

    #[arg(long)]
    pub generation_model: Option<String>,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        let threshold = match &self.command {
            Commands::Ask { query, .. } | Commands::Chat { query } => query.threshold,
            Commands::Eval {
                threshold,
                min_pass_rate,
                ..
            } => {
                if !(0.0..=1.0).contains(min_pass_rate) {
                    return Err("min-pass-rate must be within [0, 1]".to_string());
                }
                *threshold
            }
            Commands::Preprocess { .. } => None,
        };

        if let Some(t) = threshold {
            validate_threshold(t)?;
        }
        Ok(())
    }
}

pub fn validate_threshold(t: f32) -> Result<(), String> {
    if !t.is_finite() || !(-1.0..=1.0).contains(&t) {
        return Err(format!("threshold must be within [-1, 1], got {t}"));
    }
    Ok(())
}
