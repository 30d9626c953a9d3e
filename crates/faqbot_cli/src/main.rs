mod cli;
mod config;
mod error;
mod output;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use faqbot_core::{
    evaluate_cases, load_corpus_csv, load_raw_pairs, preprocess, save_corpus_csv,
    AnswerRephraser, EmbeddingProvider, EvalCase, FaqBot, GeminiGenerator,
    HashEmbeddingProvider, MiniLmEmbeddingProvider, QueryMatcher, QueryResult, TextGenerator,
    DEFAULT_HASH_DIM,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, QueryArgs};
use crate::config::{load_file_config, resolve_generation, FileConfig, ModelFiles, Settings};
use crate::error::ConfigError;

type Bot = FaqBot<Box<dyn EmbeddingProvider>, Box<dyn TextGenerator>>;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn make_embedder(model: Option<&ModelFiles>) -> Result<Box<dyn EmbeddingProvider>> {
    match model {
        Some(files) => {
            let ext = files
                .model
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            anyhow::ensure!(
                ext == "safetensors",
                "unsupported model format '.{ext}' (expected .safetensors)"
            );
            eprintln!("Loading model from {} ...", files.model.display());
            let provider = MiniLmEmbeddingProvider::load(&files.model, &files.tokenizer)?;
            eprintln!("Model loaded.");
            Ok(Box::new(provider))
        }
        None => Ok(Box::new(HashEmbeddingProvider::new(DEFAULT_HASH_DIM))),
    }
}

/// Resolves every setting (and the credential) before touching the corpus.
fn build_bot(cli: &Cli, file: &FileConfig, args: &QueryArgs) -> Result<(Bot, f32)> {
    let settings = Settings::resolve(cli, file, args.threshold)?;
    let generation = resolve_generation(args, file)?;

    let rephraser = match generation {
        Some(g) => {
            let generator: Box<dyn TextGenerator> =
                Box::new(GeminiGenerator::new(&g.api_key, &g.base_url, &g.model)?);
            Some(AnswerRephraser::new(generator))
        }
        None => None,
    };

    let corpus = load_corpus_csv(&settings.corpus)?;
    let embedder = make_embedder(settings.model.as_ref())?;
    let bot = FaqBot::new(corpus, embedder, rephraser)?;
    Ok((bot, settings.threshold))
}

fn read_eval_cases_json(path: &Path) -> Result<Vec<EvalCase>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let cases: Vec<EvalCase> = serde_json::from_reader(file).context("parse eval cases json")?;
    Ok(cases)
}

/// One failed query must not end the session; it is logged and answered as unsure.
fn answer_chat_line<E, G>(
    bot: &FaqBot<E, G>,
    query: &str,
    threshold: f32,
    out: &mut impl Write,
) -> Result<()>
where
    E: EmbeddingProvider,
    G: TextGenerator,
{
    match bot.get_faq_response(query, threshold) {
        Ok(result) => output::write_text(out, &result)?,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "query failed");
            output::write_text(out, &QueryResult::unsure())?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn run_chat(bot: &Bot, threshold: f32) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("Ask a question (type 'exit' to quit).");

    loop {
        let line = match rl.readline("faqbot> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }
        rl.add_history_entry(trimmed).ok();

        answer_chat_line(bot, trimmed, threshold, &mut io::stdout().lock())?;
    }

    println!("Thank you for using the FAQ assistant.");
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.validate().map_err(ConfigError::InvalidArg)?;
    let file = load_file_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Preprocess { input, output } => {
            let raw = load_raw_pairs(input)?;
            let raw_len = raw.len();
            let corpus = preprocess(raw);
            save_corpus_csv(output, &corpus)?;
            println!(
                "preprocessed={} dropped_duplicates={} output={}",
                corpus.len(),
                raw_len - corpus.len(),
                output.display()
            );
            output::print_category_counts(&corpus.category_counts());
        }
        Commands::Ask { question, query, json } => {
            let (bot, threshold) = build_bot(&cli, &file, query)?;
            let result = bot.get_faq_response(question, threshold)?;
            output::print_result(&result, *json)?;
        }
        Commands::Chat { query } => {
            let (bot, threshold) = build_bot(&cli, &file, query)?;
            run_chat(&bot, threshold)?;
        }
        Commands::Eval {
            cases,
            threshold,
            min_pass_rate,
        } => {
            let settings = Settings::resolve(&cli, &file, *threshold)?;
            let corpus = load_corpus_csv(&settings.corpus)?;
            let matcher = QueryMatcher::new(corpus, make_embedder(settings.model.as_ref())?)?;
            let cases = read_eval_cases_json(cases)?;

            let run_id = format!("eval-{}", chrono::Utc::now().timestamp_millis());
            info!(%run_id, cases = cases.len(), "starting evaluation");
            let summary = evaluate_cases(&matcher, &cases, settings.threshold)?;
            output::print_eval(&run_id, &summary, settings.threshold, *min_pass_rate);
        }
    }

    Ok(())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faqbot_core::{Category, Corpus, FaqEntry, GenerationError, UNSURE_MESSAGE};

    struct FlakyEmbedder;

    impl EmbeddingProvider for FlakyEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            anyhow::ensure!(!text.contains("offline"), "embedding backend unavailable");
            Ok(vec![1.0, 0.0])
        }
    }

    struct NoGenerator;

    impl TextGenerator for NoGenerator {
        fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Empty)
        }
    }

    fn chat_bot() -> FaqBot<FlakyEmbedder, NoGenerator> {
        let corpus = Corpus::new(vec![FaqEntry::new(
            "How do I reset my PIN?",
            "Go to Settings.",
            Category::AccountManagement,
        )]);
        FaqBot::new(corpus, FlakyEmbedder, None).unwrap()
    }

    #[test]
    fn failed_chat_query_keeps_session_going() {
        let bot = chat_bot();
        let mut out = Vec::new();

        answer_chat_line(&bot, "offline question", 0.2, &mut out).unwrap();
        answer_chat_line(&bot, "forgot my pin", 0.2, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(UNSURE_MESSAGE));
        assert!(text.contains("Matched Question: How do I reset my PIN?"));
    }
}
