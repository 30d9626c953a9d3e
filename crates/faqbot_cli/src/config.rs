use std::fs;
use std::path::{Path, PathBuf};

use faqbot_core::{DEFAULT_GENERATION_BASE_URL, DEFAULT_GENERATION_MODEL, DEFAULT_THRESHOLD};
use serde::Deserialize;

use crate::cli::{validate_threshold, Cli, QueryArgs};
use crate::error::ConfigError;

pub const DEFAULT_CORPUS_PATH: &str = "faqs_preprocessed.csv";

/// Keys accepted in `config.toml`. Everything is optional; flags and
/// environment win over the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub threshold: Option<f32>,
    pub corpus: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub tokenizer_path: Option<PathBuf>,
    pub generation_model: Option<String>,
    pub generation_base_url: Option<String>,
    pub rephrase: Option<bool>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("faqbot").join("config.toml"))
}

/// An explicit path must exist; the default location is optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(FileConfig::default()),
        },
    };
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Effective settings for commands that load the corpus.
#[derive(Debug, Clone)]
pub struct Settings {
    pub corpus: PathBuf,
    pub model: Option<ModelFiles>,
    pub threshold: f32,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: &FileConfig, threshold: Option<f32>) -> Result<Self, ConfigError> {
        let threshold = threshold.or(file.threshold).unwrap_or(DEFAULT_THRESHOLD);
        validate_threshold(threshold).map_err(ConfigError::InvalidArg)?;

        let model_path = cli.model_path.clone().or_else(|| file.model_path.clone());
        let tokenizer_path = cli
            .tokenizer_path
            .clone()
            .or_else(|| file.tokenizer_path.clone());
        let model = match (model_path, tokenizer_path) {
            (Some(model), Some(tokenizer)) => Some(ModelFiles { model, tokenizer }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteModel),
        };

        Ok(Self {
            corpus: cli
                .corpus
                .clone()
                .or_else(|| file.corpus.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_PATH)),
            model,
            threshold,
        })
    }
}

/// `None` when rephrasing is switched off. Otherwise the credential must be
/// present, which makes a missing key fatal before any query is read.
pub fn resolve_generation(
    args: &QueryArgs,
    file: &FileConfig,
) -> Result<Option<GenerationSettings>, ConfigError> {
    if args.no_rephrase || file.rephrase == Some(false) {
        return Ok(None);
    }
    let api_key = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    Ok(Some(GenerationSettings {
        api_key: api_key.to_string(),
        base_url: args
            .generation_base_url
            .clone()
            .or_else(|| file.generation_base_url.clone())
            .unwrap_or_else(|| DEFAULT_GENERATION_BASE_URL.to_string()),
        model: args
            .generation_model
            .clone()
            .or_else(|| file.generation_model.clone())
            .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
    }))
}
