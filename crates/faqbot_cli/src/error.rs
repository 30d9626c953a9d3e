use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not found. Set it in the environment or pass --api-key (or use --no-rephrase).")]
    MissingApiKey,

    #[error("--model-path and --tokenizer-path must both be provided")]
    IncompleteModel,

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArg(String),
}
