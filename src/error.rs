use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Failed to decode '{event}' frame: {source}")]
    Decode {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed frame: {0}")]
    Frame(#[source] serde_json::Error),

    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to open script {}: {source}", path.display())]
    ScriptOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
