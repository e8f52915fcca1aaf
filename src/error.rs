use thiserror::Error;

/// Errors raised while reading the clipboard or talking to the catalog
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors raised while loading or saving the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the user config directory")]
    NoConfigDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}
