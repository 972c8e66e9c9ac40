//! Worker error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pipeline task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
