use thiserror::Error;

/// Failures at the engine's decoding boundary. Scoring itself never fails.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Snapshot(e.to_string())
    }
}
