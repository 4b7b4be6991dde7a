use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("enhancement request failed: {0}")]
    EnhancementFailed(String),
    #[error("enhancement request timed out after {0:?}")]
    EnhancementTimedOut(Duration),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Env(#[from] envy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
