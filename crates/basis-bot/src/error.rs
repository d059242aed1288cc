//! Application error types.

use thiserror::Error;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
