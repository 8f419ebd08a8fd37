//! Error types for the host shell.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("tracker error: {0}")]
    Tracker(#[from] pacer_core::PacerError),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type AppResult<T> = Result<T, AppError>;
