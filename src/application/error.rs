use thiserror::Error;

use crate::domain::{ParseError, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not parse entry: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl AppError {
    /// True when the caller can fix the problem by correcting its input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Parse(_) | AppError::Validation(_))
    }
}
