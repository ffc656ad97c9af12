//! Error types for the orientation hub.

use thiserror::Error;

use crate::sample::ProviderError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Argument error: {0}")]
    Argument(String),

    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
