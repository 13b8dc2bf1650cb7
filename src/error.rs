use crate::core::accounts::AuthError;
use crate::core::notify::NotifyError;
use crate::core::storage::StoreError;

/// Errors surfaced to the command line.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown location '{0}'")]
    UnknownLocation(String),
    #[error("Invalid preference '{0}', expected key=value")]
    InvalidPreference(String),
}

pub type Result<T> = std::result::Result<T, Error>;
