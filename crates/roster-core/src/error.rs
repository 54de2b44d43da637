//! Top-level error type for roster operations

use thiserror::Error;

use crate::models::ValidationError;
use crate::storage::StorageError;
use crate::sync::{FetchError, SyncError};

/// Any failure a roster operation can report
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl Error {
    /// A hint for the user, when there is something they can do about it
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Error::Validation(_) => Some("Check the student's name and email and try again."),
            Error::Storage(e) => e.recovery_suggestion(),
            Error::Sync(SyncError::Fetch(_)) => {
                Some("Check your network connection and the configured api_url.")
            }
            Error::Sync(SyncError::Storage(e)) => e.recovery_suggestion(),
        }
    }
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self {
        Error::Sync(SyncError::Fetch(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
