use crate::flatten::FlattenError;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for npmflat operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read listing at {path}: {source}")]
    ListingRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Flatten(#[from] FlattenError),
}

impl Error {
    /// The stable error code, when the error came from flattening.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Flatten(e) => Some(e.code()),
            _ => None,
        }
    }
}
