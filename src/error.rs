//! Error types for deferred filesystem cleanup

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("tracker is shutting down; no new paths can be tracked")]
    TrackerStopped,

    #[error("failed to delete {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not remove {} entries under {path}", failures.len())]
    PartialDelete {
        path: PathBuf,
        /// Every path that survived the sweep, with the reason it did.
        failures: Vec<(PathBuf, String)>,
    },

    #[error("walk cancelled under {0}")]
    Cancelled(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error describes a deletion that left something behind.
    pub fn is_delete_failure(&self) -> bool {
        matches!(
            self,
            Error::DeleteFailed { .. } | Error::PartialDelete { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
