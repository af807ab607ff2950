use std::path::PathBuf;

use thiserror::Error;

use crate::models::VersionNumber;

/// Errors raised by the idea store.
///
/// None of these are retried internally. `DuplicateVersion` and
/// `UnknownParent` are caller mistakes and leave the tree untouched.
#[derive(Debug, Error)]
pub enum IdeaError {
    #[error("Idea not found: {0}")]
    IdeaNotFound(String),

    #[error("Corrupt idea at {}: {reason}", path.display())]
    CorruptIdea { path: PathBuf, reason: String },

    #[error("Version {0} already exists")]
    DuplicateVersion(VersionNumber),

    #[error("Parent version {0} does not exist")]
    UnknownParent(VersionNumber),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Storage I/O error at {}: {source}", path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IdeaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptIdea {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml::Error> for IdeaError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::MalformedRecord(e.to_string())
    }
}

pub type Result<T, E = IdeaError> = std::result::Result<T, E>;
