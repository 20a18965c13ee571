//! Error taxonomy for tag reconciliation.
//!
//! Read-path failures (`Decode`, `Automation`) are normally swallowed and
//! logged by the caller; `Persist` is collected per entry; `Validation` is
//! the only kind surfaced to the user as an alert.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// The tag container is not a property list of strings.
    #[error("failed to decode tag list: {0}")]
    Decode(String),

    #[error("failed to encode tag list: {0}")]
    Encode(#[from] plist::Error),

    #[error("failed to write tags to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("could not read the Finder selection: {0}")]
    Automation(String),

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl TagError {
    pub fn persist(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TagError::Persist {
            path: path.into(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TagError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, TagError>;
