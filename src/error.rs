use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RocketError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry payload is not well-formed: {0}")]
    UnsupportedFormat(String),

    #[error("no parser registered for registry schema version {0}")]
    UnsupportedSchemaVersion(i64),

    #[error("{0} is neither an http(s) url nor an existing path")]
    InvalidSource(String),

    #[error("fetching {uri} failed: {message}")]
    Fetch { uri: String, message: String },

    #[error("fetching {uri} timed out after {after:?}")]
    Timeout { uri: String, after: Duration },

    #[error("app already registered as: {0}")]
    AppAlreadyRegistered(String),

    #[error("app {0} is not registered")]
    AppNotRegistered(String),

    #[error("no application selected")]
    NoAppSelected,

    #[error("workspace file {path} is corrupt: {message}")]
    WorkspaceCorrupt { path: PathBuf, message: String },
}

impl RocketError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RocketError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RocketError>;
