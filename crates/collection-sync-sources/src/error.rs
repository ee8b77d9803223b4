use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlexError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("the server rejected the token (401 Unauthorized)")]
    Unauthorized,

    #[error("invalid server address {0:?}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("{context}: HTTP {status}")]
    Http {
        status: reqwest::StatusCode,
        context: String,
    },

    #[error("failed to parse {0}")]
    Parse(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("library \"{name}\" has unsupported type \"{kind}\" (only movie and show libraries are supported)")]
    UnsupportedLibrary { name: String, kind: String },
}

impl PlexError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlexError::NotFound(_))
    }

    /// Server could not be reached at all, as opposed to answering with an error
    pub fn is_connection(&self) -> bool {
        matches!(self, PlexError::Connection(e) if e.is_connect() || e.is_timeout())
    }
}
