//! Error types for tally-source

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Backend unreachable: {message}")]
    Transport { message: String },

    #[error("Backend error: HTTP {status}")]
    Backend { status: u16, body: String },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl SourceError {
    /// True when the retrieval never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, SourceError::Transport { .. } | SourceError::IoError(_))
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(error: serde_json::Error) -> Self {
        SourceError::MalformedPayload {
            message: error.to_string(),
        }
    }
}
