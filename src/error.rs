//! Editor error taxonomy.
//!
//! Every request-level failure is one of these variants. The HTTP layer maps
//! each variant to a status code, see [`EditorError::status`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, editing, or persisting documents.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("document not found: `{0}`")]
    NotFound(String),

    #[error("access denied: `{0}`")]
    AccessDenied(String),

    #[error("invalid field path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("malformed front matter: {0}")]
    ParseFailure(String),

    #[error("rebuild failed: {0}")]
    BuildFailure(String),

    #[error("{0}")]
    ValidationFailure(String),

    #[error("IO error at `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;

impl EditorError {
    pub fn invalid_path(path: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP status code for this error.
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AccessDenied(_) => 403,
            Self::InvalidPath { .. } | Self::ValidationFailure(_) | Self::Json(_) => 400,
            Self::ParseFailure(_) | Self::Yaml(_) => 422,
            Self::BuildFailure(_) | Self::Io(..) => 500,
        }
    }
}
