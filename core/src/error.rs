use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading inputs, building or persisting an index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("invalid index config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("invalid document collection {path}: {reason}")]
    Documents { path: PathBuf, reason: String },

    #[error("document #{position} has no `{field}` reference field")]
    MissingReference { field: String, position: usize },

    #[error("document #{position} has a non-scalar `{field}` reference")]
    InvalidReference { field: String, position: usize },

    #[error("invalid index parameter: {0}")]
    InvalidParameter(String),

    #[error("no index output path configured")]
    MissingOutputPath,

    #[error("unsupported index format version {actual}, expected {expected}")]
    UnsupportedVersion { expected: u32, actual: u32 },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = IndexError::MissingReference { field: "id".into(), position: 3 };
        assert_eq!(err.to_string(), "document #3 has no `id` reference field");
    }

    #[test]
    fn version_mismatch_display() {
        let err = IndexError::UnsupportedVersion { expected: 1, actual: 2 };
        assert_eq!(err.to_string(), "unsupported index format version 2, expected 1");
    }
}
