#![deny(unsafe_code)]

use std::path::PathBuf;

use fieldsched_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid profile: {0}")]
    Invalid(#[from] ModelError),

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("profile store unavailable: {0}")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("profile store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
