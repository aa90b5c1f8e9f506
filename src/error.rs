use std::time::Duration;

use thiserror::Error;

use crate::text::embedding::EmbeddingError;

pub type Result<T> = std::result::Result<T, QaError>;

#[derive(Error, Debug)]
pub enum QaError {
    /// Input element cannot be compared (bad geometry, missing id, missing box).
    #[error("Malformed input element '{element}': {reason}")]
    MalformedInput { element: String, reason: String },

    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image error ({context}): {source}")]
    Image {
        context: String,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("Page capture failed: {0}")]
    PageCapture(String),

    #[error("Comparison did not finish within {limit:?}")]
    Timeout { limit: Duration },
}

impl QaError {
    pub fn malformed(element: impl Into<String>, reason: impl Into<String>) -> Self {
        QaError::MalformedInput {
            element: element.into(),
            reason: reason.into(),
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        QaError::Json {
            context: context.into(),
            source,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, QaError::Timeout { .. })
    }
}
