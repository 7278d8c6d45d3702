use thiserror::Error;
use serde::Serialize;

/// Error taxonomy for the translation core.
///
/// Only `Validation` and `AllBackendsFailed` are meant to reach the user.
/// Backend, detection and persistence failures are absorbed by the
/// orchestrator and only show up in the `source` tag of a successful result.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Backend Error ({backend}): {message}")]
    Backend { backend: String, message: String },

    #[error("Detection Error: {0}")]
    Detection(String),

    #[error("All translation methods failed for {from} -> {to}")]
    AllBackendsFailed { from: String, to: String },

    #[error("Persistence Error: {0}")]
    Persistence(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("I/O Error: {0}")]
    Io(String),
}

impl AppError {
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Whether the interface layer should ever see this error.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::AllBackendsFailed { .. })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let backend = err
            .url()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| "http".to_string());
        AppError::Backend {
            backend,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Persistence(format!("Serialization error: {}", err))
    }
}

macro_rules! persistence_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for AppError {
                fn from(err: $ty) -> Self {
                    AppError::Persistence(err.to_string())
                }
            }
        )*
    };
}

persistence_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

pub type AppResult<T> = Result<T, AppError>;
