use crate::domain::document::ExtractionError;
use crate::domain::script::ParseError;
use crate::error::AppError;

/// Failures of the scene collection itself.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("scene not found")]
    SceneNotFound,
    #[error("line not found")]
    LineNotFound,
    #[error("edit rejected: {0}")]
    Rejected(String),
    #[error("persistence failed: {0}")]
    Persistence(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SceneServiceError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("{0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<StoreError> for SceneServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SceneNotFound => SceneServiceError::NotFound("Scene not found".to_string()),
            StoreError::LineNotFound => SceneServiceError::NotFound("Line not found".to_string()),
            StoreError::Rejected(msg) => SceneServiceError::Invalid(msg),
            StoreError::Persistence(msg) => SceneServiceError::Dependency(msg),
        }
    }
}

impl From<SceneServiceError> for AppError {
    fn from(err: SceneServiceError) -> Self {
        match err {
            SceneServiceError::Parse(e) => AppError::from(e),
            SceneServiceError::Extraction(e) => AppError::from(e),
            SceneServiceError::NotFound(msg) => AppError::NotFound(msg),
            SceneServiceError::Invalid(msg) => AppError::BadRequest(msg),
            SceneServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
