use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("unsupported document type: {0}")]
    Unsupported(String),
    #[error("document could not be read: {0}")]
    Corrupt(String),
    #[error("document contains no text")]
    Empty,
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Unsupported(_) => AppError::UnsupportedMedia(err.to_string()),
            ExtractionError::Corrupt(_) | ExtractionError::Empty => {
                AppError::Unprocessable(err.to_string())
            }
        }
    }
}
