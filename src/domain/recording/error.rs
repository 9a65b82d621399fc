use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("{0}")]
    NotFound(String),
    #[error("recording session not found")]
    SessionNotFound,
    #[error("capture device is busy with another recording")]
    DeviceBusy,
    #[error("nothing was captured")]
    NothingCaptured,
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("recording exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("audio storage failed: {0}")]
    Storage(String),
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        match err {
            RecordingError::NotFound(msg) => AppError::NotFound(msg),
            RecordingError::SessionNotFound => AppError::NotFound(err.to_string()),
            RecordingError::DeviceBusy => AppError::MediaAccess(err.to_string()),
            RecordingError::NothingCaptured | RecordingError::Invalid(_) => {
                AppError::BadRequest(err.to_string())
            }
            RecordingError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            RecordingError::Storage(msg) => AppError::Internal(msg),
        }
    }
}
