use crate::error::AppError;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RehearsalError {
    #[error("no active rehearsal")]
    NotActive,
    #[error("scene not found")]
    SceneNotFound,
    #[error("scene has no lines to rehearse")]
    EmptyScene,
    #[error("position {position} is outside the scene (0..{total})")]
    PositionOutOfRange { position: usize, total: usize },
}

impl From<RehearsalError> for AppError {
    fn from(err: RehearsalError) -> Self {
        match err {
            RehearsalError::NotActive => AppError::NotFound("No active rehearsal".to_string()),
            RehearsalError::SceneNotFound => AppError::NotFound("Scene not found".to_string()),
            RehearsalError::EmptyScene | RehearsalError::PositionOutOfRange { .. } => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}
