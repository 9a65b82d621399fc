use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to persist settings: {0}")]
    Persistence(String),
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Persistence(msg) => AppError::Internal(msg),
        }
    }
}
