use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("script too large: {length} characters (limit {limit})")]
    TooLarge { length: usize, limit: usize },
    #[error("upstream service failed: {0}")]
    Upstream(String),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("model response does not match the line schema: {0}")]
    SchemaMismatch(String),
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Invalid(msg) => AppError::BadRequest(msg),
            ParseError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ParseError::Upstream(_) | ParseError::EmptyResponse | ParseError::SchemaMismatch(_) => {
                AppError::ParseFailed(err.to_string())
            }
        }
    }
}
