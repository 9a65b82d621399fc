pub mod health;
pub mod recording;
pub mod rehearsal;
pub mod scene;
pub mod settings;

use axum::http::{header, HeaderMap};

/// Declared `Content-Type` of a raw upload, if any
fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}
