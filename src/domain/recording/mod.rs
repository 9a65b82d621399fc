pub mod dto;
pub mod error;
pub mod service;

pub use dto::{RecordingSession, StartRecordingRequest};
pub use error::RecordingError;
pub use service::{audio_key, RecordingService, RecordingServiceApi};
