pub mod dto;
pub mod error;
pub mod playback;
pub mod sequencer;
pub mod service;

pub use dto::{JumpRequest, PlaybackReport, PlaybackReportResponse, RehearsalView, StartRehearsalRequest};
pub use error::RehearsalError;
pub use playback::{ClientPlaybackDriver, PlaybackCue, PlaybackDriver, PlaybackHandle, PlaybackOutcome};
pub use sequencer::{RehearsalSequencer, Step};
pub use service::{RehearsalService, RehearsalServiceApi};
