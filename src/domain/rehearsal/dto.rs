use super::playback::{PlaybackCue, PlaybackOutcome};
use crate::domain::scene::ScriptLine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a client renders for the line currently being rehearsed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RehearsalView {
    pub scene_id: Uuid,
    pub scene_title: String,
    pub position: usize,
    pub total: usize,
    pub line: ScriptLine,
    /// Partner text stays in `line` but should be hidden while this is set
    pub obscured: bool,
    pub can_next: bool,
    pub can_previous: bool,
    pub is_playing_audio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackCue>,
}

/// Request for POST /api/rehearsal
#[derive(Debug, Serialize, Deserialize)]
pub struct StartRehearsalRequest {
    pub scene_id: Uuid,
}

/// Request for POST /api/rehearsal/jump
#[derive(Debug, Serialize, Deserialize)]
pub struct JumpRequest {
    pub position: usize,
}

/// Request for POST /api/rehearsal/playback
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaybackReport {
    pub generation: u64,
    pub outcome: PlaybackOutcome,
}

/// Response for POST /api/rehearsal/playback
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaybackReportResponse {
    pub accepted: bool,
}
