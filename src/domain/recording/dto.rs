use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for POST /api/scenes/:id/lines/:line_id/recordings
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StartRecordingRequest {
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordingSession {
    pub session_id: Uuid,
    pub scene_id: Uuid,
    pub line_id: Uuid,
    pub content_type: String,
}
