use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        recording::{RecordingServiceApi, RecordingSession, StartRecordingRequest},
        scene::ScriptLine,
    },
    error::{AppError, AppResult},
};

pub struct RecordingController {
    recording_service: Arc<dyn RecordingServiceApi>,
}

impl RecordingController {
    pub fn new(recording_service: Arc<dyn RecordingServiceApi>) -> Self {
        Self { recording_service }
    }

    /// POST /api/scenes/{id}/lines/{lineId}/recordings - Open a capture session
    pub async fn start_recording(
        State(controller): State<Arc<RecordingController>>,
        Path((scene_id, line_id)): Path<(Uuid, Uuid)>,
        request: Option<Json<StartRecordingRequest>>,
    ) -> AppResult<(StatusCode, Json<RecordingSession>)> {
        let request = request.map(|Json(r)| r).unwrap_or_default();

        let session = controller
            .recording_service
            .start_recording(scene_id, line_id, request.content_type)
            .await?;

        Ok((StatusCode::CREATED, Json(session)))
    }

    /// POST /api/recordings/{sessionId}/chunks - Append captured bytes
    pub async fn append_chunk(
        State(controller): State<Arc<RecordingController>>,
        Path(session_id): Path<Uuid>,
        body: Bytes,
    ) -> AppResult<StatusCode> {
        controller
            .recording_service
            .append_chunk(session_id, &body)
            .await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// POST /api/recordings/{sessionId}/stop - Save the take onto its line
    pub async fn stop_recording(
        State(controller): State<Arc<RecordingController>>,
        Path(session_id): Path<Uuid>,
    ) -> AppResult<Json<ScriptLine>> {
        let line = controller
            .recording_service
            .stop_recording(session_id)
            .await?;
        Ok(Json(line))
    }

    /// DELETE /api/recordings/{sessionId} - Discard a capture session
    pub async fn cancel_recording(
        State(controller): State<Arc<RecordingController>>,
        Path(session_id): Path<Uuid>,
    ) -> AppResult<StatusCode> {
        controller
            .recording_service
            .cancel_recording(session_id)
            .await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// GET /api/audio/{key} - Stored recording bytes
    pub async fn get_audio(
        State(controller): State<Arc<RecordingController>>,
        Path(key): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let blob = controller.recording_service.get_audio(&key).await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&blob.content_type)
                .map_err(|e| AppError::Internal(format!("Invalid stored content type: {}", e)))?,
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

        Ok((StatusCode::OK, headers, Body::from(blob.data)))
    }
}
