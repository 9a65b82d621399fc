use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::content_type;
use crate::{
    domain::{
        document::ExtractedDocument,
        scene::{LinePatch, Scene, SceneServiceApi, ScriptLine},
    },
    error::{AppError, AppResult},
    infrastructure::middleware::RequestId,
};

/// Request for POST /api/scenes
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSceneRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub raw_text: String,
}

/// Query for uploads: the original file name drives type detection and title
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

pub struct SceneController {
    scene_service: Arc<dyn SceneServiceApi>,
}

impl SceneController {
    pub fn new(scene_service: Arc<dyn SceneServiceApi>) -> Self {
        Self { scene_service }
    }

    /// GET /api/scenes - List scenes, newest first
    pub async fn list_scenes(
        State(controller): State<Arc<SceneController>>,
    ) -> AppResult<Json<Vec<Scene>>> {
        Ok(Json(controller.scene_service.list_scenes().await))
    }

    /// POST /api/scenes - Parse raw text into a new scene
    pub async fn create_scene(
        State(controller): State<Arc<SceneController>>,
        Extension(request_id): Extension<RequestId>,
        Json(request): Json<CreateSceneRequest>,
    ) -> AppResult<(StatusCode, Json<Scene>)> {
        tracing::info!(request_id = %request_id.0, "Creating scene from text");

        let scene = controller
            .scene_service
            .create_scene(request.title, request.raw_text)
            .await?;

        Ok((StatusCode::CREATED, Json(scene)))
    }

    /// POST /api/scenes/import - Create a scene from an uploaded script file
    pub async fn import_scene(
        State(controller): State<Arc<SceneController>>,
        Extension(request_id): Extension<RequestId>,
        Query(query): Query<UploadQuery>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<(StatusCode, Json<Scene>)> {
        tracing::info!(
            request_id = %request_id.0,
            file_name = %query.file_name,
            size_bytes = body.len(),
            "Importing scene from file"
        );

        let scene = controller
            .scene_service
            .import_document(&query.file_name, content_type(&headers), &body)
            .await?;

        Ok((StatusCode::CREATED, Json(scene)))
    }

    /// POST /api/documents/extract - Extract text from an uploaded file
    pub async fn extract_document(
        State(controller): State<Arc<SceneController>>,
        Query(query): Query<UploadQuery>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<Json<ExtractedDocument>> {
        let document = controller
            .scene_service
            .extract_document(&query.file_name, content_type(&headers), &body)
            .await?;

        Ok(Json(document))
    }

    /// GET /api/scenes/{id} - Scene with all its lines
    pub async fn get_scene(
        State(controller): State<Arc<SceneController>>,
        Path(scene_id): Path<Uuid>,
    ) -> AppResult<Json<Scene>> {
        let scene = controller.scene_service.get_scene(scene_id).await?;
        Ok(Json(scene))
    }

    /// DELETE /api/scenes/{id}?confirm=true - Delete scene
    pub async fn delete_scene(
        State(controller): State<Arc<SceneController>>,
        Path(scene_id): Path<Uuid>,
        Query(query): Query<DeleteQuery>,
    ) -> AppResult<StatusCode> {
        controller
            .scene_service
            .delete_scene(scene_id, query.confirm)
            .await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// PATCH /api/scenes/{id}/lines/{lineId} - Edit a line
    pub async fn update_line(
        State(controller): State<Arc<SceneController>>,
        Path((scene_id, line_id)): Path<(Uuid, Uuid)>,
        payload: Result<Json<LinePatch>, JsonRejection>,
    ) -> AppResult<Json<ScriptLine>> {
        let Json(patch) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

        if patch.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let line = controller
            .scene_service
            .update_line(scene_id, line_id, patch)
            .await?;

        Ok(Json(line))
    }

    /// POST /api/scenes/{id}/lines/{lineId}/role/toggle - Swap ME and PARTNER
    pub async fn toggle_role(
        State(controller): State<Arc<SceneController>>,
        Path((scene_id, line_id)): Path<(Uuid, Uuid)>,
    ) -> AppResult<Json<ScriptLine>> {
        let line = controller
            .scene_service
            .toggle_role(scene_id, line_id)
            .await?;
        Ok(Json(line))
    }
}
