use super::error::SceneServiceError;
use super::model::{LinePatch, Scene, ScriptLine};
use super::store::SceneStore;
use crate::domain::document::{extract_text, ExtractedDocument};
use crate::domain::recording::audio_key;
use crate::domain::rehearsal::RehearsalServiceApi;
use crate::domain::script::ScriptParserApi;
use crate::infrastructure::repositories::AudioRepository;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct SceneService {
    scene_store: Arc<SceneStore>,
    parser: Arc<dyn ScriptParserApi>,
    audio_repo: Arc<dyn AudioRepository>,
    rehearsal: Arc<dyn RehearsalServiceApi>,
}

impl SceneService {
    pub fn new(
        scene_store: Arc<SceneStore>,
        parser: Arc<dyn ScriptParserApi>,
        audio_repo: Arc<dyn AudioRepository>,
        rehearsal: Arc<dyn RehearsalServiceApi>,
    ) -> Self {
        Self {
            scene_store,
            parser,
            audio_repo,
            rehearsal,
        }
    }
}

#[async_trait]
pub trait SceneServiceApi: Send + Sync {
    /// All scenes, newest first
    async fn list_scenes(&self) -> Vec<Scene>;

    async fn get_scene(&self, scene_id: Uuid) -> Result<Scene, SceneServiceError>;

    /// Parse raw script text and store the result as a new scene
    ///
    /// This operation:
    /// - Sends the raw text to the script parser
    /// - Commits the scene only once parsing succeeded
    ///
    /// A parse failure leaves the collection untouched.
    async fn create_scene(
        &self,
        title: Option<String>,
        raw_text: String,
    ) -> Result<Scene, SceneServiceError>;

    /// Extract text from an uploaded file, then create a scene from it titled
    /// after the file
    async fn import_document(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Scene, SceneServiceError>;

    /// Extract text from an uploaded file without creating anything
    async fn extract_document(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<ExtractedDocument, SceneServiceError>;

    /// Merge a partial edit into a line
    async fn update_line(
        &self,
        scene_id: Uuid,
        line_id: Uuid,
        patch: LinePatch,
    ) -> Result<ScriptLine, SceneServiceError>;

    /// Swap a line between ME and PARTNER
    async fn toggle_role(&self, scene_id: Uuid, line_id: Uuid)
        -> Result<ScriptLine, SceneServiceError>;

    /// Remove a scene once the caller has confirmed
    ///
    /// An active rehearsal of the scene is ended and its recordings are
    /// removed; failures removing recordings are only logged.
    async fn delete_scene(&self, scene_id: Uuid, confirmed: bool)
        -> Result<(), SceneServiceError>;
}

#[async_trait]
impl SceneServiceApi for SceneService {
    async fn list_scenes(&self) -> Vec<Scene> {
        self.scene_store.list_scenes().await
    }

    async fn get_scene(&self, scene_id: Uuid) -> Result<Scene, SceneServiceError> {
        self.scene_store
            .get_scene(scene_id)
            .await
            .ok_or_else(|| SceneServiceError::NotFound("Scene not found".to_string()))
    }

    async fn create_scene(
        &self,
        title: Option<String>,
        raw_text: String,
    ) -> Result<Scene, SceneServiceError> {
        tracing::info!(
            raw_text_length = raw_text.len(),
            has_title = title.is_some(),
            "Scene creation requested"
        );

        // no lock is held while the parser runs
        let lines = self.parser.parse(&raw_text).await?;

        let scene = self
            .scene_store
            .create_scene(title.as_deref().unwrap_or_default(), raw_text, lines)
            .await?;

        Ok(scene)
    }

    async fn import_document(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Scene, SceneServiceError> {
        let document = extract_text(file_name, content_type, bytes)?;
        self.create_scene(Some(document.title), document.text).await
    }

    async fn extract_document(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<ExtractedDocument, SceneServiceError> {
        Ok(extract_text(file_name, content_type, bytes)?)
    }

    async fn update_line(
        &self,
        scene_id: Uuid,
        line_id: Uuid,
        patch: LinePatch,
    ) -> Result<ScriptLine, SceneServiceError> {
        // references are only ever set by a finished recording
        if matches!(patch.audio_reference, Some(Some(_))) {
            return Err(SceneServiceError::Invalid(
                "audio_reference can only be cleared".to_string(),
            ));
        }

        Ok(self
            .scene_store
            .update_line_checked(scene_id, line_id, patch, validate_line)
            .await?)
    }

    async fn toggle_role(
        &self,
        scene_id: Uuid,
        line_id: Uuid,
    ) -> Result<ScriptLine, SceneServiceError> {
        let scene = self.get_scene(scene_id).await?;
        let role = scene
            .line(line_id)
            .map(|line| line.role.toggled())
            .ok_or_else(|| SceneServiceError::NotFound("Line not found".to_string()))?;

        let line = self
            .scene_store
            .update_line(scene_id, line_id, LinePatch::role(role))
            .await?;

        tracing::info!(scene_id = %scene_id, line_id = %line_id, role = %role, "Line role toggled");

        Ok(line)
    }

    async fn delete_scene(&self, scene_id: Uuid, confirmed: bool) -> Result<(), SceneServiceError> {
        if !confirmed {
            return Err(SceneServiceError::Invalid(
                "Deleting a scene must be confirmed".to_string(),
            ));
        }

        let removed = self.scene_store.delete_scene(scene_id).await?;

        self.rehearsal.scene_removed(scene_id).await;

        // only this scene's own recordings, keyed by line id
        let keys = removed.lines.iter().filter_map(|line| {
            let key = audio_key(line.id);
            (line.audio_reference.as_deref() == Some(key.as_str())).then_some(key)
        });
        for key in keys {
            if let Err(e) = self.audio_repo.delete(&key).await {
                tracing::warn!(
                    scene_id = %scene_id,
                    audio_reference = %key,
                    error = %e,
                    "Failed to remove recording of deleted scene"
                );
            }
        }

        Ok(())
    }
}

fn validate_line(line: &ScriptLine) -> Result<(), String> {
    if line.character.trim().is_empty() {
        return Err("Character cannot be empty".to_string());
    }

    let has_direction = line
        .direction
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if line.text.trim().is_empty() && !has_direction {
        return Err("A line needs text or a direction".to_string());
    }

    Ok(())
}
