use super::error::StoreError;
use super::model::{LinePatch, ParsedLine, Scene, ScriptLine};
use crate::infrastructure::repositories::app_state_repository::SCENES_KEY;
use crate::infrastructure::repositories::AppStateRepository;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory scene collection, newest first, persisted as a whole on every
/// mutation.
///
/// A mutation is built on a copy of the collection and only replaces the live
/// collection once it has been saved, so a failed save changes nothing.
pub struct SceneStore {
    scenes: RwLock<Vec<Scene>>,
    state_repo: Arc<AppStateRepository>,
}

impl SceneStore {
    /// Load the persisted collection. Missing or unreadable state yields an
    /// empty collection rather than an error.
    pub async fn load(state_repo: Arc<AppStateRepository>) -> Self {
        let scenes = match state_repo.load(SCENES_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Scene>>(&json) {
                Ok(scenes) => scenes,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored scenes are unreadable, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load scenes, starting empty");
                Vec::new()
            }
        };

        tracing::info!(scene_count = scenes.len(), "Scene collection loaded");

        Self {
            scenes: RwLock::new(scenes),
            state_repo,
        }
    }

    /// Commit a fully-formed scene at the front of the collection.
    pub async fn create_scene(
        &self,
        title: &str,
        raw_text: String,
        lines: Vec<ParsedLine>,
    ) -> Result<Scene, StoreError> {
        let mut scenes = self.scenes.write().await;

        let title = match title.trim() {
            "" => format!("Scene {}", scenes.len() + 1),
            trimmed => trimmed.to_string(),
        };

        let scene = Scene {
            id: Uuid::new_v4(),
            title,
            raw_text,
            lines: lines.into_iter().map(ScriptLine::from_parsed).collect(),
            created_at: Utc::now(),
        };

        let mut next = Vec::with_capacity(scenes.len() + 1);
        next.push(scene.clone());
        next.extend(scenes.iter().cloned());

        self.persist(&next).await?;
        *scenes = next;

        tracing::info!(
            scene_id = %scene.id,
            line_count = scene.lines.len(),
            "Scene created"
        );

        Ok(scene)
    }

    /// Merge a partial update into one line.
    pub async fn update_line(
        &self,
        scene_id: Uuid,
        line_id: Uuid,
        patch: LinePatch,
    ) -> Result<ScriptLine, StoreError> {
        self.update_line_checked(scene_id, line_id, patch, |_| Ok(()))
            .await
    }

    /// Merge a partial update into one line, committing it only if `check`
    /// accepts the merged result. The check sees the live line under the
    /// write lock.
    pub async fn update_line_checked<F>(
        &self,
        scene_id: Uuid,
        line_id: Uuid,
        patch: LinePatch,
        check: F,
    ) -> Result<ScriptLine, StoreError>
    where
        F: FnOnce(&ScriptLine) -> Result<(), String> + Send,
    {
        let mut scenes = self.scenes.write().await;

        let scene_index = scenes
            .iter()
            .position(|s| s.id == scene_id)
            .ok_or(StoreError::SceneNotFound)?;
        let line_index = scenes[scene_index]
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or(StoreError::LineNotFound)?;

        let mut next = scenes.clone();
        let line = &mut next[scene_index].lines[line_index];
        line.apply(patch);
        check(line).map_err(StoreError::Rejected)?;
        let updated = line.clone();

        self.persist(&next).await?;
        *scenes = next;

        tracing::debug!(scene_id = %scene_id, line_id = %line_id, "Line updated");

        Ok(updated)
    }

    /// Remove a scene. Confirmation is the caller's concern.
    pub async fn delete_scene(&self, scene_id: Uuid) -> Result<Scene, StoreError> {
        let mut scenes = self.scenes.write().await;

        let index = scenes
            .iter()
            .position(|s| s.id == scene_id)
            .ok_or(StoreError::SceneNotFound)?;

        let mut next = scenes.clone();
        let removed = next.remove(index);

        self.persist(&next).await?;
        *scenes = next;

        tracing::info!(scene_id = %scene_id, "Scene deleted");

        Ok(removed)
    }

    /// All scenes, newest first
    pub async fn list_scenes(&self) -> Vec<Scene> {
        self.scenes.read().await.clone()
    }

    pub async fn get_scene(&self, scene_id: Uuid) -> Option<Scene> {
        self.scenes
            .read()
            .await
            .iter()
            .find(|s| s.id == scene_id)
            .cloned()
    }

    async fn persist(&self, scenes: &[Scene]) -> Result<(), StoreError> {
        let json = serde_json::to_string(scenes)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        self.state_repo
            .save(SCENES_KEY, &json)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }
}
