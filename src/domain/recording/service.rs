use super::dto::RecordingSession;
use super::error::RecordingError;
use crate::domain::scene::{LinePatch, SceneStore, ScriptLine, StoreError};
use crate::infrastructure::repositories::audio_repository::DEFAULT_AUDIO_CONTENT_TYPE;
use crate::infrastructure::repositories::{AudioBlob, AudioRepository};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Blob key holding the recording of a line
pub fn audio_key(line_id: Uuid) -> String {
    format!("audio_{}", line_id)
}

struct Capture {
    session: RecordingSession,
    data: Vec<u8>,
}

pub struct RecordingService {
    scene_store: Arc<SceneStore>,
    audio_repo: Arc<dyn AudioRepository>,
    max_bytes: usize,
    // a single capture device, so at most one open session
    capture: Mutex<Option<Capture>>,
}

impl RecordingService {
    pub fn new(
        scene_store: Arc<SceneStore>,
        audio_repo: Arc<dyn AudioRepository>,
        max_bytes: usize,
    ) -> Self {
        Self {
            scene_store,
            audio_repo,
            max_bytes,
            capture: Mutex::new(None),
        }
    }
}

#[async_trait]
pub trait RecordingServiceApi: Send + Sync {
    /// Open a capture session for a line
    async fn start_recording(
        &self,
        scene_id: Uuid,
        line_id: Uuid,
        content_type: Option<String>,
    ) -> Result<RecordingSession, RecordingError>;

    /// Append captured bytes, in arrival order
    async fn append_chunk(&self, session_id: Uuid, chunk: &[u8]) -> Result<(), RecordingError>;

    /// Close the session and store the recording as the line's audio
    ///
    /// This operation:
    /// - Saves the captured bytes under the line's audio key (replacing any
    ///   previous take)
    /// - Points the line's `audio_reference` at that key
    ///
    /// A session without captured bytes is discarded and the line is untouched.
    async fn stop_recording(&self, session_id: Uuid) -> Result<ScriptLine, RecordingError>;

    /// Discard a session and whatever it captured
    async fn cancel_recording(&self, session_id: Uuid) -> Result<(), RecordingError>;

    /// Fetch a stored recording
    async fn get_audio(&self, key: &str) -> Result<AudioBlob, RecordingError>;
}

#[async_trait]
impl RecordingServiceApi for RecordingService {
    async fn start_recording(
        &self,
        scene_id: Uuid,
        line_id: Uuid,
        content_type: Option<String>,
    ) -> Result<RecordingSession, RecordingError> {
        let content_type = match content_type.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_AUDIO_CONTENT_TYPE.to_string(),
            Some(ct) if ct.starts_with("audio/") => ct.to_string(),
            Some(ct) => {
                return Err(RecordingError::Invalid(format!(
                    "'{}' is not an audio content type",
                    ct
                )))
            }
        };

        let scene = self
            .scene_store
            .get_scene(scene_id)
            .await
            .ok_or_else(|| RecordingError::NotFound("Scene not found".to_string()))?;
        if scene.line(line_id).is_none() {
            return Err(RecordingError::NotFound("Line not found".to_string()));
        }

        let mut capture = self.capture.lock();
        if let Some(open) = capture.as_ref() {
            tracing::warn!(
                open_session_id = %open.session.session_id,
                line_id = %line_id,
                "Recording refused, capture device busy"
            );
            return Err(RecordingError::DeviceBusy);
        }

        let session = RecordingSession {
            session_id: Uuid::new_v4(),
            scene_id,
            line_id,
            content_type,
        };
        *capture = Some(Capture {
            session: session.clone(),
            data: Vec::new(),
        });

        tracing::info!(
            session_id = %session.session_id,
            scene_id = %scene_id,
            line_id = %line_id,
            content_type = %session.content_type,
            "Recording started"
        );

        Ok(session)
    }

    async fn append_chunk(&self, session_id: Uuid, chunk: &[u8]) -> Result<(), RecordingError> {
        let mut capture = self.capture.lock();
        let open = capture
            .as_mut()
            .filter(|c| c.session.session_id == session_id)
            .ok_or(RecordingError::SessionNotFound)?;

        if open.data.len() + chunk.len() > self.max_bytes {
            return Err(RecordingError::TooLarge {
                limit: self.max_bytes,
            });
        }

        open.data.extend_from_slice(chunk);
        Ok(())
    }

    async fn stop_recording(&self, session_id: Uuid) -> Result<ScriptLine, RecordingError> {
        let Capture { session, data } = self.take(session_id)?;

        if data.is_empty() {
            tracing::warn!(session_id = %session_id, "Recording stopped without captured audio");
            return Err(RecordingError::NothingCaptured);
        }

        let key = audio_key(session.line_id);
        let size = data.len();
        let blob = AudioBlob {
            content_type: session.content_type,
            data,
        };
        self.audio_repo
            .save(&key, &blob)
            .await
            .map_err(RecordingError::Storage)?;

        let patch = LinePatch::audio_reference(Some(key.clone()));
        match self
            .scene_store
            .update_line(session.scene_id, session.line_id, patch)
            .await
        {
            Ok(line) => {
                tracing::info!(
                    session_id = %session_id,
                    line_id = %line.id,
                    audio_reference = %key,
                    size_bytes = size,
                    "Recording saved"
                );
                Ok(line)
            }
            Err(StoreError::Persistence(msg)) => Err(RecordingError::Storage(msg)),
            Err(e) => {
                // line vanished while recording; drop the orphaned take
                tracing::warn!(
                    session_id = %session_id,
                    line_id = %session.line_id,
                    error = %e,
                    "Recorded line no longer exists"
                );
                if let Err(e) = self.audio_repo.delete(&key).await {
                    tracing::warn!(audio_reference = %key, error = %e, "Failed to remove orphaned recording");
                }
                Err(RecordingError::NotFound(e.to_string()))
            }
        }
    }

    async fn cancel_recording(&self, session_id: Uuid) -> Result<(), RecordingError> {
        let capture = self.take(session_id)?;

        tracing::info!(
            session_id = %session_id,
            discarded_bytes = capture.data.len(),
            "Recording cancelled"
        );

        Ok(())
    }

    async fn get_audio(&self, key: &str) -> Result<AudioBlob, RecordingError> {
        self.audio_repo
            .get(key)
            .await
            .map_err(RecordingError::Storage)?
            .ok_or_else(|| RecordingError::NotFound("Audio not found".to_string()))
    }
}

impl RecordingService {
    fn take(&self, session_id: Uuid) -> Result<Capture, RecordingError> {
        let mut capture = self.capture.lock();
        match capture.as_ref() {
            Some(open) if open.session.session_id == session_id => {
                capture.take().ok_or(RecordingError::SessionNotFound)
            }
            _ => Err(RecordingError::SessionNotFound),
        }
    }
}
