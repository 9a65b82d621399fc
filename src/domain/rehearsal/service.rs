use super::dto::RehearsalView;
use super::error::RehearsalError;
use super::playback::{PlaybackCue, PlaybackDriver, PlaybackHandle, PlaybackOutcome};
use super::sequencer::{RehearsalSequencer, Step};
use crate::domain::scene::{Scene, SceneStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct RehearsalService {
    runtime: Arc<Runtime>,
}

/// Shared with the spawned playback tasks. Lock order is sequencer, then store.
struct Runtime {
    sequencer: Mutex<RehearsalSequencer>,
    scene_store: Arc<SceneStore>,
    driver: Arc<dyn PlaybackDriver>,
    auto_advance_delay: Duration,
    playback: parking_lot::Mutex<Option<PlaybackHandle>>,
}

impl RehearsalService {
    pub fn new(
        scene_store: Arc<SceneStore>,
        driver: Arc<dyn PlaybackDriver>,
        auto_advance_delay: Duration,
    ) -> Self {
        Self {
            runtime: Arc::new(Runtime {
                sequencer: Mutex::new(RehearsalSequencer::new()),
                scene_store,
                driver,
                auto_advance_delay,
                playback: parking_lot::Mutex::new(None),
            }),
        }
    }
}

#[async_trait]
pub trait RehearsalServiceApi: Send + Sync {
    /// Begin rehearsing a scene from its first line
    ///
    /// Any running session and its pending playback are replaced.
    async fn start(&self, scene_id: Uuid) -> Result<RehearsalView, RehearsalError>;

    /// Current rehearsal state
    async fn current(&self) -> Result<RehearsalView, RehearsalError>;

    /// Move forward one line; a no-op at the last line
    async fn next(&self) -> Result<RehearsalView, RehearsalError>;

    /// Move back one line; a no-op at the first line
    async fn previous(&self) -> Result<RehearsalView, RehearsalError>;

    /// Move directly to a line index
    async fn jump(&self, position: usize) -> Result<RehearsalView, RehearsalError>;

    /// Show the text of the current partner line
    async fn reveal(&self) -> Result<RehearsalView, RehearsalError>;

    /// Leave rehearsal, cancelling playback and any pending auto-advance.
    /// Returns whether a session was active.
    async fn finish(&self) -> bool;

    /// End the session if it is rehearsing a scene that no longer exists
    async fn scene_removed(&self, scene_id: Uuid);
}

#[async_trait]
impl RehearsalServiceApi for RehearsalService {
    async fn start(&self, scene_id: Uuid) -> Result<RehearsalView, RehearsalError> {
        let mut sequencer = self.runtime.sequencer.lock().await;

        let scene = self
            .runtime
            .scene_store
            .get_scene(scene_id)
            .await
            .ok_or(RehearsalError::SceneNotFound)?;

        let cue = sequencer.enter(&scene)?;
        self.runtime.cancel_playback();
        if let Some(cue) = cue {
            self.runtime.schedule(cue);
        }

        tracing::info!(
            scene_id = %scene_id,
            line_count = scene.lines.len(),
            "Rehearsal started"
        );

        sequencer.view(&scene).ok_or(RehearsalError::NotActive)
    }

    async fn current(&self) -> Result<RehearsalView, RehearsalError> {
        let mut sequencer = self.runtime.sequencer.lock().await;
        let scene = self.runtime.active_scene(&mut sequencer).await?;
        sequencer.view(&scene).ok_or(RehearsalError::NotActive)
    }

    async fn next(&self) -> Result<RehearsalView, RehearsalError> {
        let mut sequencer = self.runtime.sequencer.lock().await;
        let scene = self.runtime.active_scene(&mut sequencer).await?;

        let step = sequencer.next(&scene.lines);
        self.runtime.apply(step);

        sequencer.view(&scene).ok_or(RehearsalError::NotActive)
    }

    async fn previous(&self) -> Result<RehearsalView, RehearsalError> {
        let mut sequencer = self.runtime.sequencer.lock().await;
        let scene = self.runtime.active_scene(&mut sequencer).await?;

        let step = sequencer.previous(&scene.lines);
        self.runtime.apply(step);

        sequencer.view(&scene).ok_or(RehearsalError::NotActive)
    }

    async fn jump(&self, position: usize) -> Result<RehearsalView, RehearsalError> {
        let mut sequencer = self.runtime.sequencer.lock().await;
        let scene = self.runtime.active_scene(&mut sequencer).await?;

        let step = sequencer.jump(position, &scene.lines)?;
        self.runtime.apply(step);

        sequencer.view(&scene).ok_or(RehearsalError::NotActive)
    }

    async fn reveal(&self) -> Result<RehearsalView, RehearsalError> {
        let mut sequencer = self.runtime.sequencer.lock().await;
        let scene = self.runtime.active_scene(&mut sequencer).await?;

        sequencer.reveal()?;

        sequencer.view(&scene).ok_or(RehearsalError::NotActive)
    }

    async fn finish(&self) -> bool {
        let mut sequencer = self.runtime.sequencer.lock().await;
        let was_active = sequencer.finish();
        self.runtime.cancel_playback();

        if was_active {
            tracing::info!("Rehearsal finished");
        }

        was_active
    }

    async fn scene_removed(&self, scene_id: Uuid) {
        let mut sequencer = self.runtime.sequencer.lock().await;
        if sequencer.scene_removed(scene_id) {
            self.runtime.cancel_playback();
            tracing::info!(scene_id = %scene_id, "Rehearsed scene removed, rehearsal ended");
        }
    }
}

impl Runtime {
    /// Scene of the running session. A session whose scene has disappeared is
    /// ended on the spot.
    async fn active_scene(
        &self,
        sequencer: &mut RehearsalSequencer,
    ) -> Result<Scene, RehearsalError> {
        let scene_id = sequencer.scene_id().ok_or(RehearsalError::NotActive)?;

        match self.scene_store.get_scene(scene_id).await {
            Some(scene) => Ok(scene),
            None => {
                sequencer.finish();
                self.cancel_playback();
                Err(RehearsalError::NotActive)
            }
        }
    }

    /// React to a manual position change.
    fn apply(self: &Arc<Self>, step: Step) {
        if let Step::Moved { cue, .. } = step {
            self.cancel_playback();
            if let Some(cue) = cue {
                self.schedule(cue);
            }
        }
    }

    fn cancel_playback(&self) {
        if let Some(handle) = self.playback.lock().take() {
            handle.cancel();
        }
    }

    /// Start playback for `cue` and spawn the task that waits for it to end.
    /// Called with the sequencer lock held, so the task cannot observe state
    /// older than the cue.
    fn schedule(self: &Arc<Self>, cue: PlaybackCue) {
        let generation = cue.generation;
        let playback = self.driver.play(&cue);
        let runtime = Arc::clone(self);

        tracing::debug!(
            generation = generation,
            line_id = %cue.line_id,
            audio_reference = %cue.audio_reference,
            "Partner playback started"
        );

        let task = tokio::spawn(async move {
            let outcome = playback.await;
            runtime.playback_finished(generation, outcome).await;
        });

        let previous = self
            .playback
            .lock()
            .replace(PlaybackHandle::new(generation, task.abort_handle()));
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    async fn playback_finished(self: Arc<Self>, generation: u64, outcome: PlaybackOutcome) {
        let advance = {
            let mut sequencer = self.sequencer.lock().await;
            match self.active_scene(&mut sequencer).await {
                Ok(scene) => sequencer.playback_ended(generation, outcome, &scene.lines),
                Err(_) => false,
            }
        };

        tracing::debug!(
            generation = generation,
            outcome = ?outcome,
            advance = advance,
            "Partner playback ended"
        );

        if !advance {
            self.release(generation);
            return;
        }

        tokio::time::sleep(self.auto_advance_delay).await;

        let mut sequencer = self.sequencer.lock().await;
        let step = match self.active_scene(&mut sequencer).await {
            Ok(scene) => sequencer.auto_advance(generation, &scene.lines),
            Err(_) => Step::Unchanged,
        };

        // this task is finishing on its own; its handle must not abort it
        self.release(generation);

        if let Step::Moved { position, cue } = step {
            tracing::info!(position = position, "Rehearsal auto-advanced");
            if let Some(cue) = cue {
                self.schedule(cue);
            }
        }
    }

    /// Drop the handle for `generation` without aborting its task.
    fn release(&self, generation: u64) {
        let mut slot = self.playback.lock();
        if slot.as_ref().map(PlaybackHandle::generation) == Some(generation) {
            slot.take();
        }
    }
}
