use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use uuid::Uuid;

/// One requested playback. `generation` ties it to the sequencer state that
/// issued it; completions for any other generation are stale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackCue {
    pub generation: u64,
    pub scene_id: Uuid,
    pub line_id: Uuid,
    pub position: usize,
    pub audio_reference: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackOutcome {
    Finished,
    Failed,
}

pub type PlaybackFuture = Pin<Box<dyn Future<Output = PlaybackOutcome> + Send + 'static>>;

/// Plays recorded partner audio.
pub trait PlaybackDriver: Send + Sync {
    /// Start playing the cue's audio. Playback counts as started once this
    /// returns; the future resolves when it is over.
    fn play(&self, cue: &PlaybackCue) -> PlaybackFuture;
}

/// Handle on an in-flight play-then-advance task.
#[derive(Debug)]
pub struct PlaybackHandle {
    generation: u64,
    abort: AbortHandle,
}

impl PlaybackHandle {
    pub fn new(generation: u64, abort: AbortHandle) -> Self {
        Self { generation, abort }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(self) {
        tracing::debug!(generation = self.generation, "Cancelling playback");
        self.abort.abort();
    }
}

type Waiters = Arc<Mutex<HashMap<u64, oneshot::Sender<PlaybackOutcome>>>>;

/// Playback performed by the client. The client receives the cue with the
/// rehearsal view, plays the blob and reports the outcome for the cue's
/// generation. Reports that never arrive count as failed after `report_timeout`.
pub struct ClientPlaybackDriver {
    waiters: Waiters,
    report_timeout: Duration,
}

impl ClientPlaybackDriver {
    pub fn new(report_timeout: Duration) -> Self {
        Self {
            waiters: Arc::new(Mutex::new(HashMap::new())),
            report_timeout,
        }
    }

    /// Deliver a client report. Returns false when nothing is waiting for that
    /// generation (already reported, cancelled or never issued).
    pub fn report(&self, generation: u64, outcome: PlaybackOutcome) -> bool {
        let waiter = self.waiters.lock().remove(&generation);
        let accepted = match waiter {
            Some(sender) => sender.send(outcome).is_ok(),
            None => false,
        };

        tracing::debug!(
            generation = generation,
            outcome = ?outcome,
            accepted = accepted,
            "Playback report received"
        );

        accepted
    }

    pub fn waiting(&self) -> usize {
        self.waiters.lock().len()
    }
}

/// Removes the waiter when the playback future is dropped, including when its
/// task is aborted.
struct Registration {
    waiters: Waiters,
    generation: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.waiters.lock().remove(&self.generation);
    }
}

impl PlaybackDriver for ClientPlaybackDriver {
    fn play(&self, cue: &PlaybackCue) -> PlaybackFuture {
        let (sender, receiver) = oneshot::channel();
        self.waiters.lock().insert(cue.generation, sender);

        let registration = Registration {
            waiters: self.waiters.clone(),
            generation: cue.generation,
        };
        let report_timeout = self.report_timeout;
        let generation = cue.generation;

        Box::pin(async move {
            let _registration = registration;
            match tokio::time::timeout(report_timeout, receiver).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => PlaybackOutcome::Failed,
                Err(_) => {
                    tracing::warn!(generation = generation, "No playback report before timeout");
                    PlaybackOutcome::Failed
                }
            }
        })
    }
}
