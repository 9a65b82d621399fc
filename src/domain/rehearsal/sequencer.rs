use super::dto::RehearsalView;
use super::error::RehearsalError;
use super::playback::{PlaybackCue, PlaybackOutcome};
use crate::domain::scene::{Role, Scene, ScriptLine};
use uuid::Uuid;

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Position did not change; any pending playback keeps going
    Unchanged,
    /// Position changed; `cue` is the playback to start on arrival
    Moved {
        position: usize,
        cue: Option<PlaybackCue>,
    },
}

#[derive(Debug, Clone)]
struct Playback {
    cue: PlaybackCue,
    completed: bool,
    advance_pending: bool,
}

#[derive(Debug, Clone)]
struct Session {
    scene_id: Uuid,
    position: usize,
    revealed: bool,
    playback: Option<Playback>,
}

impl Session {
    fn is_playing_audio(&self) -> bool {
        self.playback.as_ref().is_some_and(|p| !p.completed)
    }
}

/// Rehearsal position state machine.
///
/// Idle until `enter`, then Rehearsing with a position inside the scene. Every
/// arrival at a line (and leaving the session) bumps `generation`; playback
/// completions carry the generation of the cue they belong to and are ignored
/// once it has moved on.
#[derive(Debug, Default)]
pub struct RehearsalSequencer {
    session: Option<Session>,
    generation: u64,
}

impl RehearsalSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn scene_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.scene_id)
    }

    pub fn position(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.position)
    }

    pub fn is_playing_audio(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_playing_audio)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start rehearsing `scene` from its first line, replacing any session.
    pub fn enter(&mut self, scene: &Scene) -> Result<Option<PlaybackCue>, RehearsalError> {
        if !scene.is_rehearsable() {
            return Err(RehearsalError::EmptyScene);
        }

        self.session = Some(Session {
            scene_id: scene.id,
            position: 0,
            revealed: false,
            playback: None,
        });

        Ok(self.arrive(&scene.lines))
    }

    pub fn next(&mut self, lines: &[ScriptLine]) -> Step {
        match self.position() {
            Some(position) if position + 1 < lines.len() => self.move_to(position + 1, lines),
            _ => Step::Unchanged,
        }
    }

    pub fn previous(&mut self, lines: &[ScriptLine]) -> Step {
        match self.position() {
            Some(position) if position > 0 && !lines.is_empty() => {
                self.move_to((position - 1).min(lines.len() - 1), lines)
            }
            _ => Step::Unchanged,
        }
    }

    pub fn jump(&mut self, position: usize, lines: &[ScriptLine]) -> Result<Step, RehearsalError> {
        let current = self.position().ok_or(RehearsalError::NotActive)?;

        if position >= lines.len() {
            return Err(RehearsalError::PositionOutOfRange {
                position,
                total: lines.len(),
            });
        }

        if position == current {
            return Ok(Step::Unchanged);
        }

        Ok(self.move_to(position, lines))
    }

    /// Leave the session. Returns whether one was active.
    pub fn finish(&mut self) -> bool {
        if self.session.take().is_some() {
            self.generation += 1;
            true
        } else {
            false
        }
    }

    /// Show the current partner line's text without moving.
    pub fn reveal(&mut self) -> Result<(), RehearsalError> {
        let session = self.session.as_mut().ok_or(RehearsalError::NotActive)?;
        session.revealed = true;
        Ok(())
    }

    /// End the session if it is rehearsing the removed scene.
    pub fn scene_removed(&mut self, scene_id: Uuid) -> bool {
        if self.scene_id() == Some(scene_id) {
            self.finish()
        } else {
            false
        }
    }

    /// Record the end of the playback issued for `generation`.
    ///
    /// Returns true when an auto-advance should be scheduled: the playback is
    /// current, finished normally, the line still matches what was played and
    /// there is a next line. A given playback completes at most once.
    pub fn playback_ended(
        &mut self,
        generation: u64,
        outcome: PlaybackOutcome,
        lines: &[ScriptLine],
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let position = session.position;
        let Some(playback) = session.playback.as_mut() else {
            return false;
        };

        if playback.cue.generation != generation || playback.completed {
            return false;
        }

        playback.completed = true;

        if outcome != PlaybackOutcome::Finished || !cue_matches(&playback.cue, lines) {
            return false;
        }

        session.revealed = true;

        let has_next = position + 1 < lines.len();
        playback.advance_pending = has_next;
        has_next
    }

    /// Perform the auto-advance granted by `playback_ended` for `generation`.
    /// Anything that happened in between (navigation, finish, edits to the
    /// played line) turns this into a no-op.
    pub fn auto_advance(&mut self, generation: u64, lines: &[ScriptLine]) -> Step {
        if generation != self.generation {
            return Step::Unchanged;
        }

        let Some(session) = self.session.as_mut() else {
            return Step::Unchanged;
        };
        let position = session.position;
        let Some(playback) = session.playback.as_mut() else {
            return Step::Unchanged;
        };

        if !playback.advance_pending {
            return Step::Unchanged;
        }
        playback.advance_pending = false;

        if !cue_matches(&playback.cue, lines) || position + 1 >= lines.len() {
            return Step::Unchanged;
        }

        self.move_to(position + 1, lines)
    }

    pub fn view(&self, scene: &Scene) -> Option<RehearsalView> {
        let session = self.session.as_ref()?;
        if session.scene_id != scene.id {
            return None;
        }

        let line = scene.lines.get(session.position)?;
        let is_playing_audio = session.is_playing_audio();
        let playback = session
            .playback
            .as_ref()
            .filter(|p| !p.completed)
            .map(|p| p.cue.clone());

        Some(RehearsalView {
            scene_id: scene.id,
            scene_title: scene.title.clone(),
            position: session.position,
            total: scene.lines.len(),
            line: line.clone(),
            obscured: line.role == Role::Partner && !session.revealed && !is_playing_audio,
            can_next: session.position + 1 < scene.lines.len(),
            can_previous: session.position > 0,
            is_playing_audio,
            playback,
        })
    }

    fn move_to(&mut self, position: usize, lines: &[ScriptLine]) -> Step {
        if let Some(session) = self.session.as_mut() {
            session.position = position;
        }
        let cue = self.arrive(lines);

        tracing::debug!(
            position = position,
            generation = self.generation,
            plays_audio = cue.is_some(),
            "Rehearsal position changed"
        );

        Step::Moved { position, cue }
    }

    /// Reset per-line state at the current position and issue its cue.
    fn arrive(&mut self, lines: &[ScriptLine]) -> Option<PlaybackCue> {
        self.generation += 1;
        let generation = self.generation;

        let session = self.session.as_mut()?;
        session.revealed = false;
        session.playback = None;

        let line = lines.get(session.position)?;
        let cue = PlaybackCue {
            generation,
            scene_id: session.scene_id,
            line_id: line.id,
            position: session.position,
            audio_reference: line.playback_reference()?.to_string(),
        };

        session.playback = Some(Playback {
            cue: cue.clone(),
            completed: false,
            advance_pending: false,
        });

        Some(cue)
    }
}

fn cue_matches(cue: &PlaybackCue, lines: &[ScriptLine]) -> bool {
    lines.get(cue.position).is_some_and(|line| {
        line.id == cue.line_id && line.playback_reference() == Some(cue.audio_reference.as_str())
    })
}
