//! Capabilities a session borrows from its platform (microphone, video
//! player, navigation) and the host that wires them to a controller.
//!
//! `SessionHost` owns the microphone and player for as long as the session
//! screen is up. Dropping it releases both, whatever path the session took
//! to end.

use crate::error::{RemindError, Result};
use crate::session::{Advance, SessionController, SessionReport};
use crate::types::InputMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
}

/// Identifies one capture between `start` and `stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingHandle {
    id: Uuid,
    started_at: DateTime<Utc>,
}

impl RecordingHandle {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Default for RecordingHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct AudioClip {
    pub recording: Uuid,
    pub duration_ms: u64,
    pub bytes: Vec<u8>,
}

pub trait Recorder {
    fn request_permission(&mut self) -> Permission;

    fn start(&mut self) -> Result<RecordingHandle>;

    /// Finish a capture. `Ok(None)` when nothing audible was captured.
    fn stop(&mut self, handle: &RecordingHandle) -> Result<Option<AudioClip>>;

    /// Abort any capture and give the microphone back. Must be idempotent.
    fn release(&mut self);
}

// ---------------------------------------------------------------------------
// VideoPlayer
// ---------------------------------------------------------------------------

/// Notifications a player sends back to its host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "detail", rename_all = "snake_case")]
pub enum PlayerEvent {
    Ready,
    Failed(String),
    EndedPlaying,
}

/// Last known state of the on-screen video, for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Ended,
    Failed(String),
}

pub trait VideoPlayer {
    fn load(&mut self, url: &str) -> Result<()>;

    fn play(&mut self);

    fn pause(&mut self);

    /// Stop playback and free the current clip. Must be idempotent.
    fn release(&mut self);
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

pub trait Navigator {
    /// Called once, when the last step is answered.
    fn session_complete(&mut self, report: &SessionReport);
}

// ---------------------------------------------------------------------------
// SessionHost
// ---------------------------------------------------------------------------

pub struct SessionHost<R: Recorder, P: VideoPlayer, N: Navigator> {
    controller: SessionController,
    recorder: R,
    player: P,
    navigator: N,
    permission: Option<Permission>,
    active: Option<RecordingHandle>,
    loaded_url: Option<String>,
    playback: PlaybackStatus,
    released: bool,
}

impl<R: Recorder, P: VideoPlayer, N: Navigator> SessionHost<R, P, N> {
    pub fn new(controller: SessionController, recorder: R, player: P, navigator: N) -> Self {
        let mut host = Self {
            controller,
            recorder,
            player,
            navigator,
            permission: None,
            active: None,
            loaded_url: None,
            playback: PlaybackStatus::Idle,
            released: false,
        };
        host.sync_video();
        host
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn playback(&self) -> &PlaybackStatus {
        &self.playback
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    // -----------------------------------------------------------------------
    // Session actions
    // -----------------------------------------------------------------------

    pub fn toggle_input_mode(&mut self) -> InputMode {
        self.discard_active_recording();
        let mode = self.controller.toggle_input_mode();
        self.sync_video();
        mode
    }

    /// Start capturing an answer. Permission denial or a recorder failure is
    /// returned to the caller and leaves the session untouched.
    pub fn begin_recording(&mut self) -> Result<bool> {
        let state = self.controller.state();
        if self.controller.is_complete()
            || state.input_mode() != InputMode::Voice
            || state.is_recording()
        {
            return Ok(false);
        }

        if self.permission != Some(Permission::Granted) {
            let permission = self.recorder.request_permission();
            self.permission = Some(permission);
            if permission == Permission::Denied {
                tracing::warn!("microphone permission denied");
                return Err(RemindError::MicrophoneDenied);
            }
        }

        let handle = self.recorder.start()?;
        self.controller.begin_recording();
        self.active = Some(handle);
        self.sync_video();
        Ok(true)
    }

    /// Finish the capture in progress. If the recorder fails to stop, the
    /// session stays in the recording state so the caller can retry.
    pub fn end_recording(&mut self) -> Result<bool> {
        let Some(handle) = self.active.as_ref() else {
            return Ok(false);
        };
        let clip = self.recorder.stop(handle)?;
        match clip {
            Some(clip) => tracing::debug!(
                recording = %clip.recording,
                duration_ms = clip.duration_ms,
                bytes = clip.bytes.len(),
                "recording captured"
            ),
            None => tracing::debug!("recording stopped with no audio"),
        }
        self.active = None;
        self.controller.end_recording();
        self.sync_video();
        Ok(true)
    }

    pub fn add_text_tag(&mut self, text: &str) -> bool {
        self.controller.add_text_tag(text)
    }

    pub fn remove_text_tag(&mut self, text: &str) -> bool {
        self.controller.remove_text_tag(text)
    }

    pub fn clear_step_evidence(&mut self) {
        self.discard_active_recording();
        self.controller.clear_step_evidence();
        self.sync_video();
    }

    pub fn can_advance(&self) -> bool {
        self.controller.can_advance()
    }

    pub fn advance(&mut self) -> Advance {
        if !self.controller.can_advance() {
            return Advance::Ignored;
        }
        self.discard_active_recording();
        let outcome = self.controller.advance();
        match outcome {
            Advance::Completed => {
                self.player.pause();
                if let Some(report) = self.controller.report() {
                    self.navigator.session_complete(&report);
                }
            }
            Advance::Moved(_) => self.sync_video(),
            Advance::Ignored => {}
        }
        outcome
    }

    /// Feed a player notification back in. Playback problems are shown to
    /// the user but never block the session.
    pub fn on_player_event(&mut self, event: PlayerEvent) {
        self.playback = match event {
            PlayerEvent::Ready => PlaybackStatus::Playing,
            PlayerEvent::EndedPlaying => PlaybackStatus::Ended,
            PlayerEvent::Failed(reason) => {
                tracing::warn!(url = ?self.loaded_url, %reason, "video playback failed");
                PlaybackStatus::Failed(reason)
            }
        };
    }

    /// Release the microphone and the player. Called automatically on drop.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.discard_active_recording();
        self.recorder.release();
        self.player.pause();
        self.player.release();
        self.loaded_url = None;
        self.playback = PlaybackStatus::Idle;
        self.released = true;
        tracing::debug!("session media released");
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Stop a capture whose answer is about to be thrown away.
    fn discard_active_recording(&mut self) {
        if let Some(handle) = self.active.take() {
            if let Err(e) = self.recorder.stop(&handle) {
                tracing::warn!(error = %e, "failed to stop discarded recording");
            }
            self.controller.cancel_recording();
        }
    }

    fn sync_video(&mut self) {
        let url = self.controller.current_video();
        if self.loaded_url.as_deref() == Some(url) {
            return;
        }
        let url = url.to_string();
        tracing::debug!(%url, "loading video");
        self.player.pause();
        match self.player.load(&url) {
            Ok(()) => {
                self.player.play();
                self.playback = PlaybackStatus::Loading;
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "video failed to load");
                self.playback = PlaybackStatus::Failed(e.to_string());
            }
        }
        self.loaded_url = Some(url);
    }
}

impl<R: Recorder, P: VideoPlayer, N: Navigator> Drop for SessionHost<R, P, N> {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
