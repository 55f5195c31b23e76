//! Terminal stand-ins for the phone's microphone, video player and screen
//! navigation.

use chrono::Utc;
use remind_core::{
    media::{AudioClip, Navigator, Permission, Recorder, RecordingHandle, VideoPlayer},
    session::SessionReport,
    RemindError,
};

// ---------------------------------------------------------------------------
// TerminalRecorder
// ---------------------------------------------------------------------------

/// Pretends to capture audio; the answer itself is the act of recording.
pub struct TerminalRecorder {
    deny_permission: bool,
    capturing: bool,
}

impl TerminalRecorder {
    pub fn new(deny_permission: bool) -> Self {
        Self {
            deny_permission,
            capturing: false,
        }
    }
}

impl Recorder for TerminalRecorder {
    fn request_permission(&mut self) -> Permission {
        if self.deny_permission {
            Permission::Denied
        } else {
            Permission::Granted
        }
    }

    fn start(&mut self) -> remind_core::Result<RecordingHandle> {
        if self.capturing {
            return Err(RemindError::Recorder("already capturing".to_string()));
        }
        self.capturing = true;
        let handle = RecordingHandle::new();
        tracing::debug!(recording = %handle.id(), "microphone open");
        Ok(handle)
    }

    fn stop(&mut self, handle: &RecordingHandle) -> remind_core::Result<Option<AudioClip>> {
        if !self.capturing {
            return Ok(None);
        }
        self.capturing = false;
        let elapsed = Utc::now() - handle.started_at();
        Ok(Some(AudioClip {
            recording: handle.id(),
            duration_ms: elapsed.num_milliseconds().max(0) as u64,
            bytes: Vec::new(),
        }))
    }

    fn release(&mut self) {
        self.capturing = false;
        tracing::debug!("microphone released");
    }
}

// ---------------------------------------------------------------------------
// TerminalPlayer
// ---------------------------------------------------------------------------

/// Tracks which clip would be on screen.
#[derive(Default)]
pub struct TerminalPlayer {
    current: Option<String>,
    playing: bool,
}

impl TerminalPlayer {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl VideoPlayer for TerminalPlayer {
    fn load(&mut self, url: &str) -> remind_core::Result<()> {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(RemindError::Player(format!("unsupported video url '{url}'")));
        }
        self.current = Some(url.to_string());
        self.playing = false;
        Ok(())
    }

    fn play(&mut self) {
        self.playing = self.current.is_some();
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn release(&mut self) {
        self.current = None;
        self.playing = false;
    }
}

// ---------------------------------------------------------------------------
// BreakScreen
// ---------------------------------------------------------------------------

/// Where the session hands over once the last step is answered.
pub struct BreakScreen {
    quiet: bool,
}

impl BreakScreen {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Navigator for BreakScreen {
    fn session_complete(&mut self, report: &SessionReport) {
        tracing::info!(avatar = %report.avatar, steps = report.steps.len(), "showing break screen");
        if self.quiet {
            return;
        }
        println!();
        println!("Good Job, you are almost there!");
        println!("Just a bit more to support your situational distress!");
    }
}
