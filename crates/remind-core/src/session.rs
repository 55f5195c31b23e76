//! The guided grounding session.
//!
//! `SessionController` owns the step sequence and the per-step capture state.
//! All transitions are synchronous and total: an action that does not apply
//! in the current state is ignored and reported as such, never an error.

use crate::avatar::Avatar;
use crate::prompts;
use crate::types::{InputMode, Language, Step};
use crate::video::{self, VideoDefaults, VideoSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of typed answers kept for one step.
pub const MAX_TAGS: usize = 5;

// ---------------------------------------------------------------------------
// StepInput
// ---------------------------------------------------------------------------

/// Capture state for the current step. Voice and text are mutually exclusive
/// within a step, so each mode carries only its own evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StepInput {
    Voice {
        is_recording: bool,
        has_recording: bool,
    },
    /// Most recent tag first.
    Text { tags: Vec<String> },
}

impl StepInput {
    pub fn empty(mode: InputMode) -> Self {
        match mode {
            InputMode::Voice => StepInput::Voice {
                is_recording: false,
                has_recording: false,
            },
            InputMode::Text => StepInput::Text { tags: Vec::new() },
        }
    }

    pub fn mode(&self) -> InputMode {
        match self {
            StepInput::Voice { .. } => InputMode::Voice,
            StepInput::Text { .. } => InputMode::Text,
        }
    }

    pub fn has_evidence(&self) -> bool {
        match self {
            StepInput::Voice { has_recording, .. } => *has_recording,
            StepInput::Text { tags } => !tags.is_empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub step: Step,
    pub input: StepInput,
}

impl SessionState {
    fn new() -> Self {
        Self {
            step: Step::first(),
            input: StepInput::empty(InputMode::Voice),
        }
    }

    pub fn current_step_index(&self) -> usize {
        self.step.index()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input.mode()
    }

    pub fn is_recording(&self) -> bool {
        matches!(
            self.input,
            StepInput::Voice {
                is_recording: true,
                ..
            }
        )
    }

    pub fn has_recording(&self) -> bool {
        matches!(
            self.input,
            StepInput::Voice {
                has_recording: true,
                ..
            }
        )
    }

    pub fn tags(&self) -> &[String] {
        match &self.input {
            StepInput::Text { tags } => tags,
            StepInput::Voice { .. } => &[],
        }
    }

    pub fn progress(&self) -> f32 {
        self.step.progress()
    }
}

// ---------------------------------------------------------------------------
// Outcomes, events, report
// ---------------------------------------------------------------------------

/// Result of [`SessionController::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(Step),
    /// The last step was answered. The host navigates away.
    Completed,
    /// `can_advance` was false, or the session already completed.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    StepChanged { from: Step, to: Step },
    SessionComplete,
}

/// What the recipient gave on one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub mode: InputMode,
    pub recorded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl StepRecord {
    fn capture(state: &SessionState) -> Self {
        Self {
            step: state.step,
            mode: state.input_mode(),
            recorded: state.has_recording(),
            tags: state.tags().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub avatar: String,
    pub language: Language,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

pub struct SessionController {
    avatar: Avatar,
    videos: VideoSet,
    idle_video: String,
    state: SessionState,
    history: Vec<StepRecord>,
    events: Vec<SessionEvent>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionController {
    /// Begin a session. A missing avatar is replaced by the built-in one; the
    /// session always starts.
    pub fn start(avatar: Option<Avatar>, defaults: &VideoDefaults) -> Self {
        let avatar = avatar.unwrap_or_else(|| {
            tracing::warn!("no avatar supplied, using the built-in default");
            Avatar::fallback()
        });
        if let Language::Unknown(raw) = &avatar.language {
            tracing::warn!(avatar = %avatar.id, language = %raw, "unknown language, using english prompts");
        }
        let videos = video::resolve_video_set(&avatar, defaults);
        let idle_video = video::idle_video(&avatar, defaults).to_string();
        tracing::info!(avatar = %avatar.id, videos = %videos.source(), "session started");

        Self {
            avatar,
            videos,
            idle_video,
            state: SessionState::new(),
            history: Vec::new(),
            events: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_step(&self) -> Step {
        self.state.step
    }

    pub fn prompt(&self) -> &'static str {
        prompts::prompt(self.state.step, &self.avatar.language)
    }

    pub fn progress(&self) -> f32 {
        self.state.progress()
    }

    pub fn video_set(&self) -> &VideoSet {
        &self.videos
    }

    /// The clip the player should show right now.
    pub fn current_video(&self) -> &str {
        if self.state.is_recording() {
            &self.idle_video
        } else {
            self.videos.narration(self.state.step)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn can_advance(&self) -> bool {
        if self.is_complete() {
            return false;
        }
        !self.state.step.requires_evidence() || self.state.input.has_evidence()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Switch between voice and text. Whatever was captured in the old mode
    /// is discarded.
    pub fn toggle_input_mode(&mut self) -> InputMode {
        if self.is_complete() {
            return self.state.input_mode();
        }
        let mode = self.state.input_mode().toggled();
        self.state.input = StepInput::empty(mode);
        tracing::debug!(step = %self.state.step, %mode, "input mode changed");
        mode
    }

    pub fn begin_recording(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        match &mut self.state.input {
            StepInput::Voice { is_recording, .. } if !*is_recording => {
                *is_recording = true;
                tracing::debug!(step = %self.state.step, "recording started");
                true
            }
            _ => false,
        }
    }

    pub fn end_recording(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        match &mut self.state.input {
            StepInput::Voice {
                is_recording,
                has_recording,
            } if *is_recording => {
                *is_recording = false;
                *has_recording = true;
                tracing::debug!(step = %self.state.step, "recording stopped");
                true
            }
            _ => false,
        }
    }

    /// Abandon an in-progress recording without counting it as evidence.
    pub fn cancel_recording(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        match &mut self.state.input {
            StepInput::Voice { is_recording, .. } if *is_recording => {
                *is_recording = false;
                true
            }
            _ => false,
        }
    }

    pub fn add_text_tag(&mut self, text: &str) -> bool {
        if self.is_complete() {
            return false;
        }
        let text = text.trim();
        match &mut self.state.input {
            StepInput::Text { tags } if !text.is_empty() && tags.len() < MAX_TAGS => {
                tags.insert(0, text.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn remove_text_tag(&mut self, text: &str) -> bool {
        if self.is_complete() {
            return false;
        }
        let StepInput::Text { tags } = &mut self.state.input else {
            return false;
        };
        let text = text.trim();
        match tags.iter().position(|t| t == text) {
            Some(pos) => {
                tags.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Reset the current step's capture state without moving on.
    pub fn clear_step_evidence(&mut self) {
        if self.is_complete() {
            return;
        }
        self.state.input = StepInput::empty(self.state.input_mode());
    }

    pub fn advance(&mut self) -> Advance {
        if !self.can_advance() {
            return Advance::Ignored;
        }
        self.history.push(StepRecord::capture(&self.state));

        match self.state.step.next() {
            Some(next) => {
                let from = self.state.step;
                self.state.step = next;
                self.state.input = StepInput::empty(self.state.input_mode());
                self.events.push(SessionEvent::StepChanged { from, to: next });
                tracing::debug!(%from, to = %next, "step advanced");
                Advance::Moved(next)
            }
            None => {
                self.completed_at = Some(Utc::now());
                self.events.push(SessionEvent::SessionComplete);
                tracing::info!(avatar = %self.avatar.id, "session complete");
                Advance::Completed
            }
        }
    }

    /// Events emitted since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Summary of the finished session; `None` until it completes.
    pub fn report(&self) -> Option<SessionReport> {
        let completed_at = self.completed_at?;
        Some(SessionReport {
            avatar: self.avatar.id.clone(),
            language: self.avatar.language.clone(),
            started_at: self.started_at,
            completed_at,
            steps: self.history.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Theme;

    fn start() -> SessionController {
        SessionController::start(None, &VideoDefaults::default())
    }

    /// Satisfy the current step with a voice recording.
    fn answer(session: &mut SessionController) {
        if session.state().input_mode() == InputMode::Text {
            session.toggle_input_mode();
        }
        assert!(session.begin_recording());
        assert!(session.end_recording());
    }

    fn goto(session: &mut SessionController, step: Step) {
        while session.current_step() != step {
            answer(session);
            assert!(matches!(session.advance(), Advance::Moved(_)));
        }
    }

    #[test]
    fn start_without_avatar_uses_fallback() {
        let session = start();
        assert!(session.avatar().is_fallback());
        assert_eq!(session.state().current_step_index(), 0);
        assert_eq!(session.state().input_mode(), InputMode::Voice);
        assert!(!session.state().is_recording());
        assert!(!session.state().input.has_evidence());
        assert_eq!(session.progress(), 0.0);
        assert_eq!(session.prompt(), "Its OKAY, I Got U");
    }

    #[test]
    fn walkthrough_progress_and_completion() {
        let mut session = start();
        let expected = [0.0, 0.2, 0.2, 0.4, 0.6, 0.8, 1.0];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(session.state().current_step_index(), i);
            assert_eq!(session.progress(), *want);
            if i < Step::COUNT - 1 {
                answer(&mut session);
                assert_eq!(session.advance(), Advance::Moved(Step::all()[i + 1]));
            }
        }

        session.drain_events();
        answer(&mut session);
        assert_eq!(session.advance(), Advance::Completed);
        assert_eq!(session.state().current_step_index(), 6);
        let events = session.drain_events();
        assert_eq!(events, vec![SessionEvent::SessionComplete]);

        assert_eq!(session.advance(), Advance::Ignored);
        assert!(session.drain_events().is_empty());
        assert_eq!(session.state().current_step_index(), 6);
    }

    #[test]
    fn exempt_steps_advance_without_evidence() {
        let mut session = start();
        assert!(session.can_advance());
        assert_eq!(session.advance(), Advance::Moved(Step::See));

        goto(&mut session, Step::Encouragement);
        assert!(!session.state().input.has_evidence());
        assert!(session.can_advance());
    }

    #[test]
    fn sensory_steps_require_evidence() {
        for step in [Step::See, Step::Touch, Step::Hear, Step::Smell, Step::Taste] {
            let mut session = start();
            goto(&mut session, step);
            assert!(!session.can_advance(), "{step} advanced without evidence");
            assert_eq!(session.advance(), Advance::Ignored);
            assert_eq!(session.current_step(), step);

            session.begin_recording();
            assert!(!session.can_advance(), "recording in progress is not evidence");
            session.end_recording();
            assert!(session.can_advance());

            session.toggle_input_mode();
            assert!(!session.can_advance());
            session.add_text_tag("tree");
            assert!(session.can_advance());
        }
    }

    #[test]
    fn mode_switch_clears_evidence() {
        let mut session = start();
        goto(&mut session, Step::See);
        session.begin_recording();
        session.end_recording();
        assert!(session.state().has_recording());

        assert_eq!(session.toggle_input_mode(), InputMode::Text);
        assert!(!session.state().has_recording());
        assert!(session.state().tags().is_empty());
        assert!(!session.can_advance());

        session.add_text_tag("lamp");
        assert_eq!(session.toggle_input_mode(), InputMode::Voice);
        assert!(session.state().tags().is_empty());
        assert!(!session.can_advance());
    }

    #[test]
    fn toggle_mid_recording_stops_it() {
        let mut session = start();
        session.begin_recording();
        session.toggle_input_mode();
        session.toggle_input_mode();
        assert!(!session.state().is_recording());
        assert!(!session.state().has_recording());
    }

    #[test]
    fn recording_guards() {
        let mut session = start();
        assert!(!session.end_recording());
        assert!(session.begin_recording());
        assert!(!session.begin_recording());
        assert!(session.end_recording());
        assert!(!session.end_recording());

        session.toggle_input_mode();
        assert!(!session.begin_recording());
        assert!(!session.state().is_recording());
    }

    #[test]
    fn cancel_recording_leaves_no_evidence() {
        let mut session = start();
        goto(&mut session, Step::See);
        session.begin_recording();
        assert!(session.cancel_recording());
        assert!(!session.state().is_recording());
        assert!(!session.can_advance());
    }

    #[test]
    fn tags_are_most_recent_first_and_capped() {
        let mut session = start();
        session.toggle_input_mode();
        for tag in ["one", "two", "three", "four", "five", "six"] {
            session.add_text_tag(tag);
        }
        assert_eq!(
            session.state().tags(),
            &["five", "four", "three", "two", "one"]
        );
    }

    #[test]
    fn blank_tags_and_voice_mode_tags_are_ignored() {
        let mut session = start();
        assert!(!session.add_text_tag("lamp"));
        session.toggle_input_mode();
        assert!(!session.add_text_tag(""));
        assert!(!session.add_text_tag("   "));
        assert!(session.state().tags().is_empty());
    }

    #[test]
    fn remove_tag_removes_first_match_only() {
        let mut session = start();
        session.toggle_input_mode();
        session.add_text_tag("bird");
        session.add_text_tag("car");
        session.add_text_tag("bird");
        assert!(session.remove_text_tag("bird"));
        assert_eq!(session.state().tags(), &["car", "bird"]);
        assert!(!session.remove_text_tag("plane"));
        assert_eq!(session.state().tags().len(), 2);
    }

    #[test]
    fn remove_tag_matches_the_trimmed_text() {
        let mut session = start();
        session.toggle_input_mode();
        assert!(session.add_text_tag(" desk "));
        assert_eq!(session.state().tags(), &["desk"]);
        assert!(session.remove_text_tag(" desk "));
        assert!(session.state().tags().is_empty());
    }

    #[test]
    fn clear_step_evidence_keeps_step_and_mode() {
        let mut session = start();
        goto(&mut session, Step::Touch);
        session.toggle_input_mode();
        session.add_text_tag("desk");
        session.clear_step_evidence();
        assert_eq!(session.current_step(), Step::Touch);
        assert_eq!(session.state().input_mode(), InputMode::Text);
        assert!(session.state().tags().is_empty());
    }

    #[test]
    fn advance_preserves_mode_and_clears_evidence() {
        let mut session = start();
        session.toggle_input_mode();
        session.advance();
        session.add_text_tag("window");
        assert_eq!(session.advance(), Advance::Moved(Step::Touch));
        assert_eq!(session.state().input_mode(), InputMode::Text);
        assert!(session.state().tags().is_empty());
    }

    #[test]
    fn video_follows_recording_and_step() {
        let mut avatar = Avatar::new("grandma", "Ryo");
        avatar.video_set_human = Some(vec![
            "https://cdn.example/0.mp4".to_string(),
            "https://cdn.example/1.mp4".to_string(),
        ]);
        avatar.idle_video_url = Some("https://cdn.example/idle.mp4".to_string());
        let mut session = SessionController::start(Some(avatar), &VideoDefaults::default());

        assert_eq!(session.current_video(), "https://cdn.example/0.mp4");
        session.advance();
        assert_eq!(session.current_video(), "https://cdn.example/1.mp4");
        session.begin_recording();
        assert_eq!(session.current_video(), "https://cdn.example/idle.mp4");
        session.end_recording();
        assert_eq!(session.current_video(), "https://cdn.example/1.mp4");

        goto(&mut session, Step::Taste);
        assert_eq!(session.current_video(), "https://cdn.example/1.mp4");
    }

    #[test]
    fn japanese_avatar_gets_japanese_prompts() {
        let mut avatar = Avatar::new("obaachan", "Ryo");
        avatar.language = Language::Japanese;
        avatar.theme = Theme::Ghibli;
        let session = SessionController::start(Some(avatar), &VideoDefaults::default());
        assert_eq!(
            session.prompt(),
            prompts::prompt(Step::Intro, &Language::Japanese)
        );
    }

    #[test]
    fn report_records_each_step() {
        let mut session = start();
        assert!(session.report().is_none());

        session.advance();
        session.toggle_input_mode();
        session.add_text_tag("clock");
        session.advance();
        goto(&mut session, Step::Taste);
        answer(&mut session);
        assert_eq!(session.advance(), Advance::Completed);

        let report = session.report().unwrap();
        assert_eq!(report.avatar, "default");
        assert_eq!(report.steps.len(), Step::COUNT);
        assert_eq!(report.steps[1].step, Step::See);
        assert_eq!(report.steps[1].tags, vec!["clock"]);
        assert!(report.steps[6].recorded);
        assert!(report.completed_at >= report.started_at);
    }

    #[test]
    fn completed_session_ignores_further_input() {
        let mut session = start();
        goto(&mut session, Step::Taste);
        answer(&mut session);
        session.advance();

        assert!(!session.begin_recording());
        assert!(!session.end_recording());
        assert!(!session.add_text_tag("late"));
        assert!(!session.remove_text_tag("late"));
        assert!(!session.can_advance());
        assert_eq!(session.toggle_input_mode(), InputMode::Voice);
    }
}
