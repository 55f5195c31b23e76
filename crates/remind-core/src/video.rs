//! Narration video selection.
//!
//! Every lookup here is total: a missing or empty list at any tier only moves
//! the lookup further down the fallback chain, ending at a hard-coded clip.

use crate::avatar::Avatar;
use crate::types::{Step, Theme};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_NARRATION_URL: &str =
    "https://res.cloudinary.com/dvyjkf3xq/video/upload/v1749294446/Grandma_part_1_ouhhqp.mp4";
pub const DEFAULT_IDLE_URL: &str =
    "https://res.cloudinary.com/dvyjkf3xq/video/upload/v1749294445/Grandma_Idle_ixptkp.mp4";

// ---------------------------------------------------------------------------
// VideoDefaults
// ---------------------------------------------------------------------------

/// Last-resort clips, configurable per project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDefaults {
    #[serde(default = "default_narration")]
    pub default_narration: String,
    #[serde(default = "default_idle")]
    pub default_idle: String,
}

fn default_narration() -> String {
    DEFAULT_NARRATION_URL.to_string()
}

fn default_idle() -> String {
    DEFAULT_IDLE_URL.to_string()
}

impl Default for VideoDefaults {
    fn default() -> Self {
        Self {
            default_narration: default_narration(),
            default_idle: default_idle(),
        }
    }
}

impl VideoDefaults {
    fn narration(&self) -> &str {
        non_blank(&self.default_narration).unwrap_or(DEFAULT_NARRATION_URL)
    }

    fn idle(&self) -> &str {
        non_blank(&self.default_idle).unwrap_or(DEFAULT_IDLE_URL)
    }
}

// ---------------------------------------------------------------------------
// VideoSource / VideoSet
// ---------------------------------------------------------------------------

/// Which tier of the fallback chain a [`VideoSet`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSource {
    GhibliJapanese,
    Ghibli,
    Human,
    Default,
}

impl VideoSource {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoSource::GhibliJapanese => "ghibli_japanese",
            VideoSource::Ghibli => "ghibli",
            VideoSource::Human => "human",
            VideoSource::Default => "default",
        }
    }

    fn list(self, avatar: &Avatar) -> Option<&Vec<String>> {
        match self {
            VideoSource::GhibliJapanese => avatar.video_set_ghibli_japanese.as_ref(),
            VideoSource::Ghibli => avatar.video_set_ghibli.as_ref(),
            VideoSource::Human => avatar.video_set_human.as_ref(),
            VideoSource::Default => None,
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The narration clips for one session. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSet {
    source: VideoSource,
    urls: Vec<String>,
}

impl VideoSet {
    pub fn source(&self) -> VideoSource {
        self.source
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Narration clip for a step. Lists shorter than the session reuse their
    /// last clip for the remaining steps.
    pub fn narration(&self, step: Step) -> &str {
        let index = step.index().min(self.urls.len() - 1);
        &self.urls[index]
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn usable_urls(list: Option<&Vec<String>>) -> Option<Vec<String>> {
    let urls: Vec<String> = list?
        .iter()
        .filter(|u| non_blank(u).is_some())
        .cloned()
        .collect();
    if urls.is_empty() {
        None
    } else {
        Some(urls)
    }
}

fn fallback_chain(avatar: &Avatar) -> &'static [VideoSource] {
    match &avatar.theme {
        Theme::Ghibli if avatar.language.is_japanese() => &[
            VideoSource::GhibliJapanese,
            VideoSource::Ghibli,
            VideoSource::Human,
        ],
        Theme::Ghibli => &[VideoSource::Ghibli, VideoSource::Human],
        Theme::Human => &[VideoSource::Human],
        Theme::Unknown(raw) => {
            tracing::warn!(
                avatar = %avatar.id,
                theme = %raw,
                "unknown avatar theme, using human videos"
            );
            &[VideoSource::Human]
        }
    }
}

/// Pick the narration list for an avatar: theme (and, for ghibli, language)
/// first, then the generic tiers, then the configured default clip.
pub fn resolve_video_set(avatar: &Avatar, defaults: &VideoDefaults) -> VideoSet {
    for source in fallback_chain(avatar) {
        if let Some(urls) = usable_urls(source.list(avatar)) {
            return VideoSet {
                source: *source,
                urls,
            };
        }
        tracing::debug!(avatar = %avatar.id, tier = %source, "video tier empty, falling back");
    }
    VideoSet {
        source: VideoSource::Default,
        urls: vec![defaults.narration().to_string()],
    }
}

/// Clip shown while a recording is in progress.
pub fn idle_video<'a>(avatar: &'a Avatar, defaults: &'a VideoDefaults) -> &'a str {
    avatar
        .idle_video_url
        .as_deref()
        .and_then(non_blank)
        .unwrap_or_else(|| defaults.idle())
}

/// The clip to show for a step, recording or not.
pub fn select_video(
    avatar: &Avatar,
    defaults: &VideoDefaults,
    step: Step,
    is_recording: bool,
) -> String {
    if is_recording {
        idle_video(avatar, defaults).to_string()
    } else {
        resolve_video_set(avatar, defaults)
            .narration(step)
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
