use crate::error::{RemindError, Result};
use crate::{io, paths};
use crate::video::VideoDefaults;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Avatar used when a session is started without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_avatar: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub videos: VideoDefaults,
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            videos: VideoDefaults::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RemindError::NotInitialized);
        }
        io::read_yaml(&path)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::write_yaml(&paths::config_path(root), self)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (key, url) in [
            ("videos.default_narration", &self.videos.default_narration),
            ("videos.default_idle", &self.videos.default_idle),
        ] {
            let url = url.trim();
            if url.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{key} is empty; the built-in clip will be used"),
                });
            } else if !(url.starts_with("https://") || url.starts_with("http://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{key} is not an http(s) URL: '{url}'"),
                });
            }
        }

        if let Some(id) = &self.session.default_avatar {
            if paths::validate_avatar_id(id).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("session.default_avatar '{id}' is not a valid avatar id"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
