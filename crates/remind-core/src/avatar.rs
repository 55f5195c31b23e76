use crate::error::{RemindError, Result};
use crate::{io, paths};
use crate::types::{Language, Theme};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Id of the built-in avatar used when no avatar is supplied.
pub const FALLBACK_AVATAR_ID: &str = "default";

// ---------------------------------------------------------------------------
// Avatar
// ---------------------------------------------------------------------------

/// A recorded loved one, as stored by the avatar repository. Sessions only
/// ever read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: String,
    /// Name of the person who created the avatar.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_set_human: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_set_ghibli: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_set_ghibli_japanese: Option<Vec<String>>,
    /// Shown while the recipient is recording an answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_video_url: Option<String>,
    /// Set only on [`Avatar::fallback`]; stored avatars never carry it.
    #[serde(skip)]
    builtin: bool,
}

impl Avatar {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            recipient_name: None,
            language: Language::English,
            theme: Theme::Human,
            video_set_human: None,
            video_set_ghibli: None,
            video_set_ghibli_japanese: None,
            idle_video_url: None,
            builtin: false,
        }
    }

    /// The hard-coded avatar a session falls back to. It carries no videos of
    /// its own, so video selection lands on the configured defaults.
    pub fn fallback() -> Self {
        Self {
            builtin: true,
            ..Avatar::new(FALLBACK_AVATAR_ID, "reMind")
        }
    }

    /// True for the built-in avatar, even when a stored avatar shares its id.
    pub fn is_fallback(&self) -> bool {
        self.builtin
    }
}

// ---------------------------------------------------------------------------
// AvatarRepository
// ---------------------------------------------------------------------------

/// Read access to stored avatars.
pub trait AvatarRepository {
    /// `Ok(None)` when no avatar has this id.
    fn get_avatar(&self, id: &str) -> Result<Option<Avatar>>;

    fn list_avatars(&self) -> Result<Vec<Avatar>>;
}

/// One YAML file per avatar under `.remind/avatars/`.
#[derive(Debug, Clone)]
pub struct FileAvatarRepository {
    root: PathBuf,
}

impl FileAvatarRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn save(&self, avatar: &Avatar) -> Result<()> {
        paths::validate_avatar_id(&avatar.id)?;
        io::write_yaml(&paths::avatar_path(&self.root, &avatar.id), avatar)
    }

    /// Remove a stored avatar. Errors with `AvatarNotFound` if there is none.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.ensure_initialized()?;
        paths::validate_avatar_id(id)?;
        let path = paths::avatar_path(&self.root, id);
        if !path.exists() {
            return Err(RemindError::AvatarNotFound(id.to_string()));
        }
        std::fs::remove_file(&path)?;
        tracing::debug!(avatar = %id, "avatar deleted");
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !paths::remind_dir(&self.root).is_dir() {
            return Err(RemindError::NotInitialized);
        }
        Ok(())
    }
}

impl AvatarRepository for FileAvatarRepository {
    fn get_avatar(&self, id: &str) -> Result<Option<Avatar>> {
        self.ensure_initialized()?;
        paths::validate_avatar_id(id)?;
        let path = paths::avatar_path(&self.root, id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(io::read_yaml(&path)?))
    }

    fn list_avatars(&self) -> Result<Vec<Avatar>> {
        self.ensure_initialized()?;
        let dir = paths::avatars_dir(&self.root);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut avatars = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            match io::read_yaml::<Avatar>(&path) {
                Ok(avatar) => avatars.push(avatar),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable avatar");
                }
            }
        }
        avatars.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(avatars)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
