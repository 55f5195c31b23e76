use crate::error::{RemindError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const REMIND_DIR: &str = ".remind";
pub const AVATARS_DIR: &str = ".remind/avatars";
pub const CONFIG_FILE: &str = ".remind/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn remind_dir(root: &Path) -> PathBuf {
    root.join(REMIND_DIR)
}

pub fn avatars_dir(root: &Path) -> PathBuf {
    root.join(AVATARS_DIR)
}

pub fn avatar_path(root: &Path, id: &str) -> PathBuf {
    avatars_dir(root).join(format!("{id}.yaml"))
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Avatar id validation
// ---------------------------------------------------------------------------

static AVATAR_ID_RE: OnceLock<Regex> = OnceLock::new();

fn avatar_id_re() -> &'static Regex {
    AVATAR_ID_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9_\-]*[a-z0-9]$|^[a-z0-9]$").expect("static regex")
    })
}

/// Avatar ids double as file names, so they are restricted to a safe
/// alphabet. Ids like `avatar_1749297509_8523` are valid.
pub fn validate_avatar_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !avatar_id_re().is_match(id) {
        return Err(RemindError::InvalidAvatarId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
