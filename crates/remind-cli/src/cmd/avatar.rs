use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use remind_core::{
    avatar::{Avatar, AvatarRepository, FileAvatarRepository},
    config::Config,
    video::{self, resolve_video_set},
    RemindError,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum AvatarSubcommand {
    /// List stored avatars
    List,

    /// Show one avatar and the videos a session would use
    Show { id: String },

    /// Delete a stored avatar
    Remove { id: String },

    /// Make an avatar the one sessions start with
    SetDefault { id: String },
}

pub fn run(root: &Path, subcmd: AvatarSubcommand, json: bool) -> anyhow::Result<()> {
    let repo = FileAvatarRepository::new(root);
    match subcmd {
        AvatarSubcommand::List => list(&repo, json),
        AvatarSubcommand::Show { id } => show(root, &repo, &id, json),
        AvatarSubcommand::Remove { id } => remove(root, &repo, &id, json),
        AvatarSubcommand::SetDefault { id } => set_default(root, &repo, &id, json),
    }
}

fn list(repo: &FileAvatarRepository, json: bool) -> anyhow::Result<()> {
    let avatars = repo.list_avatars().context("failed to list avatars")?;

    if json {
        return print_json(&avatars);
    }

    if avatars.is_empty() {
        println!("No avatars yet. Add one under .remind/avatars/ or run: remind init");
        return Ok(());
    }

    let rows = avatars
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.name.clone(),
                a.recipient_name.clone().unwrap_or_else(|| "-".to_string()),
                a.language.to_string(),
                a.theme.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "RECIPIENT", "LANGUAGE", "THEME"], rows);
    Ok(())
}

fn show(root: &Path, repo: &FileAvatarRepository, id: &str, json: bool) -> anyhow::Result<()> {
    let avatar: Avatar = repo
        .get_avatar(id)
        .with_context(|| format!("failed to load avatar '{id}'"))?
        .ok_or_else(|| RemindError::AvatarNotFound(id.to_string()))?;
    let defaults = Config::load(root).unwrap_or_default().videos;
    let videos = resolve_video_set(&avatar, &defaults);

    if json {
        let value = serde_json::json!({
            "avatar": avatar,
            "videos": videos,
            "idle_video": video::idle_video(&avatar, &defaults),
        });
        return print_json(&value);
    }

    println!("Avatar:    {}", avatar.id);
    println!("Name:      {}", avatar.name);
    if let Some(ref recipient) = avatar.recipient_name {
        println!("Recipient: {recipient}");
    }
    println!("Language:  {}", avatar.language);
    println!("Theme:     {}", avatar.theme);
    println!("\nVideos ({}):", videos.source());
    for (i, url) in videos.urls().iter().enumerate() {
        println!("  {}. {url}", i + 1);
    }
    println!("Idle: {}", video::idle_video(&avatar, &defaults));
    Ok(())
}

/// Deleting the default avatar also unsets `session.default_avatar`, so the
/// next session starts on the built-in avatar without a warning.
fn remove(root: &Path, repo: &FileAvatarRepository, id: &str, json: bool) -> anyhow::Result<()> {
    repo.delete(id)
        .with_context(|| format!("failed to remove avatar '{id}'"))?;

    let mut default_cleared = false;
    match Config::load(root) {
        Ok(mut config) if config.session.default_avatar.as_deref() == Some(id) => {
            config.session.default_avatar = None;
            config.save(root).context("failed to update config.yaml")?;
            default_cleared = true;
        }
        Ok(_) | Err(RemindError::NotInitialized) => {}
        Err(e) => return Err(e).context("failed to load config"),
    }

    if json {
        return print_json(&serde_json::json!({
            "removed": id,
            "default_cleared": default_cleared,
        }));
    }
    println!("removed avatar '{id}'");
    if default_cleared {
        println!("'{id}' was the default avatar; sessions will use the built-in one");
    }
    Ok(())
}

fn set_default(root: &Path, repo: &FileAvatarRepository, id: &str, json: bool) -> anyhow::Result<()> {
    repo.get_avatar(id)
        .with_context(|| format!("failed to load avatar '{id}'"))?
        .ok_or_else(|| RemindError::AvatarNotFound(id.to_string()))?;

    let mut config = match Config::load(root) {
        Ok(config) => config,
        Err(RemindError::NotInitialized) => Config::default(),
        Err(e) => return Err(e).context("failed to load config"),
    };
    config.session.default_avatar = Some(id.to_string());
    config.save(root).context("failed to write config.yaml")?;

    if json {
        return print_json(&serde_json::json!({ "default_avatar": id }));
    }
    println!("default avatar: {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, FileAvatarRepository) {
        let dir = TempDir::new().unwrap();
        let repo = FileAvatarRepository::new(dir.path());
        std::fs::create_dir_all(dir.path().join(".remind/avatars")).unwrap();
        repo.save(&Avatar::new("grandma", "Ryo")).unwrap();
        repo.save(&Avatar::new("nana", "Kim")).unwrap();
        (dir, repo)
    }

    #[test]
    fn set_default_writes_config() {
        let (dir, repo) = project();
        set_default(dir.path(), &repo, "nana", true).unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.session.default_avatar.as_deref(), Some("nana"));
    }

    #[test]
    fn set_default_rejects_unknown_avatar() {
        let (dir, repo) = project();
        let err = set_default(dir.path(), &repo, "nobody", true).unwrap_err();
        assert!(format!("{err:#}").contains("avatar not found: nobody"));
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn removing_default_avatar_clears_it() {
        let (dir, repo) = project();
        set_default(dir.path(), &repo, "grandma", true).unwrap();
        remove(dir.path(), &repo, "grandma", true).unwrap();

        assert!(repo.get_avatar("grandma").unwrap().is_none());
        let config = Config::load(dir.path()).unwrap();
        assert!(config.session.default_avatar.is_none());
    }

    #[test]
    fn removing_other_avatar_keeps_default() {
        let (dir, repo) = project();
        set_default(dir.path(), &repo, "grandma", true).unwrap();
        remove(dir.path(), &repo, "nana", true).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.session.default_avatar.as_deref(), Some("grandma"));
    }
}
