use anyhow::Context;
use remind_core::{
    avatar::{Avatar, FileAvatarRepository},
    config::Config,
    paths,
    types::{Language, Theme},
    video::{DEFAULT_IDLE_URL, DEFAULT_NARRATION_URL},
};
use std::path::Path;

/// Id of the avatar written by `remind init`.
pub const SAMPLE_AVATAR_ID: &str = "grandma";

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing reMind in: {}", root.display());

    for dir in [paths::REMIND_DIR, paths::AVATARS_DIR] {
        let p = root.join(dir);
        std::fs::create_dir_all(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let mut cfg = Config::default();
        cfg.session.default_avatar = Some(SAMPLE_AVATAR_ID.to_string());
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let avatar_path = paths::avatar_path(root, SAMPLE_AVATAR_ID);
    let display = format!("{}/{SAMPLE_AVATAR_ID}.yaml", paths::AVATARS_DIR);
    if !avatar_path.exists() {
        FileAvatarRepository::new(root)
            .save(&sample_avatar())
            .context("failed to write sample avatar")?;
        println!("  created: {display}");
    } else {
        println!("  exists:  {display}");
    }

    println!("\nNext: remind session run");
    Ok(())
}

fn sample_avatar() -> Avatar {
    let mut avatar = Avatar::new(SAMPLE_AVATAR_ID, "Grandma");
    avatar.language = Language::English;
    avatar.theme = Theme::Human;
    avatar.video_set_human = Some(vec![DEFAULT_NARRATION_URL.to_string()]);
    avatar.idle_video_url = Some(DEFAULT_IDLE_URL.to_string());
    avatar
}
