use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use remind_core::{
    avatar::{AvatarRepository, FileAvatarRepository},
    config::{Config, ConfigWarning, WarnLevel},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => show(&config, json),
        ConfigSubcommand::Validate => validate(root, &config, json),
    }
}

fn show(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

fn validate(root: &Path, config: &Config, json: bool) -> anyhow::Result<()> {
    let mut warnings = config.validate();

    if let Some(id) = &config.session.default_avatar {
        let repo = FileAvatarRepository::new(root);
        if matches!(repo.get_avatar(id), Ok(None)) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "session.default_avatar '{id}' does not exist; sessions will use the built-in avatar"
                ),
            });
        }
    }

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config has errors");
    }
    Ok(())
}
