mod cmd;
mod output;
mod root;
mod terminal;

use clap::{Parser, Subcommand};
use cmd::{avatar::AvatarSubcommand, config::ConfigSubcommand, session::SessionSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "remind",
    about = "Guided 5-4-3-2-1 grounding sessions narrated by a loved one's avatar",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .remind/ or .git/)
    #[arg(long, global = true, env = "REMIND_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .remind/ with a default config and a sample avatar
    Init,

    /// Inspect stored avatars
    Avatar {
        #[command(subcommand)]
        subcommand: AvatarSubcommand,
    },

    /// Preview or run a grounding session
    Session {
        #[command(subcommand)]
        subcommand: SessionSubcommand,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Avatar { subcommand } => cmd::avatar::run(&root, subcommand, cli.json),
        Commands::Session { subcommand } => cmd::session::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
