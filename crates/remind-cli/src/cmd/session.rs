use crate::output::{print_json, print_table, progress_bar};
use crate::terminal::{BreakScreen, TerminalPlayer, TerminalRecorder};
use anyhow::Context;
use clap::Subcommand;
use remind_core::{
    avatar::{Avatar, AvatarRepository, FileAvatarRepository},
    config::Config,
    media::{PlaybackStatus, SessionHost},
    prompts,
    session::{Advance, SessionController, SessionReport, StepInput},
    types::Step,
    video, RemindError,
};
use std::io::BufRead;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Show every step with its prompt, progress and narration video
    Plan {
        /// Avatar id (default: session.default_avatar from config)
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Walk through a session, one command per line on stdin
    Run {
        /// Avatar id (default: session.default_avatar from config)
        #[arg(long)]
        avatar: Option<String>,

        /// Behave as if microphone access was refused
        #[arg(long)]
        deny_mic: bool,
    },
}

type TerminalHost = SessionHost<TerminalRecorder, TerminalPlayer, BreakScreen>;

const HELP: &str = "\
commands:
  record        start a voice answer
  stop          finish the voice answer
  mode          switch between voice and typed answers
  tag <text>    add a typed answer (max 5)
  untag <text>  remove a typed answer
  clear         discard this step's answers
  next          continue to the next step
  status        show the current step again
  quit          leave the session";

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: SessionSubcommand, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    match subcmd {
        SessionSubcommand::Plan { avatar } => {
            let avatar = load_avatar(root, &config, avatar.as_deref())?;
            plan(avatar, &config, json)
        }
        SessionSubcommand::Run { avatar, deny_mic } => {
            let avatar = load_avatar(root, &config, avatar.as_deref())?;
            let stdin = std::io::stdin();
            drive(avatar, &config, deny_mic, stdin.lock(), json)?;
            Ok(())
        }
    }
}

/// Sessions run without `remind init`; the built-in defaults apply.
fn load_config(root: &Path) -> anyhow::Result<Config> {
    match Config::load(root) {
        Ok(config) => Ok(config),
        Err(RemindError::NotInitialized) => Ok(Config::default()),
        Err(e) => Err(e).context("failed to load config"),
    }
}

/// Look up the requested avatar. An avatar that cannot be found is not an
/// error: the session falls back to the built-in one.
fn load_avatar(root: &Path, config: &Config, id: Option<&str>) -> anyhow::Result<Option<Avatar>> {
    let Some(id) = id.or(config.session.default_avatar.as_deref()) else {
        return Ok(None);
    };
    let repo = FileAvatarRepository::new(root);
    match repo.get_avatar(id) {
        Ok(Some(avatar)) => Ok(Some(avatar)),
        Ok(None) | Err(RemindError::NotInitialized) => {
            tracing::warn!(avatar = %id, "avatar not found");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("failed to load avatar '{id}'")),
    }
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

fn plan(avatar: Option<Avatar>, config: &Config, json: bool) -> anyhow::Result<()> {
    let session = SessionController::start(avatar, &config.videos);
    let avatar = session.avatar();
    let videos = session.video_set();
    let idle = video::idle_video(avatar, &config.videos);

    if json {
        #[derive(serde::Serialize)]
        struct PlannedStep<'a> {
            index: usize,
            step: Step,
            progress: f32,
            requires_answer: bool,
            prompt: &'static str,
            video: &'a str,
        }

        #[derive(serde::Serialize)]
        struct Plan<'a> {
            avatar: &'a str,
            language: &'a str,
            video_source: String,
            idle_video: &'a str,
            steps: Vec<PlannedStep<'a>>,
        }

        let output = Plan {
            avatar: &avatar.id,
            language: avatar.language.as_str(),
            video_source: videos.source().to_string(),
            idle_video: idle,
            steps: Step::all()
                .iter()
                .map(|&step| PlannedStep {
                    index: step.index(),
                    step,
                    progress: step.progress(),
                    requires_answer: step.requires_evidence(),
                    prompt: prompts::prompt(step, &avatar.language),
                    video: videos.narration(step),
                })
                .collect(),
        };
        return print_json(&output);
    }

    println!(
        "Avatar: {} ({}, {} videos)",
        avatar.id,
        avatar.language,
        videos.source()
    );
    let rows = Step::all()
        .iter()
        .map(|&step| {
            vec![
                format!("{}", step.index() + 1),
                step.to_string(),
                progress_bar(step.progress()),
                prompts::prompt(step, &avatar.language).to_string(),
                videos.narration(step).to_string(),
            ]
        })
        .collect();
    print_table(&["#", "STEP", "PROGRESS", "PROMPT", "VIDEO"], rows);
    println!("\nWhile recording: {idle}");
    Ok(())
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Run a session over line commands. Returns the report if the last step
/// was answered, `None` if the input ended first.
fn drive(
    avatar: Option<Avatar>,
    config: &Config,
    deny_mic: bool,
    input: impl BufRead,
    json: bool,
) -> anyhow::Result<Option<SessionReport>> {
    let controller = SessionController::start(avatar, &config.videos);
    let mut host: TerminalHost = SessionHost::new(
        controller,
        TerminalRecorder::new(deny_mic),
        TerminalPlayer::default(),
        BreakScreen::new(json),
    );
    let say = |msg: &str| {
        if !json {
            println!("  ! {msg}");
        }
    };

    if !json {
        println!("Type 'help' for commands.");
        print_status(&host);
    }

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        match command {
            "" => continue,
            "help" => {
                if !json {
                    println!("{HELP}");
                }
                continue;
            }
            "status" => {}
            "quit" | "exit" => break,
            "mode" => {
                host.toggle_input_mode();
            }
            "record" => match host.begin_recording() {
                Ok(true) => {}
                Ok(false) => say("recording is only available in voice mode"),
                Err(e) => say(&e.to_string()),
            },
            "stop" => match host.end_recording() {
                Ok(true) => {}
                Ok(false) => say("not recording"),
                Err(e) => say(&e.to_string()),
            },
            "tag" => {
                if !host.add_text_tag(arg) {
                    say("typed answers need text mode, some text, and fewer than 5 answers");
                }
            }
            "untag" => {
                if !host.remove_text_tag(arg) {
                    say(&format!("no answer '{arg}'"));
                }
            }
            "clear" => host.clear_step_evidence(),
            "next" => match host.advance() {
                Advance::Completed => break,
                Advance::Moved(_) => {}
                Advance::Ignored => say("answer the prompt before moving on"),
            },
            other => say(&format!("unknown command '{other}' (try 'help')")),
        }

        if !json {
            print_status(&host);
        }
    }

    let report = host.controller().report();
    if json {
        let value = match &report {
            Some(report) => serde_json::json!({ "completed": true, "report": report }),
            None => serde_json::json!({
                "completed": false,
                "state": host.controller().state(),
                "progress": host.controller().progress(),
            }),
        };
        print_json(&value)?;
    } else if report.is_none() {
        println!(
            "\nSession ended at step {} of {}.",
            host.controller().current_step().index() + 1,
            Step::COUNT
        );
    }

    host.release();
    Ok(report)
}

fn print_status(host: &TerminalHost) {
    let session = host.controller();
    if session.is_complete() {
        return;
    }
    let state = session.state();
    println!();
    println!(
        "[{}/{}] {}  {}",
        state.current_step_index() + 1,
        Step::COUNT,
        progress_bar(session.progress()),
        state.step
    );
    println!("  {}", session.prompt());

    let answer = match &state.input {
        StepInput::Voice {
            is_recording: true, ..
        } => "recording...".to_string(),
        StepInput::Voice {
            has_recording: true,
            ..
        } => "recorded".to_string(),
        StepInput::Voice { .. } => "none".to_string(),
        StepInput::Text { tags } if tags.is_empty() => "none".to_string(),
        StepInput::Text { tags } => tags.join(", "),
    };
    println!("  mode: {}  answer: {answer}", state.input_mode());

    let video = host.player().current().unwrap_or("-");
    let status = match host.playback() {
        PlaybackStatus::Failed(reason) => format!("failed: {reason}"),
        _ if host.player().is_playing() => "playing".to_string(),
        _ => "paused".to_string(),
    };
    println!("  video: {video} ({status})");
}

#[cfg(test)]
mod tests {
    use super::*;
    use remind_core::types::InputMode;
    use std::io::Cursor;

    fn run_script(script: &str, deny_mic: bool) -> Option<SessionReport> {
        drive(None, &Config::default(), deny_mic, Cursor::new(script.to_string()), true).unwrap()
    }

    #[test]
    fn scripted_session_produces_report() {
        let script = "next\nrecord\nstop\nnext\nmode\ntag desk\nnext\nnext\ntag bird\nnext\ntag coffee\nnext\ntag mint\nnext\n";
        let report = run_script(script, false).expect("session should complete");

        assert_eq!(report.avatar, "default");
        assert_eq!(report.steps.len(), Step::COUNT);
        assert!(report.steps[1].recorded);
        assert_eq!(report.steps[2].mode, InputMode::Text);
        assert_eq!(report.steps[2].tags, vec!["desk"]);
        assert_eq!(report.steps[6].tags, vec!["mint"]);
    }

    #[test]
    fn input_ending_early_yields_no_report() {
        assert!(run_script("record\nnext\n", true).is_none());
    }

    #[test]
    fn commands_after_quit_are_not_run() {
        assert!(run_script("next\nrecord\nstop\nquit\nnext\n", false).is_none());
    }

    #[test]
    fn denied_microphone_cannot_answer_by_voice() {
        let script = "next\nrecord\nstop\nnext\nnext\nnext\nnext\nnext\nnext\n";
        assert!(run_script(script, true).is_none());
    }
}
