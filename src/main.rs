mod common;
mod subtitles;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::common::Platform;
use crate::subtitles::{CommandContext, Outcome, SubtitleCommands, SubtitleConfig};
use crate::ui::prelude::{Level, OutputFormat, emit};

/// Subburn: write ASS subtitles from speech or narration timing and burn them into video
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for status events
    #[arg(long = "output-format", value_enum, default_value = "text", global = true)]
    output_format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Use an alternate config file instead of ~/.config/subburn/subburn.toml
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubtitleCommands,
}

fn run(cli: Cli) -> Result<Outcome> {
    let config_path = match cli.config {
        Some(path) => path,
        None => SubtitleConfig::default_path()?,
    };
    let config = SubtitleConfig::load_from_path(&config_path)?;
    emit(
        Level::Debug,
        "subburn.config",
        &format!("Loaded config: {:?}", config),
        None,
    );

    let ctx = CommandContext {
        config,
        platform: Platform::current(),
    };
    let outcome = subtitles::handle_subtitle_command(cli.command, &ctx)?;

    // Inputs were valid; only now leave a default config behind for editing
    match SubtitleConfig::save_default_if_missing(&config_path) {
        Ok(true) => emit(
            Level::Debug,
            "subburn.config.created",
            &format!("Wrote default config to {}", config_path.display()),
            None,
        ),
        Ok(false) => {}
        Err(e) => emit(
            Level::Warn,
            "subburn.config.save_failed",
            &format!("Could not write default config: {:#}", e),
            None,
        ),
    }

    Ok(outcome)
}

fn main() {
    let cli = Cli::parse();

    let color = !cli.no_color && cli.output_format == OutputFormat::Text;
    ui::init(cli.output_format, color);
    ui::set_debug_mode(cli.debug);

    match run(cli) {
        Ok(Outcome::Written { ass_path, video }) => {
            emit(
                Level::Debug,
                "subburn.done",
                &format!(
                    "Subtitles: {}, video: {}",
                    ass_path.display(),
                    video
                        .as_deref()
                        .map(|v| v.display().to_string())
                        .unwrap_or_else(|| "not burned".to_string())
                ),
                None,
            );
        }
        Ok(Outcome::NothingToRender) => {
            emit(
                Level::Info,
                "subburn.nothing_to_render",
                "Nothing to render",
                None,
            );
        }
        Err(e) => {
            emit(Level::Error, "subburn.error", &format!("Error: {:#}", e), None);
            std::process::exit(1);
        }
    }
}
