use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::common::Platform;
use crate::common::progress::create_spinner;
use crate::ui::prelude::{Level, emit};

use super::ass::write_ass_file;
use super::burn::{
    BurnCommand, FfmpegRunOptions, FfmpegRunner, SystemFfmpegRunner, burn_subtitles,
    probe_duration_seconds,
};
use super::cli::{AsrArgs, BurnArgs, FfmpegArgs, ManifestArgs, OutputArgs, SubtitleCommands};
use super::config::SubtitleConfig;
use super::error::SubtitleError;
use super::manifest::{load_manifest, reconstruct, total_duration};
use super::recognize::{RecognitionParams, Recognizer, select_recognizer, transcribe};
use super::segment::{Segment, count_overlaps};

/// Loaded once at startup and shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: SubtitleConfig,
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Subtitle document written; `video` is set when it was also burned in.
    Written {
        ass_path: PathBuf,
        video: Option<PathBuf>,
    },
    /// No speech or no captioned clips: nothing was written.
    NothingToRender,
}

pub fn handle_subtitle_command(command: SubtitleCommands, ctx: &CommandContext) -> Result<Outcome> {
    let runner = SystemFfmpegRunner::new(&ctx.config.burn.ffmpeg_bin);
    match command {
        SubtitleCommands::Asr(args) => {
            // Fail on a missing input before probing for a recognizer
            SubtitleError::ensure_exists("Video", &args.video)?;
            let backend = args.backend.unwrap_or(ctx.config.recognition.backend);
            let recognizer = select_recognizer(backend)?;
            handle_asr(args, ctx, recognizer.as_ref(), &runner)
        }
        SubtitleCommands::Manifest(args) => handle_manifest(args, ctx, &runner),
        SubtitleCommands::Burn(args) => handle_burn(args, ctx, &runner),
    }
}

pub fn handle_asr(
    args: AsrArgs,
    ctx: &CommandContext,
    recognizer: &dyn Recognizer,
    runner: &dyn FfmpegRunner,
) -> Result<Outcome> {
    let params = recognition_params(&args, ctx);

    emit(
        Level::Info,
        "subtitles.asr.start",
        &format!(
            "Transcribing {} with {} (model {})...",
            args.video.display(),
            recognizer.name(),
            params.model.as_str()
        ),
        None,
    );

    let spinner = create_spinner(format!("Running {}", recognizer.name()));
    let result = transcribe(recognizer, &args.video, &params);
    spinner.finish_and_clear();
    let recognition = result?;

    if recognition.segments.is_empty() {
        emit(
            Level::Warn,
            "subtitles.asr.no_speech",
            "No speech detected. Check the audio track and language.",
            None,
        );
        return Ok(Outcome::NothingToRender);
    }

    emit(
        Level::Info,
        "subtitles.asr.segments",
        &format!(
            "Got {} segments, language: {}",
            recognition.segments.len(),
            recognition.language.as_deref().unwrap_or("N/A")
        ),
        Some(serde_json::json!({
            "segments": recognition.segments.len(),
            "language": recognition.language,
        })),
    );

    let timed_words: usize = recognition.segments.iter().map(|s| s.words.len()).sum();
    if timed_words > 0 {
        emit(
            Level::Debug,
            "subtitles.asr.words",
            &format!("{} words carry their own timing", timed_words),
            None,
        );
    }

    write_and_burn(&recognition.segments, &args.video, &args.output, ctx, runner)
}

fn recognition_params(args: &AsrArgs, ctx: &CommandContext) -> RecognitionParams {
    let mut params = ctx.config.recognition.params();
    if let Some(model) = args.model {
        params.model = model;
    }
    if let Some(device) = args.device {
        params.device = device;
    }
    if let Some(compute_type) = &args.compute_type {
        params.compute_type = compute_type.clone();
    }
    if let Some(language) = &args.language {
        params.language = Some(language.clone());
    }
    params.word_timestamps |= args.word_timestamps;
    params
}

pub fn handle_manifest(
    args: ManifestArgs,
    ctx: &CommandContext,
    runner: &dyn FfmpegRunner,
) -> Result<Outcome> {
    SubtitleError::ensure_exists("Video", &args.video)?;

    emit(
        Level::Info,
        "subtitles.manifest.start",
        &format!("Building subtitle timeline from {}...", args.manifest.display()),
        None,
    );

    let entries = load_manifest(&args.manifest)?;
    let segments = reconstruct(&entries);

    if segments.is_empty() {
        emit(
            Level::Warn,
            "subtitles.manifest.empty",
            "No subtitle segments found; check that the manifest entries have text.",
            None,
        );
        return Ok(Outcome::NothingToRender);
    }

    emit(
        Level::Info,
        "subtitles.manifest.segments",
        &format!(
            "{} subtitles from {} clips ({:.2}s of narration)",
            segments.len(),
            entries.len(),
            total_duration(&entries)
        ),
        Some(serde_json::json!({
            "segments": segments.len(),
            "clips": entries.len(),
            "duration_seconds": total_duration(&entries),
        })),
    );

    let overlaps = count_overlaps(&segments);
    if overlaps > 0 {
        emit(
            Level::Debug,
            "subtitles.manifest.overlaps",
            &format!(
                "{} subtitles overlap the next one (clip interval shorter than speech)",
                overlaps
            ),
            None,
        );
    }

    write_and_burn(&segments, &args.video, &args.output, ctx, runner)
}

pub fn handle_burn(
    args: BurnArgs,
    ctx: &CommandContext,
    runner: &dyn FfmpegRunner,
) -> Result<Outcome> {
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.video));

    let video = burn_into(
        &args.video,
        &args.ass,
        &output_path,
        &args.ffmpeg,
        ctx,
        runner,
    )?;

    Ok(Outcome::Written {
        ass_path: args.ass,
        video,
    })
}

fn write_and_burn(
    segments: &[Segment],
    video: &Path,
    output: &OutputArgs,
    ctx: &CommandContext,
    runner: &dyn FfmpegRunner,
) -> Result<Outcome> {
    let ass_path = output
        .ass
        .clone()
        .unwrap_or_else(|| default_ass_path(video));

    let style = ctx.config.style.resolve(ctx.platform);
    emit(
        Level::Debug,
        "subtitles.ass.style",
        &format!(
            "Style: {} {}px on {}x{} canvas",
            style.font_name, style.font_size, style.play_res_x, style.play_res_y
        ),
        None,
    );

    write_ass_file(segments, &style, &ass_path)?;
    let captioned: f64 = segments.iter().map(Segment::duration).sum();
    emit(
        Level::Success,
        "subtitles.ass.written",
        &format!("Wrote {} subtitles to {}", segments.len(), ass_path.display()),
        Some(serde_json::json!({
            "path": ass_path,
            "segments": segments.len(),
            "captioned_seconds": captioned,
        })),
    );

    if output.no_burn {
        emit(
            Level::Info,
            "subtitles.burn.skipped",
            "Skipping burn (--no-burn)",
            None,
        );
        return Ok(Outcome::Written {
            ass_path,
            video: None,
        });
    }

    let output_path = output
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(video));
    let burned = burn_into(video, &ass_path, &output_path, &output.ffmpeg, ctx, runner)?;

    Ok(Outcome::Written {
        ass_path,
        video: burned,
    })
}

/// Burn (or print, on dry runs) and return the written video path.
fn burn_into(
    video: &Path,
    ass_path: &Path,
    output_path: &Path,
    ffmpeg: &FfmpegArgs,
    ctx: &CommandContext,
    runner: &dyn FfmpegRunner,
) -> Result<Option<PathBuf>> {
    let options = &ctx.config.burn;

    if ffmpeg.dry_run {
        let command = BurnCommand::prepare(video, ass_path, output_path, options)?;
        let line = command.display();
        emit(
            Level::Info,
            "subtitles.burn.dry_run",
            &line,
            Some(serde_json::json!({ "command": line })),
        );
        return Ok(None);
    }

    emit(
        Level::Info,
        "subtitles.burn.start",
        &format!("Burning subtitles into {}", output_path.display()),
        None,
    );

    let total_duration = match probe_duration_seconds(video) {
        Ok(duration) => Some(duration),
        Err(err) => {
            emit(
                Level::Debug,
                "subtitles.burn.probe_failed",
                &format!("Could not probe duration, progress bar disabled: {:#}", err),
                None,
            );
            None
        }
    };

    let written = burn_subtitles(
        video,
        ass_path,
        output_path,
        options,
        runner,
        FfmpegRunOptions::new(total_duration, ffmpeg.verbose),
    )
    .with_context(|| format!("Failed to burn subtitles into {}", video.display()))?;

    emit(
        Level::Success,
        "subtitles.burn.success",
        &format!("Done: {}", written.display()),
        Some(serde_json::json!({ "path": written })),
    );

    Ok(Some(written))
}

/// `<dir>/<stem>.ass` next to the video.
pub fn default_ass_path(video: &Path) -> PathBuf {
    video.with_extension("ass")
}

/// `<dir>/<stem>_subbed.<ext>` next to the video.
pub fn default_output_path(video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file_name = match video.extension() {
        Some(ext) => format!("{}_subbed.{}", stem, ext.to_string_lossy()),
        None => format!("{}_subbed", stem),
    };
    video.with_file_name(file_name)
}
