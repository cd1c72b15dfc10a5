//! Burning ASS subtitles into video frames with FFmpeg (libass).

mod services;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::SubtitleError;

pub use services::{
    FfmpegExit, FfmpegRunOptions, FfmpegRunner, SystemFfmpegRunner, probe_duration_seconds,
};

/// Encoding parameters for the burned output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnOptions {
    /// Video encoder passed to `-c:v`
    pub video_codec: String,
    /// Encoder speed preset
    pub preset: String,
    /// Constant rate factor (lower = better quality)
    pub crf: u32,
    /// Stream-copy audio instead of re-encoding to AAC
    pub copy_audio: bool,
    /// ffmpeg executable
    pub ffmpeg_bin: String,
}

impl Default for BurnOptions {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "fast".to_string(),
            crf: 23,
            copy_audio: true,
            ffmpeg_bin: "ffmpeg".to_string(),
        }
    }
}

/// Escape a path for use inside a quoted ffmpeg filter argument.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
}

/// Build the ffmpeg argument list (without the binary itself).
pub fn build_burn_args(
    video: &Path,
    ass_abs: &Path,
    output: &Path,
    options: &BurnOptions,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        video.to_string_lossy().into_owned(),
        "-vf".to_string(),
        format!("ass='{}'", escape_filter_path(ass_abs)),
        "-c:v".to_string(),
        options.video_codec.clone(),
        "-preset".to_string(),
        options.preset.clone(),
        "-crf".to_string(),
        options.crf.to_string(),
    ];

    if options.copy_audio {
        args.extend(["-c:a", "copy"].map(String::from));
    } else {
        args.extend(["-c:a", "aac", "-b:a", "192k"].map(String::from));
    }

    args.push(output.to_string_lossy().into_owned());
    args
}

/// A fully resolved ffmpeg invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnCommand {
    pub binary: String,
    pub args: Vec<String>,
}

impl BurnCommand {
    /// Check inputs and resolve the subtitle path.
    pub fn prepare(
        video: &Path,
        ass: &Path,
        output: &Path,
        options: &BurnOptions,
    ) -> Result<Self, SubtitleError> {
        SubtitleError::ensure_exists("Video", video)?;
        SubtitleError::ensure_exists("Subtitle file", ass)?;

        if same_file(video, output) {
            return Err(SubtitleError::Compositing {
                status: None,
                diagnostics: format!(
                    "output path {} would overwrite the source video",
                    output.display()
                ),
            });
        }

        let ass_abs = ass.canonicalize().map_err(|err| SubtitleError::io(ass, err))?;

        Ok(Self {
            binary: options.ffmpeg_bin.clone(),
            args: build_burn_args(video, &ass_abs, output, options),
        })
    }

    /// Shell-quoted command line, for dry runs.
    pub fn display(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.binary.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Burn `ass` into `video`, writing `output`.
pub fn burn_subtitles(
    video: &Path,
    ass: &Path,
    output: &Path,
    options: &BurnOptions,
    runner: &dyn FfmpegRunner,
    run_options: FfmpegRunOptions,
) -> Result<PathBuf, SubtitleError> {
    let command = BurnCommand::prepare(video, ass, output, options)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|_| SubtitleError::not_found("Output directory", parent))?;
    }

    runner
        .run(&command.args, run_options)
        .map_err(|err| match err.downcast::<FfmpegExit>() {
            Ok(exit) => SubtitleError::Compositing {
                status: exit.status,
                diagnostics: exit.diagnostics,
            },
            Err(err) => SubtitleError::Compositing {
                status: None,
                diagnostics: format!("{:#}", err),
            },
        })?;

    Ok(output.to_path_buf())
}
