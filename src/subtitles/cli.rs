use clap::{Args, Subcommand, ValueHint};
use std::path::PathBuf;

use super::recognize::{BackendPreference, Device, ModelSize};

#[derive(Subcommand, Debug, Clone)]
pub enum SubtitleCommands {
    /// Transcribe a video with Whisper, write ASS subtitles and burn them in
    Asr(AsrArgs),
    /// Time subtitles from a TTS narration manifest instead of running ASR
    Manifest(ManifestArgs),
    /// Burn an existing ASS subtitle file into a video
    Burn(BurnArgs),
}

/// Output locations shared by the subtitle-producing commands
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output video path; defaults to <videoname>_subbed.<ext> next to the video
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Output .ass path; defaults to <videoname>.ass next to the video
    #[arg(long = "ass", value_hint = ValueHint::FilePath)]
    pub ass: Option<PathBuf>,

    /// Only write the .ass file, do not burn it into the video
    #[arg(long)]
    pub no_burn: bool,

    #[command(flatten)]
    pub ffmpeg: FfmpegArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FfmpegArgs {
    /// Show the ffmpeg command that would be executed without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Show raw ffmpeg output instead of progress bar
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AsrArgs {
    /// Source video or audio file to transcribe
    #[arg(value_hint = ValueHint::FilePath)]
    pub video: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Whisper model size
    #[arg(long, value_enum)]
    pub model: Option<ModelSize>,

    /// Language code (e.g. zh, en); auto-detect if omitted
    #[arg(long)]
    pub language: Option<String>,

    /// Device for inference
    #[arg(long, value_enum)]
    pub device: Option<Device>,

    /// Compute type (e.g. float32, float16, int8; WhisperX only)
    #[arg(long)]
    pub compute_type: Option<String>,

    /// Request word-level timestamps (WhisperX only)
    #[arg(long)]
    pub word_timestamps: bool,

    /// Recognizer backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendPreference>,
}

#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Source video file
    #[arg(value_hint = ValueHint::FilePath)]
    pub video: PathBuf,

    /// TTS narration manifest (JSON array of clips with durations and text)
    #[arg(value_hint = ValueHint::FilePath)]
    pub manifest: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BurnArgs {
    /// Source video file
    #[arg(value_hint = ValueHint::FilePath)]
    pub video: PathBuf,

    /// ASS subtitle file to burn in
    #[arg(value_hint = ValueHint::FilePath)]
    pub ass: PathBuf,

    /// Output video path; defaults to <videoname>_subbed.<ext> next to the video
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub ffmpeg: FfmpegArgs,
}
