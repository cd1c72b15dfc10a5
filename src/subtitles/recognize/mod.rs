//! Speech recognition through external Whisper command-line tools.
//!
//! Two backends produce the same JSON transcript shape:
//! - WhisperX (run through `uvx`): word timestamps and compute-type selection
//! - OpenAI Whisper (`whisper` CLI): segment timing only
//!
//! The backend is chosen by what is installed, preferring WhisperX.

mod json;
mod whisper;
mod whisperx;

use std::fs;
use std::path::{Path, PathBuf};

use duct::cmd;
use serde::{Deserialize, Serialize};

use crate::ui::prelude::{Level, emit};

use super::error::SubtitleError;
use super::segment::Recognition;

pub use json::parse_recognizer_json;
pub use whisper::OpenAiWhisper;
pub use whisperx::WhisperX;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    LargeV2,
    LargeV3,
}

impl ModelSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::LargeV2 => "large-v2",
            ModelSize::LargeV3 => "large-v3",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Device {
    /// Let the backend pick (GPU when available)
    #[default]
    Auto,
    Cuda,
    Cpu,
}

impl Device {
    /// Value for the backend's `--device` flag; `None` leaves the choice to the backend.
    pub fn flag_value(self) -> Option<&'static str> {
        match self {
            Device::Auto => None,
            Device::Cuda => Some("cuda"),
            Device::Cpu => Some("cpu"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BackendPreference {
    /// WhisperX when available, otherwise OpenAI Whisper
    #[default]
    Auto,
    Whisperx,
    Whisper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionParams {
    pub model: ModelSize,
    pub device: Device,
    /// Precision mode (e.g. float32, float16, int8)
    pub compute_type: String,
    /// Language hint; `None` means auto-detect
    pub language: Option<String>,
    pub word_timestamps: bool,
}

impl Default for RecognitionParams {
    fn default() -> Self {
        Self {
            model: ModelSize::default(),
            device: Device::default(),
            compute_type: "float32".to_string(),
            language: None,
            word_timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub word_timestamps: bool,
    pub compute_type: bool,
}

pub trait Recognizer {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    /// Transcribe an existing media file.
    fn recognize(
        &self,
        media: &Path,
        params: &RecognitionParams,
    ) -> Result<Recognition, SubtitleError>;
}

/// Transcribe `media` with `recognizer`, failing with `NotFound` before the
/// backend is started when the file is missing.
pub fn transcribe(
    recognizer: &dyn Recognizer,
    media: &Path,
    params: &RecognitionParams,
) -> Result<Recognition, SubtitleError> {
    SubtitleError::ensure_exists("Media file", media)?;

    let capabilities = recognizer.capabilities();
    if params.word_timestamps && !capabilities.word_timestamps {
        emit(
            Level::Warn,
            "subtitles.recognize.no_word_timestamps",
            &format!(
                "{} does not report word timestamps; continuing with segment timing",
                recognizer.name()
            ),
            None,
        );
    }
    if !capabilities.compute_type {
        emit(
            Level::Debug,
            "subtitles.recognize.compute_type_ignored",
            &format!(
                "{} ignores compute type {}",
                recognizer.name(),
                params.compute_type
            ),
            None,
        );
    }

    let mut recognition = recognizer.recognize(media, params)?;
    if recognition.language.is_none() {
        recognition.language = params.language.clone();
    }
    Ok(recognition)
}

/// Pick an installed backend according to `preference`.
pub fn select_recognizer(
    preference: BackendPreference,
) -> Result<Box<dyn Recognizer>, SubtitleError> {
    select_recognizer_with(preference, |program| which::which(program).is_ok())
}

fn select_recognizer_with(
    preference: BackendPreference,
    is_installed: impl Fn(&str) -> bool,
) -> Result<Box<dyn Recognizer>, SubtitleError> {
    let whisperx = || -> Option<Box<dyn Recognizer>> {
        is_installed(WhisperX::LAUNCHER).then(|| Box::new(WhisperX) as Box<dyn Recognizer>)
    };
    let whisper = || -> Option<Box<dyn Recognizer>> {
        is_installed(OpenAiWhisper::PROGRAM)
            .then(|| Box::new(OpenAiWhisper) as Box<dyn Recognizer>)
    };

    let selected = match preference {
        BackendPreference::Auto => whisperx().or_else(whisper),
        BackendPreference::Whisperx => whisperx(),
        BackendPreference::Whisper => whisper(),
    };

    selected.ok_or_else(|| {
        SubtitleError::Recognition(format!(
            "no speech recognizer available (backend: {:?}). Install uv for WhisperX \
             (`pip install uv`) or OpenAI Whisper (`pip install openai-whisper`)",
            preference
        ))
    })
}

/// Run a recognizer CLI that writes `<stem>.json` into `output_dir`, then parse it.
fn run_and_parse(
    program: &str,
    args: &[String],
    media: &Path,
    output_dir: &Path,
) -> Result<Recognition, SubtitleError> {
    emit(
        Level::Debug,
        "subtitles.recognize.command",
        &format!("{} {}", program, shell_words::join(args)),
        None,
    );

    let output = cmd(program, args)
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .map_err(|err| {
            SubtitleError::Recognition(format!("failed to run {}: {}", program, err))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SubtitleError::Recognition(format!(
            "{} exited with status {:?}: {}",
            program,
            output.status.code(),
            tail_lines(&stderr, 20)
        )));
    }

    let json_path = transcript_json_path(media, output_dir);
    let contents = fs::read_to_string(&json_path).map_err(|err| {
        SubtitleError::Recognition(format!(
            "{} did not produce the expected transcript at {}: {}",
            program,
            json_path.display(),
            err
        ))
    })?;

    parse_recognizer_json(&contents).map_err(|err| {
        SubtitleError::Recognition(format!(
            "failed to parse transcript {}: {}",
            json_path.display(),
            err
        ))
    })
}

/// Both CLIs name their output after the input file stem.
fn transcript_json_path(media: &Path, output_dir: &Path) -> PathBuf {
    let stem = media
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcript".to_string());
    output_dir.join(format!("{}.json", stem))
}

fn scoped_output_dir() -> Result<tempfile::TempDir, SubtitleError> {
    tempfile::Builder::new()
        .prefix("subburn-transcript-")
        .tempdir()
        .map_err(|err| {
            SubtitleError::Recognition(format!("failed to create temporary directory: {}", err))
        })
}

fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::segment::Segment;
    use std::cell::Cell;

    struct FakeRecognizer {
        calls: Cell<usize>,
        language: Option<String>,
    }

    impl Recognizer for FakeRecognizer {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities {
                word_timestamps: false,
                compute_type: false,
            }
        }

        fn recognize(
            &self,
            _media: &Path,
            _params: &RecognitionParams,
        ) -> Result<Recognition, SubtitleError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Recognition {
                segments: vec![Segment::new(0.0, 1.0, "hi")],
                language: self.language.clone(),
            })
        }
    }

    #[test]
    fn test_transcribe_missing_media_skips_backend() {
        let recognizer = FakeRecognizer {
            calls: Cell::new(0),
            language: None,
        };
        let dir = tempfile::tempdir().expect("tempdir");

        let err = transcribe(
            &recognizer,
            &dir.path().join("missing.mp4"),
            &RecognitionParams::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SubtitleError::NotFound { .. }));
        assert_eq!(recognizer.calls.get(), 0);
    }

    #[test]
    fn test_transcribe_falls_back_to_language_hint() {
        let recognizer = FakeRecognizer {
            calls: Cell::new(0),
            language: None,
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let media = dir.path().join("clip.wav");
        fs::write(&media, b"RIFF").unwrap();

        let params = RecognitionParams {
            language: Some("zh".to_string()),
            ..RecognitionParams::default()
        };
        let recognition = transcribe(&recognizer, &media, &params).expect("transcribe");

        assert_eq!(recognizer.calls.get(), 1);
        assert_eq!(recognition.language.as_deref(), Some("zh"));
        assert_eq!(recognition.segments.len(), 1);
    }

    #[test]
    fn test_select_prefers_whisperx() {
        let selected = select_recognizer_with(BackendPreference::Auto, |_| true).unwrap();
        assert_eq!(selected.name(), "WhisperX");
        assert!(selected.capabilities().word_timestamps);
    }

    #[test]
    fn test_select_falls_back_to_whisper() {
        let selected =
            select_recognizer_with(BackendPreference::Auto, |p| p == OpenAiWhisper::PROGRAM)
                .unwrap();
        assert_eq!(selected.name(), "OpenAI Whisper");
        assert!(!selected.capabilities().compute_type);
    }

    #[test]
    fn test_select_explicit_backend_unavailable() {
        let result =
            select_recognizer_with(BackendPreference::Whisperx, |p| p == OpenAiWhisper::PROGRAM);
        assert!(matches!(result, Err(SubtitleError::Recognition(_))));
    }

    #[test]
    fn test_transcript_json_path() {
        let path = transcript_json_path(Path::new("/videos/talk.final.mp4"), Path::new("/tmp/x"));
        assert_eq!(path, PathBuf::from("/tmp/x/talk.final.json"));
    }

    #[test]
    fn test_model_names() {
        assert_eq!(ModelSize::LargeV3.as_str(), "large-v3");
        assert_eq!(ModelSize::default().as_str(), "base");
        assert_eq!(Device::Auto.flag_value(), None);
        assert_eq!(Device::Cuda.flag_value(), Some("cuda"));
    }

    #[test]
    fn test_tail_lines() {
        assert_eq!(tail_lines("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail_lines("only", 5), "only");
    }
}
