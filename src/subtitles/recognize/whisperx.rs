use std::path::Path;

use crate::subtitles::error::SubtitleError;
use crate::subtitles::segment::Recognition;

use super::{Capabilities, RecognitionParams, Recognizer, run_and_parse, scoped_output_dir};

/// Uvx arguments for running WhisperX with compatible Python and torch versions.
/// Prevents torchaudio compatibility issues (see: https://github.com/m-bain/whisperX/issues/1264)
const WHISPERX_UVX_ARGS: &[&str] = &["--python", "3.10"];

/// WhisperX, launched through `uvx` so no global install is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhisperX;

impl WhisperX {
    pub const LAUNCHER: &'static str = "uvx";

    fn build_args(media: &Path, output_dir: &Path, params: &RecognitionParams) -> Vec<String> {
        let media = media.to_string_lossy();
        let output_dir = output_dir.to_string_lossy();

        let mut args: Vec<String> = WHISPERX_UVX_ARGS.iter().map(|s| s.to_string()).collect();
        args.extend(
            [
                "whisperx",
                &*media,
                "--output_format",
                "json",
                "--output_dir",
                &*output_dir,
                "--model",
                params.model.as_str(),
                "--compute_type",
                params.compute_type.as_str(),
            ]
            .map(String::from),
        );

        if let Some(device) = params.device.flag_value() {
            args.push("--device".to_string());
            args.push(device.to_string());
        }
        if let Some(language) = &params.language {
            args.push("--language".to_string());
            args.push(language.clone());
        }
        // Word timestamps come from the alignment pass
        if !params.word_timestamps {
            args.push("--no_align".to_string());
        }

        args
    }
}

impl Recognizer for WhisperX {
    fn name(&self) -> &'static str {
        "WhisperX"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            word_timestamps: true,
            compute_type: true,
        }
    }

    fn recognize(
        &self,
        media: &Path,
        params: &RecognitionParams,
    ) -> Result<Recognition, SubtitleError> {
        let output_dir = scoped_output_dir()?;
        let args = Self::build_args(media, output_dir.path(), params);
        run_and_parse(Self::LAUNCHER, &args, media, output_dir.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::recognize::{Device, ModelSize};

    #[test]
    fn test_build_args_defaults() {
        let args = WhisperX::build_args(
            Path::new("/videos/talk.mp4"),
            Path::new("/tmp/out"),
            &RecognitionParams::default(),
        );

        assert_eq!(
            args,
            vec![
                "--python",
                "3.10",
                "whisperx",
                "/videos/talk.mp4",
                "--output_format",
                "json",
                "--output_dir",
                "/tmp/out",
                "--model",
                "base",
                "--compute_type",
                "float32",
                "--no_align",
            ]
        );
    }

    #[test]
    fn test_build_args_with_options() {
        let params = RecognitionParams {
            model: ModelSize::LargeV2,
            device: Device::Cuda,
            compute_type: "float16".to_string(),
            language: Some("en".to_string()),
            word_timestamps: true,
        };
        let args = WhisperX::build_args(Path::new("a.mp4"), Path::new("out"), &params);

        let joined = args.join(" ");
        assert!(joined.contains("--model large-v2"));
        assert!(joined.contains("--compute_type float16"));
        assert!(joined.contains("--device cuda"));
        assert!(joined.contains("--language en"));
        assert!(!joined.contains("--no_align"));
    }
}
