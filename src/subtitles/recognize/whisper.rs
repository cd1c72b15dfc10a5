use std::path::Path;

use crate::subtitles::error::SubtitleError;
use crate::subtitles::segment::Recognition;

use super::{Capabilities, RecognitionParams, Recognizer, run_and_parse, scoped_output_dir};

/// The reference `openai-whisper` CLI. Slower, segment timing only.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAiWhisper;

impl OpenAiWhisper {
    pub const PROGRAM: &'static str = "whisper";

    fn build_args(media: &Path, output_dir: &Path, params: &RecognitionParams) -> Vec<String> {
        let mut args = vec![
            media.to_string_lossy().into_owned(),
            "--model".to_string(),
            params.model.as_str().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().into_owned(),
            "--verbose".to_string(),
            "False".to_string(),
        ];

        if let Some(device) = params.device.flag_value() {
            args.push("--device".to_string());
            args.push(device.to_string());
        }
        if let Some(language) = &params.language {
            args.push("--language".to_string());
            args.push(language.clone());
        }

        args
    }
}

impl Recognizer for OpenAiWhisper {
    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            word_timestamps: false,
            compute_type: false,
        }
    }

    fn recognize(
        &self,
        media: &Path,
        params: &RecognitionParams,
    ) -> Result<Recognition, SubtitleError> {
        let output_dir = scoped_output_dir()?;
        let args = Self::build_args(media, output_dir.path(), params);
        run_and_parse(Self::PROGRAM, &args, media, output_dir.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::recognize::Device;

    #[test]
    fn test_build_args() {
        let params = RecognitionParams {
            device: Device::Cpu,
            language: Some("zh".to_string()),
            word_timestamps: true,
            ..RecognitionParams::default()
        };
        let args = OpenAiWhisper::build_args(Path::new("in.mkv"), Path::new("out"), &params);

        assert_eq!(args[0], "in.mkv");
        let joined = args.join(" ");
        assert!(joined.contains("--model base"));
        assert!(joined.contains("--output_format json"));
        assert!(joined.contains("--device cpu"));
        assert!(joined.contains("--language zh"));
        assert!(!joined.contains("word_timestamps"));
        assert!(!joined.contains("compute_type"));
    }

    #[test]
    fn test_build_args_auto_device() {
        let args = OpenAiWhisper::build_args(
            Path::new("in.mkv"),
            Path::new("out"),
            &RecognitionParams::default(),
        );
        assert!(!args.contains(&"--device".to_string()));
        assert!(!args.contains(&"--language".to_string()));
    }
}
