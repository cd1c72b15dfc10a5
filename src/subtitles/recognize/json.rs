//! Parsing of the JSON transcript both recognizer CLIs write.

use serde::Deserialize;

use crate::subtitles::segment::{Recognition, Segment, WordTiming};

#[derive(Debug, Deserialize)]
struct RecognizerOutput {
    #[serde(default)]
    segments: Vec<RecognizerSegment>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecognizerSegment {
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    words: Vec<RecognizerWord>,
}

#[derive(Debug, Deserialize)]
struct RecognizerWord {
    word: String,
    // Alignment can fail for single tokens (numbers, symbols)
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
}

pub fn parse_recognizer_json(json_str: &str) -> Result<Recognition, serde_json::Error> {
    let output: RecognizerOutput = serde_json::from_str(json_str)?;

    let segments = output
        .segments
        .into_iter()
        .filter_map(|segment| {
            let text = segment.text.trim();
            if text.is_empty() {
                return None;
            }
            let words = segment
                .words
                .into_iter()
                .filter_map(|word| match (word.start, word.end) {
                    (Some(start), Some(end)) => Some(WordTiming {
                        word: word.word.trim().to_string(),
                        start,
                        end,
                    }),
                    _ => None,
                })
                .collect();
            Some(Segment::new(segment.start, segment.end, text).with_words(words))
        })
        .collect();

    Ok(Recognition {
        segments,
        language: output.language.filter(|lang| !lang.trim().is_empty()),
    })
}
