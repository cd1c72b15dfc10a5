//! Timing reconstruction from a text-to-speech narration manifest.
//!
//! The manifest is a JSON array with one record per synthesized clip:
//! `duration_seconds` (spoken audio), `duration_with_interval_seconds`
//! (audio plus the silence before the next clip) and `text`. Clips are laid
//! end to end starting at zero, so captions can be timed without running ASR.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::SubtitleError;
use super::segment::Segment;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub duration_with_interval_seconds: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ManifestEntry {
    pub fn new(duration: f64, interval: Option<f64>, text: &str) -> Self {
        Self {
            duration_seconds: Some(duration),
            duration_with_interval_seconds: interval,
            text: Some(text.to_string()),
        }
    }

    /// Length of the spoken audio.
    pub fn speech_duration(&self) -> f64 {
        self.duration_seconds.unwrap_or(0.0)
    }

    /// Clock advance for this clip, falling back to the speech length.
    pub fn slot_duration(&self) -> f64 {
        self.duration_with_interval_seconds
            .unwrap_or_else(|| self.speech_duration())
    }

    fn caption(&self) -> &str {
        self.text.as_deref().unwrap_or("").trim()
    }
}

/// Load the raw manifest entries.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>, SubtitleError> {
    SubtitleError::ensure_exists("Manifest", path)?;

    let contents = fs::read_to_string(path).map_err(|err| SubtitleError::io(path, err))?;
    parse_manifest(&contents).map_err(|message| SubtitleError::Format {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_manifest(contents: &str) -> Result<Vec<ManifestEntry>, String> {
    let value: serde_json::Value =
        serde_json::from_str(contents).map_err(|err| format!("not valid JSON: {}", err))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(format!(
                "expected a JSON array of clips, found {}",
                json_kind(&other)
            ));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| format!("entry {}: {}", index, err))
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Lay the clips end to end and emit one segment per clip with text.
///
/// Each segment starts at the running clock and lasts for the clip's speech
/// duration; the clock then advances by the slot duration whether or not a
/// segment was emitted. A slot shorter than its speech yields a segment that
/// overlaps the next one; that overlap is kept as-is.
pub fn reconstruct(entries: &[ManifestEntry]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut clock = 0.0_f64;

    for entry in entries {
        let text = entry.caption();
        if !text.is_empty() {
            segments.push(Segment::new(
                clock,
                clock + entry.speech_duration(),
                text,
            ));
        }
        clock += entry.slot_duration();
    }

    segments
}

/// Final clock value after laying out every clip.
pub fn total_duration(entries: &[ManifestEntry]) -> f64 {
    entries.iter().map(ManifestEntry::slot_duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("narrator_metadata.json");
        fs::write(&path, contents).expect("write manifest");
        path
    }

    #[test]
    fn test_reconstruct_scenario() {
        let entries = vec![
            ManifestEntry::new(2.0, Some(2.5), "Hello"),
            ManifestEntry::new(1.0, None, ""),
            ManifestEntry::new(3.0, Some(3.0), "World"),
        ];

        let segments = reconstruct(&entries);

        assert_eq!(
            segments,
            vec![
                Segment::new(0.0, 2.0, "Hello"),
                Segment::new(3.5, 6.5, "World"),
            ]
        );
        assert_eq!(total_duration(&entries), 6.5);
    }

    #[test]
    fn test_whitespace_text_advances_clock() {
        let entries = vec![
            ManifestEntry::new(1.0, Some(1.25), "  \n\t "),
            ManifestEntry::new(0.5, None, "  next  "),
        ];

        let segments = reconstruct(&entries);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 1.25);
        assert_eq!(segments[0].end, 1.75);
        assert_eq!(segments[0].text, "next");
    }

    #[test]
    fn test_segment_end_excludes_gap() {
        let entries = vec![ManifestEntry::new(1.0, Some(4.0), "speech")];
        let segments = reconstruct(&entries);
        assert_eq!(segments[0].end, 1.0);
    }

    #[test]
    fn test_short_gap_overlap_is_kept() {
        let entries = vec![
            ManifestEntry::new(2.0, Some(1.0), "first"),
            ManifestEntry::new(1.0, None, "second"),
        ];

        let segments = reconstruct(&entries);

        assert_eq!(segments[0].end, 2.0);
        assert_eq!(segments[1].start, 1.0);
        assert!(segments[0].end > segments[1].start);
    }

    #[test]
    fn test_monotonic_starts_and_final_clock() {
        let entries: Vec<ManifestEntry> = (0..25)
            .map(|i| {
                let duration = (i % 4) as f64 * 0.75;
                let interval = if i % 3 == 0 {
                    None
                } else {
                    Some(duration + (i % 5) as f64 * 0.1)
                };
                let text = if i % 7 == 0 { "" } else { "line" };
                ManifestEntry::new(duration, interval, text)
            })
            .collect();

        let segments = reconstruct(&entries);

        assert!(segments.windows(2).all(|pair| pair[0].start <= pair[1].start));
        let expected: f64 = entries
            .iter()
            .map(|e| e.duration_with_interval_seconds.unwrap_or(e.duration_seconds.unwrap()))
            .sum();
        assert!((total_duration(&entries) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fields_default() {
        let entries = parse_manifest(r#"[{"text": "no timing"}, {"duration_seconds": 1.5}]"#)
            .expect("parse");

        assert_eq!(entries[0].speech_duration(), 0.0);
        assert_eq!(entries[0].slot_duration(), 0.0);
        assert_eq!(entries[1].slot_duration(), 1.5);

        let segments = reconstruct(&entries);
        assert_eq!(segments, vec![Segment::new(0.0, 0.0, "no timing")]);
    }

    #[test]
    fn test_null_text_and_extra_fields() {
        let entries = parse_manifest(
            r#"[{"duration_seconds": 1.0, "text": null, "audio_file": "clip_001.wav"},
                {"duration_seconds": 2.0, "text": "kept"}]"#,
        )
        .expect("parse");

        let segments = reconstruct(&entries);
        assert_eq!(segments, vec![Segment::new(1.0, 3.0, "kept")]);
    }

    #[test]
    fn test_empty_manifest_yields_no_segments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(dir.path(), "[]");
        let entries = load_manifest(&path).expect("load");
        assert!(entries.is_empty());
        assert!(reconstruct(&entries).is_empty());
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_manifest(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SubtitleError::NotFound { what: "Manifest", .. }));
    }

    #[test]
    fn test_load_rejects_non_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(dir.path(), r#"{"clips": []}"#);
        let err = load_manifest(&path).unwrap_err();
        match err {
            SubtitleError::Format { message, .. } => {
                assert!(message.contains("an object"), "{}", message)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_rejects_non_record_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(dir.path(), r#"[{"duration_seconds": 1.0}, "oops"]"#);
        let err = load_manifest(&path).unwrap_err();
        match err {
            SubtitleError::Format { message, .. } => assert!(message.starts_with("entry 1")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(dir.path(), "[{");
        assert!(matches!(
            load_manifest(&path),
            Err(SubtitleError::Format { .. })
        ));
    }
}
