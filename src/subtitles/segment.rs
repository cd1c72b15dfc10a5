/// A single word with its timing information.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// A timed caption span, in seconds from the start of the media.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Word timings reported by the recognizer. Empty when the producer
    /// has no word-level alignment; not rendered into the subtitle track.
    pub words: Vec<WordTiming>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: Vec::new(),
        }
    }

    pub fn with_words(mut self, words: Vec<WordTiming>) -> Self {
        self.words = words;
        self
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Output of a recognizer run.
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    pub segments: Vec<Segment>,
    /// Language tag detected (or forced) by the recognizer, e.g. "en".
    pub language: Option<String>,
}

/// Number of adjacent pairs where a segment ends after the next one starts.
pub fn count_overlaps(segments: &[Segment]) -> usize {
    segments
        .windows(2)
        .filter(|pair| pair[0].end > pair[1].start)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_overlaps() {
        let segments = vec![
            Segment::new(0.0, 2.0, "a"),
            Segment::new(1.5, 3.0, "b"),
            Segment::new(3.0, 4.0, "c"),
        ];
        assert_eq!(count_overlaps(&segments), 1);
        assert_eq!(count_overlaps(&segments[..1]), 0);
    }

    #[test]
    fn test_duration() {
        assert_eq!(Segment::new(1.25, 3.75, "x").duration(), 2.5);
    }
}
