//! Extraction payloads - code or math read out of an image

use serde::{Deserialize, Serialize};

/// Extractions with confidence below this threshold carry a caller-visible
/// low-confidence signal. Low confidence is data, not an error.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// One numbered line of extracted source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLine {
    /// 1-based line number
    pub n: u32,

    /// Text of the line, without the trailing newline
    pub text: String,
}

/// Result of reading code or a math problem out of an image
///
/// `lines` must always be the `\n`-split breakdown of `text`. Payloads coming
/// off the wire are repaired with [`CodeExtraction::rebuild_lines`] when the
/// model returns an inconsistent breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeExtraction {
    /// Detected language ("python", "r", "unknown", ...)
    pub language: String,

    /// Extracted source text
    pub text: String,

    /// Per-line breakdown of `text`, 1-based
    #[serde(default)]
    pub lines: Vec<ExtractedLine>,

    /// Model confidence in [0, 1]
    pub confidence: f64,

    /// True when this payload came from the offline fallback generator
    #[serde(default, rename = "isMock")]
    pub is_mock: bool,
}

impl CodeExtraction {
    /// Create an extraction, deriving `lines` from `text`
    pub fn new(language: impl Into<String>, text: impl Into<String>, confidence: f64) -> Self {
        let text = text.into();
        let lines = lines_from_text(&text);
        Self {
            language: language.into(),
            text,
            lines,
            confidence,
            is_mock: false,
        }
    }

    /// True when `lines` matches the newline segments of `text` exactly
    pub fn is_consistent(&self) -> bool {
        let expected = lines_from_text(&self.text);
        self.lines == expected
    }

    /// Rebuild `lines` from `text`, discarding whatever was supplied
    pub fn rebuild_lines(&mut self) {
        self.lines = lines_from_text(&self.text);
    }

    /// True when the confidence falls below the warning threshold
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE_THRESHOLD
    }
}

/// Split text into 1-based numbered lines
///
/// A trailing newline yields a final empty line, matching how the model
/// numbers blank lines in its own breakdowns.
pub fn lines_from_text(text: &str) -> Vec<ExtractedLine> {
    text.split('\n')
        .enumerate()
        .map(|(i, line)| ExtractedLine {
            n: (i + 1) as u32,
            text: line.to_string(),
        })
        .collect()
}
