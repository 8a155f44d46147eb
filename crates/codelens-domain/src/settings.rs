//! Session settings vocabulary - explanation mode and language selection

use serde::{Deserialize, Serialize};

/// Sentinel language value meaning the model should infer the language
pub const AUTO_DETECT_LANGUAGE: &str = "Auto-detect";

/// Languages the assistant is tuned for
pub const SUPPORTED_LANGUAGES: &[&str] = &["R", "Python", "C++", "JavaScript", "Java"];

/// How explanations should be pitched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationMode {
    /// Plain language, quirks spelled out
    #[default]
    Beginner,

    /// Terse and idiom-heavy
    Advanced,
}

impl ExplanationMode {
    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationMode::Beginner => "beginner",
            ExplanationMode::Advanced => "advanced",
        }
    }

    /// Parse a mode from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" => Some(ExplanationMode::Beginner),
            "advanced" => Some(ExplanationMode::Advanced),
            _ => None,
        }
    }
}

impl std::str::FromStr for ExplanationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid explanation mode: {}", s))
    }
}

impl std::fmt::Display for ExplanationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Substrings that mark input as code rather than arithmetic. Matched anywhere
// in the text, the same way the math/code split has always behaved.
const CODE_MARKERS: &[&str] = &[
    "def", "class", "function", "var", "let", "const", "return", "import", "include", "public",
    "static", "void", "console.", "System.", "print", "if", "else", "for", "while", "try", "catch",
    "<-", "=>", "{", "}", ";",
];

const MATH_SYMBOLS: &[char] = &['+', '-', '*', '/', '^', '='];

/// Heuristic: does this input look like a bare math expression?
///
/// Only meaningful under the auto-detect sentinel; an explicit language
/// selection always means code. Text counts as math when it mixes digits
/// with arithmetic symbols and shows no code markers.
pub fn looks_like_math(text: &str, language: &str) -> bool {
    if language != AUTO_DETECT_LANGUAGE {
        return false;
    }

    let has_math = text.contains(MATH_SYMBOLS) && text.chars().any(|c| c.is_ascii_digit());
    let has_code = CODE_MARKERS.iter().any(|marker| text.contains(marker));

    has_math && !has_code
}
