//! Banned-word screening for user submissions.
//!
//! The stores accept any text. Callers (CLI, HTTP handlers) run submissions
//! through a `ContentFilter` first and refuse the ones that match.

use log::warn;
use regex::{Regex, RegexBuilder};

/// Built-in Vietnamese and English word list.
pub const DEFAULT_BANNED_WORDS: &[&str] = &[
    "fuck", "shit", "damn", "bitch", "asshole",
    "địt", "đéo", "lồn", "cặc", "buồi", "đĩ", "đụ", "ăn cứt", "ăn đĩ", "ăn lồn",
];

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    BannedWords,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::Empty => "content must not be empty",
            Rejection::BannedWords => "content contains banned words",
        }
    }
}

pub struct ContentFilter {
    pattern: Option<Regex>,
}

impl ContentFilter {
    /// Filter over the built-in list plus `extra` words.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = DEFAULT_BANNED_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra.into_iter().map(|w| w.as_ref().trim().to_string()))
            .filter(|w| !w.is_empty())
            .collect();
        Self::from_words(&words)
    }

    fn from_words(words: &[String]) -> Self {
        if words.is_empty() {
            return Self { pattern: None };
        }
        let alternation = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = match RegexBuilder::new(&alternation).case_insensitive(true).build() {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Banned word pattern rejected, filter disabled: {}", e);
                None
            }
        };
        Self { pattern }
    }

    /// Case-insensitive substring match against the word list.
    pub fn contains_banned_words(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Trims and screens a submission. Returns the trimmed text when accepted.
    pub fn check<'a>(&self, text: &'a str) -> Result<&'a str, Rejection> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Rejection::Empty);
        }
        if self.contains_banned_words(trimmed) {
            return Err(Rejection::BannedWords);
        }
        Ok(trimmed)
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}
