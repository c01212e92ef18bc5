//! Summary settings, placeholder texts and word helpers shared by the
//! pipeline and the summarizers.

use serde::{Deserialize, Serialize};

/// Shown when an article has too little text to be worth summarizing.
pub const INSUFFICIENT_CONTENT: &str = "Summary unavailable due to insufficient article content.";

/// Shown when the summarizer fails for an article.
pub const GENERATION_FAILED: &str = "Summary could not be generated due to processing limits.";

/// Bounds applied around every summarization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Articles with fewer words than this never reach the summarizer
    pub min_input_words: usize,
    /// Hard cap on the characters handed to the summarizer
    pub max_input_chars: usize,
    /// Lower bound on summary length, in words
    pub min_words: usize,
    /// Upper bound on summary length, in words
    pub max_words: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            min_input_words: 40,
            max_input_chars: 3000,
            min_words: 40,
            max_words: 120,
        }
    }
}

/// How the summary of a digest entry was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Generated,
    InsufficientContent,
    Failed,
}

impl SummaryStatus {
    /// True when the summary text is one of the fixed placeholders
    pub fn is_placeholder(&self) -> bool {
        !matches!(self, SummaryStatus::Generated)
    }
}

/// Count whitespace separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Return at most `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Keep the first `max` words of `text`, joined by single spaces.
pub fn limit_words(text: &str, max: usize) -> String {
    text.split_whitespace()
        .take(max)
        .collect::<Vec<_>>()
        .join(" ")
}
