//! Summarizer capability.
//!
//! A [`Summarizer`] is built once at startup from the configuration and shared by
//! the digest pipeline. The Gemini variant uses rstructor; the extractive variant
//! runs offline and is fully deterministic.

use crate::config::Config;
use crate::summary::{limit_words, word_count, SummarySettings};
use async_trait::async_trait;
use rstructor::{GeminiClient, GeminiModel, LLMClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("summarizer returned an empty summary")]
    EmptySummary,
    #[error("unknown summarizer provider: {0}")]
    UnknownProvider(String),
    #[error("configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

/// Produces a summary for a block of article text
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str, settings: &SummarySettings) -> Result<String, AgentError>;
}

/// Build the summarizer named by `agent.provider`
pub fn from_config(config: &Config) -> Result<Arc<dyn Summarizer>, AgentError> {
    match config.agent.provider.as_str() {
        "extractive" => Ok(Arc::new(ExtractiveSummarizer)),
        "gemini" => Ok(Arc::new(GeminiSummarizer::new(config)?)),
        other => Err(AgentError::UnknownProvider(other.to_string())),
    }
}

/// Structured reply requested from the LLM
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummaryResponse {
    /// Neutral summary of the article, in plain prose
    pub summary: String,
}

/// LLM summarizer backed by Gemini
pub struct GeminiSummarizer {
    client: GeminiClient,
    persona: String,
    label: String,
}

impl GeminiSummarizer {
    pub fn new(config: &Config) -> Result<Self, AgentError> {
        let api_key = config.agent_api_key()?;

        // Parse the model from config
        let model = parse_gemini_model(&config.agent.model);

        let client = GeminiClient::new(api_key)
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?
            .model(model)
            .temperature(0.0);

        Ok(Self {
            client,
            persona: config.agent.persona.clone(),
            label: format!("gemini ({})", config.agent.model),
        })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    fn name(&self) -> &str {
        &self.label
    }

    async fn summarize(
        &self,
        text: &str,
        settings: &SummarySettings,
    ) -> Result<String, AgentError> {
        let prompt = build_prompt(&self.persona, text, settings)?;

        let result = self
            .client
            .generate_with_metadata(&prompt)
            .await
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?;

        let summary = parse_summary(&result.text)?;
        Ok(limit_words(&summary, settings.max_words))
    }
}

fn build_prompt(
    persona: &str,
    text: &str,
    settings: &SummarySettings,
) -> Result<String, AgentError> {
    let schema = serde_json::to_string_pretty(&schemars::schema_for!(SummaryResponse))
        .map_err(|e| AgentError::ParseError(e.to_string()))?;

    Ok(format!(
        r#"{persona}

Summarize the news article below in {min} to {max} words. Use only facts stated in the
article, keep a neutral tone and write plain prose without lists or headings.

You MUST respond with valid JSON matching this schema:
{schema}

Do not include any markdown formatting, code blocks, or explanations. Only output the raw JSON object.

---

{text}"#,
        min = settings.min_words,
        max = settings.max_words,
    ))
}

/// Parse the JSON reply into summary text
fn parse_summary(raw: &str) -> Result<String, AgentError> {
    let cleaned = strip_markdown_json(raw);
    let response: SummaryResponse = serde_json::from_str(&cleaned)
        .map_err(|e| AgentError::ParseError(format!("{}: {}", e, cleaned)))?;

    let summary = response.summary.trim();
    if summary.is_empty() {
        return Err(AgentError::EmptySummary);
    }
    Ok(summary.to_string())
}

/// Strip markdown code block wrappers from JSON response
fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();

    // Remove ```json ... ``` or ``` ... ```
    if let Some(rest) = trimmed.strip_prefix("```") {
        let without_prefix = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim().to_string();
        }
    }

    trimmed.to_string()
}

/// Parse a model string into a GeminiModel
fn parse_gemini_model(model: &str) -> GeminiModel {
    match model {
        "gemini-2.0-flash" => GeminiModel::Gemini20Flash,
        "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
        "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
        _ => GeminiModel::Gemini20Flash, // Default
    }
}

/// Offline summarizer that keeps the lead sentences of the article.
///
/// Sentences are taken in order until `min_words` is reached, then the result is
/// capped at `max_words`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizer;

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn summarize(
        &self,
        text: &str,
        settings: &SummarySettings,
    ) -> Result<String, AgentError> {
        let mut picked = Vec::new();
        let mut words = 0;
        for sentence in split_sentences(text) {
            words += word_count(sentence);
            picked.push(sentence);
            if words >= settings.min_words {
                break;
            }
        }

        let summary = limit_words(&picked.join(" "), settings.max_words);
        if summary.is_empty() {
            return Err(AgentError::EmptySummary);
        }
        Ok(summary)
    }
}

/// Split text after `.`, `!` or `?` when followed by whitespace
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(next_idx, next)) = chars.peek() {
                if next.is_whitespace() {
                    let sentence = text[start..next_idx].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = next_idx;
                }
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}
