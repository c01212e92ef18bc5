//! News search client.
//!
//! Uses reqwest to query a NewsAPI-compatible `everything` endpoint. Article text is
//! kept as the provider sent it; [`clean_text`] flattens it with scraper once it has
//! been cut down for the summarizer.

use crate::config::NewsConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use scraper::Html;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("newsbrief/", env!("CARGO_PKG_VERSION"));

/// Largest page size the provider accepts
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("invalid search URL: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned HTTP {0}")]
    HttpStatus(u16),
    #[error("provider reported {code}: {message}")]
    Provider { code: String, message: String },
    #[error("malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A normalized search result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// Provider body text as sent: the description, or the content excerpt when
    /// there is none. May still carry markup and the `[+N chars]` marker.
    pub text: Option<String>,
    /// Publisher name
    pub source: String,
    /// Publication date, `YYYY-MM-DD`
    pub date: String,
    pub url: String,
}

/// Anything that can turn a topic into a list of articles
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, NewsError>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        let text = [raw.description, raw.content]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty());

        Article {
            title: raw.title.unwrap_or_default(),
            text,
            source: raw.source.and_then(|s| s.name).unwrap_or_default(),
            date: raw
                .published_at
                .map(|p| p.chars().take(10).collect())
                .unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        }
    }
}

/// HTTP client for the NewsAPI `everything` endpoint
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    language: String,
    api_key: String,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl NewsApiClient {
    pub fn new(config: &NewsConfig, api_key: &str) -> Result<Self, NewsError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            language: config.language.clone(),
            api_key: api_key.to_string(),
        })
    }

    /// Build the search URL. The key is sent as a header, never in the URL.
    pub fn search_url(&self, query: &str, limit: usize) -> Result<Url, NewsError> {
        let page_size = limit.clamp(1, MAX_PAGE_SIZE).to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("q", query),
                ("pageSize", page_size.as_str()),
                ("language", self.language.as_str()),
            ],
        )
        .map_err(|e| NewsError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, NewsError> {
        let url = self.search_url(query, limit)?;

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let articles = parse_response(status, &body)?;
        debug!(query, count = articles.len(), "fetched articles");
        Ok(articles)
    }
}

/// Interpret a provider response.
///
/// A body whose `status` is not `"ok"` is a provider failure whatever the HTTP
/// status says.
pub fn parse_response(status: StatusCode, body: &str) -> Result<Vec<Article>, NewsError> {
    match serde_json::from_str::<SearchResponse>(body) {
        Ok(resp) if resp.status.as_deref() != Some("ok") => Err(NewsError::Provider {
            code: resp.code.unwrap_or_else(|| "unknown".to_string()),
            message: resp.message.unwrap_or_default(),
        }),
        Ok(_) if !status.is_success() => Err(NewsError::HttpStatus(status.as_u16())),
        Ok(resp) => Ok(resp.articles.into_iter().map(Article::from).collect()),
        Err(_) if !status.is_success() => Err(NewsError::HttpStatus(status.as_u16())),
        Err(e) => Err(NewsError::Decode(e)),
    }
}

/// Flatten an HTML fragment to plain text and collapse whitespace.
///
/// Also drops the `[+1234 chars]` marker the provider appends to clipped content.
pub fn clean_text(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text: String = fragment.root_element().text().collect();
    strip_truncation_marker(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_truncation_marker(text: &str) -> &str {
    let trimmed = text.trim_end();
    if let Some(start) = trimmed.rfind("[+") {
        if let Some(count) = trimmed[start + 2..].strip_suffix(" chars]") {
            if !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()) {
                return trimmed[..start].trim_end();
            }
        }
    }
    trimmed
}
