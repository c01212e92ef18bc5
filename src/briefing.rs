//! Cached front of the digest pipeline, used by the CLI and the TUI.

use crate::agent::{self, AgentError};
use crate::cache::TtlCache;
use crate::config::{Config, ConfigError};
use crate::digest::{DigestEntry, DigestError, DigestPipeline};
use crate::news::{NewsApiClient, NewsError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to set up news client: {0}")]
    News(#[from] NewsError),
    #[error("failed to set up summarizer: {0}")]
    Agent(#[from] AgentError),
}

pub struct Briefing {
    pipeline: DigestPipeline,
    cache: TtlCache<Vec<DigestEntry>>,
}

impl Briefing {
    pub fn new(pipeline: DigestPipeline, cache: TtlCache<Vec<DigestEntry>>) -> Self {
        Self { pipeline, cache }
    }

    /// Wire the news client, summarizer and cache from configuration
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let provider = NewsApiClient::new(&config.news, config.news_api_key()?)?;
        let summarizer = agent::from_config(config)?;
        let pipeline = DigestPipeline::new(
            Arc::new(provider),
            summarizer,
            config.summary,
            config.news.max_articles,
        );
        Ok(Self::new(pipeline, TtlCache::new(config.cache_ttl())))
    }

    pub fn summarizer_name(&self) -> &str {
        self.pipeline.summarizer_name()
    }

    /// Digest for `topic`, served from the cache while it is fresh.
    ///
    /// A failed fetch is reported as an empty digest and is not cached.
    pub async fn digest(&self, topic: &str) -> Result<Vec<DigestEntry>, DigestError> {
        if let Some(entries) = self.cache.get(topic) {
            debug!(topic, "digest cache hit");
            return Ok(entries);
        }

        match self.pipeline.try_generate(topic).await {
            Ok(entries) => {
                self.cache.insert(topic, entries.clone());
                Ok(entries)
            }
            Err(DigestError::Fetch(e)) => {
                warn!(topic, error = %e, "news fetch failed, showing no articles");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ExtractiveSummarizer;
    use crate::news::{Article, NewsProvider};
    use crate::summary::SummarySettings;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts round-trips; fails while `failing` is set
    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        failing: bool,
    }

    #[async_trait]
    impl NewsProvider for CountingProvider {
        async fn search(&self, query: &str, _limit: usize) -> Result<Vec<Article>, NewsError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(NewsError::HttpStatus(500));
            }
            Ok(vec![Article {
                title: format!("{} #{}", query, n),
                ..Default::default()
            }])
        }
    }

    fn briefing(provider: Arc<CountingProvider>, ttl: Duration) -> Briefing {
        let pipeline = DigestPipeline::new(
            provider,
            Arc::new(ExtractiveSummarizer),
            SummarySettings::default(),
            5,
        );
        Briefing::new(pipeline, TtlCache::new(ttl))
    }

    #[tokio::test]
    async fn repeated_topic_is_served_from_cache() {
        let provider = Arc::new(CountingProvider::default());
        let briefing = briefing(provider.clone(), Duration::from_secs(900));

        let first = briefing.digest("electric vehicles").await.unwrap();
        let second = briefing.digest("electric vehicles").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].title, "electric vehicles #0");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_topics_are_fetched_separately() {
        let provider = Arc::new(CountingProvider::default());
        let briefing = briefing(provider.clone(), Duration::from_secs(900));

        briefing.digest("ai").await.unwrap();
        briefing.digest("AI").await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let provider = Arc::new(CountingProvider::default());
        let briefing = briefing(provider.clone(), Duration::ZERO);

        briefing.digest("ai").await.unwrap();
        let again = briefing.digest("ai").await.unwrap();
        assert_eq!(again[0].title, "ai #1");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_failures_are_empty_and_not_cached() {
        let provider = Arc::new(CountingProvider {
            failing: true,
            ..Default::default()
        });
        let briefing = briefing(provider.clone(), Duration::from_secs(900));

        assert!(briefing.digest("outage").await.unwrap().is_empty());
        assert!(briefing.digest("outage").await.unwrap().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn blank_topic_is_an_error() {
        let provider = Arc::new(CountingProvider::default());
        let briefing = briefing(provider.clone(), Duration::from_secs(900));

        assert!(matches!(briefing.digest(" ").await, Err(DigestError::EmptyTopic)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn setup_requires_news_key() {
        let err = Briefing::from_config(&Config::default()).err().unwrap();
        assert!(matches!(err, SetupError::Config(ConfigError::MissingApiKey(_))));
    }
}
