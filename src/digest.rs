//! Digest pipeline: fetch, summarize, annotate.
//!
//! Articles are summarized one at a time, in the order the provider returned them.
//! Short articles never reach the summarizer and a failing summarizer only affects
//! its own entry.

use crate::agent::Summarizer;
use crate::news::{clean_text, Article, NewsError, NewsProvider};
use crate::summary::{
    truncate_chars, word_count, SummarySettings, SummaryStatus, GENERATION_FAILED,
    INSUFFICIENT_CONTENT,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("failed to fetch news: {0}")]
    Fetch(#[from] NewsError),
}

/// One summarized, annotated article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub title: String,
    pub source: String,
    pub date: String,
    pub summary: String,
    pub summary_status: SummaryStatus,
    pub why_it_matters: String,
    pub url: String,
}

/// Templated note attached to every entry
pub fn explain_importance(title: &str) -> String {
    format!(
        "This development around '{}' may influence public opinion, \
         market trends, or upcoming decisions related to this topic.",
        title
    )
}

pub struct DigestPipeline {
    provider: Arc<dyn NewsProvider>,
    summarizer: Arc<dyn Summarizer>,
    settings: SummarySettings,
    max_articles: usize,
}

impl DigestPipeline {
    pub fn new(
        provider: Arc<dyn NewsProvider>,
        summarizer: Arc<dyn Summarizer>,
        settings: SummarySettings,
        max_articles: usize,
    ) -> Self {
        Self {
            provider,
            summarizer,
            settings,
            max_articles,
        }
    }

    pub fn summarizer_name(&self) -> &str {
        self.summarizer.name()
    }

    /// Build a digest, surfacing fetch failures to the caller
    pub async fn try_generate(&self, topic: &str) -> Result<Vec<DigestEntry>, DigestError> {
        if topic.trim().is_empty() {
            return Err(DigestError::EmptyTopic);
        }

        let articles = self.provider.search(topic, self.max_articles).await?;
        debug!(topic, count = articles.len(), "summarizing articles");

        let mut digest = Vec::with_capacity(articles.len());
        for article in articles {
            digest.push(self.build_entry(article).await);
        }
        Ok(digest)
    }

    /// Build a digest, treating a failed fetch as "no articles found"
    pub async fn generate(&self, topic: &str) -> Result<Vec<DigestEntry>, DigestError> {
        match self.try_generate(topic).await {
            Err(DigestError::Fetch(e)) => {
                warn!(topic, error = %e, "news fetch failed, returning an empty digest");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn build_entry(&self, article: Article) -> DigestEntry {
        let (summary, summary_status) = self.summarize(article.text.as_deref()).await;
        DigestEntry {
            why_it_matters: explain_importance(&article.title),
            title: article.title,
            source: article.source,
            date: article.date,
            summary,
            summary_status,
            url: article.url,
        }
    }

    /// Summarize one article body, substituting a placeholder when that is not possible.
    ///
    /// The word minimum and the character cut apply to the body exactly as the
    /// provider sent it; markup is flattened only in what reaches the summarizer.
    pub async fn summarize(&self, text: Option<&str>) -> (String, SummaryStatus) {
        let text = match text {
            Some(t) if word_count(t) >= self.settings.min_input_words => t,
            _ => {
                return (
                    INSUFFICIENT_CONTENT.to_string(),
                    SummaryStatus::InsufficientContent,
                )
            }
        };

        let input = clean_text(truncate_chars(text, self.settings.max_input_chars));
        match self.summarizer.summarize(&input, &self.settings).await {
            Ok(summary) => (summary, SummaryStatus::Generated),
            Err(e) => {
                warn!(summarizer = self.summarizer.name(), error = %e, "summarization failed");
                (GENERATION_FAILED.to_string(), SummaryStatus::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedProvider(Result<Vec<Article>, fn() -> NewsError>);

    #[async_trait]
    impl NewsProvider for FixedProvider {
        async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Article>, NewsError> {
            match &self.0 {
                Ok(articles) => Ok(articles.iter().take(limit).cloned().collect()),
                Err(make) => Err(make()),
            }
        }
    }

    /// Records every input and echoes a fixed reply
    #[derive(Default)]
    struct RecordingSummarizer {
        inputs: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Summarizer for RecordingSummarizer {
        fn name(&self) -> &str {
            "recording"
        }

        async fn summarize(
            &self,
            text: &str,
            _settings: &SummarySettings,
        ) -> Result<String, AgentError> {
            self.inputs.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(AgentError::RequestFailed("model exploded".into()))
            } else {
                Ok(format!("summary of {} chars", text.chars().count()))
            }
        }
    }

    fn article(title: &str, text: Option<String>) -> Article {
        Article {
            title: title.to_string(),
            text,
            source: "Wire".to_string(),
            date: "2025-10-02".to_string(),
            url: format!("https://example.com/{}", title),
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn pipeline(articles: Vec<Article>, summarizer: Arc<RecordingSummarizer>) -> DigestPipeline {
        DigestPipeline::new(
            Arc::new(FixedProvider(Ok(articles))),
            summarizer,
            SummarySettings::default(),
            5,
        )
    }

    #[test]
    fn importance_note_depends_only_on_title() {
        assert_eq!(
            explain_importance("Stock Markets Hit Record Highs"),
            "This development around 'Stock Markets Hit Record Highs' may influence public \
             opinion, market trends, or upcoming decisions related to this topic."
        );
        assert_eq!(explain_importance(""), explain_importance(""));
    }

    #[tokio::test]
    async fn short_or_missing_text_skips_the_summarizer() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = pipeline(
            vec![
                article("none", None),
                article("short", Some(words(39))),
            ],
            summarizer.clone(),
        );

        let digest = pipeline.try_generate("batteries").await.unwrap();
        assert_eq!(digest.len(), 2);
        for entry in &digest {
            assert_eq!(entry.summary, INSUFFICIENT_CONTENT);
            assert_eq!(entry.summary_status, SummaryStatus::InsufficientContent);
        }
        assert!(summarizer.inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn forty_words_is_enough() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = pipeline(vec![article("exact", Some(words(40)))], summarizer.clone());

        let digest = pipeline.try_generate("batteries").await.unwrap();
        assert_eq!(digest[0].summary_status, SummaryStatus::Generated);
        assert_eq!(summarizer.inputs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn long_text_is_cut_to_input_limit() {
        let long = "abcdefghij ".repeat(500);
        assert!(long.chars().count() > 3000);

        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = pipeline(vec![article("long", Some(long.clone()))], summarizer.clone());
        pipeline.try_generate("letters").await.unwrap();

        let inputs = summarizer.inputs.lock().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].chars().count(), 3000);
        assert_eq!(inputs[0], long.chars().take(3000).collect::<String>());
    }

    #[tokio::test]
    async fn summarizer_failure_yields_placeholder() {
        let summarizer = Arc::new(RecordingSummarizer {
            fail: true,
            ..Default::default()
        });
        let pipeline = pipeline(
            vec![article("a", Some(words(60))), article("b", Some(words(60)))],
            summarizer,
        );

        let digest = pipeline.try_generate("topic").await.unwrap();
        assert_eq!(digest.len(), 2);
        for entry in &digest {
            assert_eq!(entry.summary, GENERATION_FAILED);
            assert_eq!(entry.summary_status, SummaryStatus::Failed);
        }
    }

    #[tokio::test]
    async fn preserves_provider_order_and_fields() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let titles = ["one", "two", "two", "three"];
        let articles = titles
            .iter()
            .map(|t| article(t, Some(words(50))))
            .collect();
        let digest = pipeline(articles, summarizer).try_generate("t").await.unwrap();

        let got: Vec<&str> = digest.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(got, titles);
        assert_eq!(digest[0].source, "Wire");
        assert_eq!(digest[0].date, "2025-10-02");
        assert_eq!(digest[0].url, "https://example.com/one");
        assert_eq!(digest[0].why_it_matters, explain_importance("one"));
    }

    #[tokio::test]
    async fn respects_max_articles() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let articles = (0..8).map(|i| article(&i.to_string(), None)).collect();
        let digest = pipeline(articles, summarizer).try_generate("t").await.unwrap();
        assert_eq!(digest.len(), 5);
    }

    #[tokio::test]
    async fn blank_topic_is_rejected() {
        let pipeline = pipeline(vec![], Arc::new(RecordingSummarizer::default()));
        assert!(matches!(pipeline.try_generate("   ").await, Err(DigestError::EmptyTopic)));
        assert!(matches!(pipeline.generate("").await, Err(DigestError::EmptyTopic)));
    }

    #[tokio::test]
    async fn fetch_failure_is_empty_or_error() {
        let pipeline = DigestPipeline::new(
            Arc::new(FixedProvider(Err(|| NewsError::HttpStatus(503)))),
            Arc::new(RecordingSummarizer::default()),
            SummarySettings::default(),
            5,
        );

        assert!(pipeline.generate("outage").await.unwrap().is_empty());
        assert!(matches!(
            pipeline.try_generate("outage").await,
            Err(DigestError::Fetch(NewsError::HttpStatus(503)))
        ));
    }

    #[tokio::test]
    async fn no_results_is_an_empty_digest() {
        let pipeline = pipeline(vec![], Arc::new(RecordingSummarizer::default()));
        assert!(pipeline.generate("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn word_minimum_counts_the_provider_text() {
        let body = serde_json::json!({
            "status": "ok",
            "articles": [{"title": "clipped", "content": format!("{} [+1800 chars]", words(39))}]
        })
        .to_string();
        let articles = crate::news::parse_response(reqwest::StatusCode::OK, &body).unwrap();

        let summarizer = Arc::new(RecordingSummarizer::default());
        let digest = pipeline(articles, summarizer.clone())
            .try_generate("batteries")
            .await
            .unwrap();

        assert_eq!(digest[0].summary_status, SummaryStatus::Generated);
        let inputs = summarizer.inputs.lock().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0], words(39));
    }

    #[tokio::test]
    async fn markup_is_cut_before_it_is_flattened() {
        // the first 3000 characters of the raw body end inside the first paragraph
        let para = words(700);
        let raw = format!("<p>{}</p><p>tail</p>", para);

        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = pipeline(vec![article("html", Some(raw.clone()))], summarizer.clone());
        pipeline.try_generate("html").await.unwrap();

        let inputs = summarizer.inputs.lock().unwrap();
        let expected = truncate_chars(&raw, 3000)
            .trim_start_matches("<p>")
            .trim_end()
            .to_string();
        assert_eq!(inputs[0], expected);
        assert!(!inputs[0].contains("<p>"));
        assert!(!inputs[0].contains("tail"));
    }
}
