//! # NewsBrief
//!
//! A TUI that fetches the latest news on a topic, summarizes each article and notes
//! why it matters.
//!
//! ## Features
//!
//! - **Digest pipeline**: fetch → summarize → annotate, one article at a time, in
//!   provider order
//! - **Pluggable summarizer**: Gemini via rstructor, or an offline extractive summarizer
//! - **Time-boxed cache**: identical topics within the TTL skip the provider round-trip

pub mod agent;
pub mod briefing;
pub mod cache;
pub mod config;
pub mod digest;
pub mod logging;
pub mod news;
pub mod summary;
pub mod ui;

pub use briefing::Briefing;
pub use config::Config;
pub use digest::{DigestEntry, DigestPipeline};
pub use summary::{SummarySettings, SummaryStatus};
