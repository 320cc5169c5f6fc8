// src/lib.rs
// Public library surface for the digest binary and integration tests.

pub mod config;
pub mod fetch;
pub mod notify;
pub mod pipeline;
pub mod summarize;

// ---- Re-exports for stable public API ----
pub use crate::config::{DigestConfig, RedditCredentials, SmtpSettings};
pub use crate::fetch::{arxiv::ArxivFetcher, reddit::RedditFetcher, SourceItem, TimeFilter};
pub use crate::notify::EmailSender;
pub use crate::pipeline::{run_once, DigestOutcome};
pub use crate::summarize::{digest_prompt, MockSummarizer, OpenAiSummarizer, Summarizer};
