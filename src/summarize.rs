// src/summarize.rs
//! Summarizer collaborator: the LLM that drafts the weekly newsletter from
//! the fetched source items. Provider abstraction + a deterministic mock.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::fetch::SourceItem;

const SYSTEM_PROMPT: &str = "You are the editor of a weekly Gen-AI / LLM newsletter. \
Write in plain prose, cite every claim with the source URL provided, and never \
invent sources that are not in the material.";

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Draft the newsletter from a fully rendered prompt.
    async fn summarize(&self, prompt: &str) -> Result<String>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// OpenAI chat-completions provider. Requires `OPENAI_API_KEY`.
pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    /// `model_override`: pass Some("gpt-4o") to override; defaults to gpt-4o-mini.
    pub fn new(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("llm-weekly-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("reqwest client");
        let model = model_override.unwrap_or("gpt-4o-mini").to_string();
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY is not set");
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.5,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai http post()")?
            .error_for_status()
            .context("openai http status")?;

        let body: Resp = resp.json().await.context("openai response body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .unwrap_or_default();
        if content.is_empty() {
            bail!("openai returned an empty completion");
        }
        Ok(content.to_string())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Deterministic summarizer for tests and dry runs.
pub struct MockSummarizer {
    pub fixed: String,
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _prompt: &str) -> Result<String> {
        Ok(self.fixed.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Render the newsletter request: the three requested sections plus every
/// source item with its URL so the model can cite them.
pub fn digest_prompt(papers: &[SourceItem], posts: &[SourceItem]) -> String {
    let mut out = String::new();
    out.push_str(
        "Generate the article of the week for the latest Gen-AI / LLM trends and developments.\n\
         With the following sections:\n\n\
         1. summary\n\
         2. highlights\n   \
            point form about what are the latest developments in the field\n\
         3. deep dive\n   \
            talk about each point with relevant link references\n\n",
    );

    out.push_str("## arXiv papers from the last 7 days\n");
    if papers.is_empty() {
        out.push_str("(none fetched)\n");
    }
    for p in papers {
        let authors = p.authors.as_deref().unwrap_or("unknown");
        out.push_str(&format!("- {} ({})\n  {}\n  {}\n", p.title, authors, p.url, p.body));
    }

    out.push_str("\n## Top Reddit posts of the week\n");
    if posts.is_empty() {
        out.push_str("(none fetched)\n");
    }
    for p in posts {
        match p.score {
            Some(score) => out.push_str(&format!("- {} [score {}]\n  {}\n", p.title, score, p.url)),
            None => out.push_str(&format!("- {}\n  {}\n", p.title, p.url)),
        }
        if !p.body.is_empty() {
            out.push_str(&format!("  {}\n", p.body));
        }
    }

    out
}
