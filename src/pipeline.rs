// src/pipeline.rs
//! One full digest run: fetch both sources, draft the newsletter, mail it.

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::{describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::config::DigestConfig;
use crate::fetch::{arxiv::ArxivFetcher, reddit::RedditFetcher, SourceItem};
use crate::notify::EmailSender;
use crate::summarize::{digest_prompt, Summarizer};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_gauge!("digest_last_run_ts", "Unix ts when the digest pipeline last ran.");
    });
}

#[derive(Debug)]
pub struct DigestOutcome {
    pub digest: String,
    pub papers: usize,
    pub posts: usize,
    /// False when mailing was skipped (dry run) or the SMTP send failed.
    pub mailed: bool,
}

/// Fetch, summarize, deliver. A failing fetcher degrades to an empty source
/// set with a warning; a failing summarizer aborts the run; a failing send is
/// reported through [`DigestOutcome::mailed`] rather than an error.
pub async fn run_once(
    cfg: &DigestConfig,
    arxiv: &ArxivFetcher,
    reddit: &RedditFetcher,
    summarizer: &dyn Summarizer,
    mailer: Option<&EmailSender>,
) -> Result<DigestOutcome> {
    ensure_metrics_described();

    let (papers_res, posts_res) = tokio::join!(
        arxiv.fetch_recent_papers(&cfg.topic, cfg.max_papers),
        reddit.fetch_recent_posts(&cfg.subreddit, cfg.time_filter, cfg.max_posts),
    );
    let papers = fallback_empty("arxiv", papers_res);
    let posts = fallback_empty("reddit", posts_res);

    info!(
        papers = papers.len(),
        posts = posts.len(),
        provider = summarizer.name(),
        "drafting digest"
    );
    let prompt = digest_prompt(&papers, &posts);
    let digest = summarizer.summarize(&prompt).await.context("summarizer failed")?;

    let mailed = match mailer {
        Some(m) => match m.send(&cfg.mail_subject, &digest).await {
            Ok(()) => {
                info!(subject = %cfg.mail_subject, "digest email sent");
                true
            }
            Err(e) => {
                warn!(error = ?e, "digest email failed");
                false
            }
        },
        None => {
            info!("dry run, skipping email");
            false
        }
    };

    gauge!("digest_last_run_ts").set(Utc::now().timestamp() as f64);

    Ok(DigestOutcome {
        digest,
        papers: papers.len(),
        posts: posts.len(),
        mailed,
    })
}

fn fallback_empty(source: &'static str, res: Result<Vec<SourceItem>>) -> Vec<SourceItem> {
    match res {
        Ok(v) => v,
        Err(e) => {
            warn!(error = ?e, source, "fetch failed, continuing with empty source set");
            Vec::new()
        }
    }
}
