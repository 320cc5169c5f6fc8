//! Weekly AI-news digest — binary entrypoint.
//! Fetches the week's arXiv papers and Reddit posts, has the LLM draft the
//! newsletter, and emails it. `DIGEST_DRY_RUN=1` prints instead of mailing.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use llm_weekly_digest::{
    pipeline, ArxivFetcher, DigestConfig, EmailSender, OpenAiSummarizer, RedditCredentials,
    RedditFetcher,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("llm_weekly_digest=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = DigestConfig::load_default()?;
    let dry_run = std::env::var("DIGEST_DRY_RUN")
        .ok()
        .is_some_and(|v| v == "1");

    let arxiv = ArxivFetcher::new();
    let reddit = RedditFetcher::new(RedditCredentials::from_env()?);
    let summarizer = OpenAiSummarizer::new(None);
    let mailer = if dry_run {
        None
    } else {
        Some(EmailSender::from_env()?)
    };

    let outcome = pipeline::run_once(&cfg, &arxiv, &reddit, &summarizer, mailer.as_ref()).await?;

    if dry_run {
        println!("{}", outcome.digest);
    }
    info!(
        papers = outcome.papers,
        posts = outcome.posts,
        mailed = outcome.mailed,
        "digest run complete"
    );
    Ok(())
}
