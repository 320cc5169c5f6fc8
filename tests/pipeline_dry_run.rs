use chrono::Utc;
use llm_weekly_digest::{
    pipeline, ArxivFetcher, DigestConfig, MockSummarizer, RedditFetcher, TimeFilter,
};

const ARXIV_ATOM: &str = include_str!("fixtures/arxiv_feed.xml");

fn reddit_fixture() -> String {
    let now = Utc::now().timestamp();
    format!(
        r#"{{"data":{{"children":[{{"data":{{"title":"Fresh","url":"http://example.com/fresh","selftext":"news","created_utc":{now}.0,"score":12}}}}]}}}}"#
    )
}

fn cfg() -> DigestConfig {
    DigestConfig {
        topic: "ml".to_string(),
        max_papers: 5,
        subreddit: "LocalLLaMA".to_string(),
        time_filter: TimeFilter::Week,
        max_posts: 6,
        mail_subject: "test digest".to_string(),
    }
}

#[tokio::test]
async fn dry_run_drafts_without_mailing() {
    let arxiv = ArxivFetcher::from_fixture(ARXIV_ATOM);
    let reddit = RedditFetcher::from_fixture(&reddit_fixture());
    let summarizer = MockSummarizer {
        fixed: "the weekly digest".to_string(),
    };

    let outcome = pipeline::run_once(&cfg(), &arxiv, &reddit, &summarizer, None)
        .await
        .expect("pipeline run ok");

    assert_eq!(outcome.digest, "the weekly digest");
    assert_eq!(outcome.papers, 2);
    assert_eq!(outcome.posts, 1);
    assert!(!outcome.mailed);
}

#[tokio::test]
async fn failing_fetcher_degrades_to_an_empty_source_set() {
    let arxiv = ArxivFetcher::from_fixture("not atom");
    let reddit = RedditFetcher::from_fixture(&reddit_fixture());
    let summarizer = MockSummarizer {
        fixed: "partial digest".to_string(),
    };

    let outcome = pipeline::run_once(&cfg(), &arxiv, &reddit, &summarizer, None)
        .await
        .expect("run survives a failing source");

    assert_eq!(outcome.papers, 0);
    assert_eq!(outcome.posts, 1);
    assert_eq!(outcome.digest, "partial digest");
}
