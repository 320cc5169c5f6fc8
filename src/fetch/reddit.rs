// src/fetch/reddit.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;

use crate::config::RedditCredentials;
use crate::fetch::{
    ensure_metrics_described, format_created, week_cutoff, SourceItem, TimeFilter,
};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    url: String,
    #[serde(default)]
    selftext: String,
    created_utc: f64,
    #[serde(default)]
    score: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fetches a community's top posts for a coarse period, then strictly
/// re-filters them to the trailing 7 days.
///
/// Reddit's own "week" bucket is imprecise and may admit posts slightly
/// older than 7 days, so every post's creation time is re-validated against
/// `now - 7d` client-side. The re-filter window is fixed at 7 days no matter
/// which [`TimeFilter`] the caller passes; the filter argument only shapes
/// what upstream returns.
pub struct RedditFetcher {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        creds: RedditCredentials,
    },
}

impl RedditFetcher {
    pub fn new(creds: RedditCredentials) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(creds.user_agent.clone())
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            mode: Mode::Http { client, creds },
        }
    }

    /// Parse a canned listing body instead of calling the live API. `limit`
    /// is applied by truncation, the way upstream would honor it.
    pub fn from_fixture(json: &str) -> Self {
        Self {
            mode: Mode::Fixture(json.to_string()),
        }
    }

    /// Top posts of `community` under `time_filter`, at most `limit`, in
    /// upstream ranking order, re-filtered to the strict 7-day window.
    ///
    /// Auth, network, and parse errors propagate; no retry, no partial
    /// result.
    pub async fn fetch_recent_posts(
        &self,
        community: &str,
        time_filter: TimeFilter,
        limit: u32,
    ) -> Result<Vec<SourceItem>> {
        ensure_metrics_described();
        let cutoff = week_cutoff(Utc::now());

        let posts = match &self.mode {
            Mode::Fixture(body) => {
                let mut posts = parse_listing(body)?;
                posts.truncate(limit as usize);
                posts
            }
            Mode::Http { client, creds } => {
                let token = request_token(client, creds).await?;
                let url = listing_url(community, time_filter, limit);
                let body = client
                    .get(&url)
                    .bearer_auth(&token)
                    .send()
                    .await
                    .map_err(|e| {
                        counter!("fetch_errors_total").increment(1);
                        e
                    })
                    .context("reddit http get()")?
                    .error_for_status()
                    .context("reddit http status")?
                    .text()
                    .await
                    .context("reddit http .text()")?;
                parse_listing(&body)?
            }
        };

        Ok(retain_recent(posts, cutoff))
    }
}

async fn request_token(client: &reqwest::Client, creds: &RedditCredentials) -> Result<String> {
    let resp = client
        .post(TOKEN_URL)
        .basic_auth(&creds.client_id, Some(&creds.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .context("reddit token post()")?
        .error_for_status()
        .context("reddit token status")?;
    let tok: TokenResponse = resp.json().await.context("reddit token body")?;
    Ok(tok.access_token)
}

fn listing_url(community: &str, time_filter: TimeFilter, limit: u32) -> String {
    format!(
        "{OAUTH_BASE}/r/{community}/top?t={}&limit={limit}",
        time_filter.as_str()
    )
}

fn parse_listing(body: &str) -> Result<Vec<Post>> {
    let t0 = std::time::Instant::now();
    let listing: Listing = serde_json::from_str(body).context("parsing reddit listing json")?;
    let posts: Vec<Post> = listing.data.children.into_iter().map(|c| c.data).collect();

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("fetch_parse_ms").record(ms);
    counter!("fetch_items_total").increment(posts.len() as u64);
    Ok(posts)
}

/// Keep only posts created strictly after `cutoff`, preserving upstream
/// ranking order. A post created exactly at the cutoff is dropped.
fn retain_recent(posts: Vec<Post>, cutoff: DateTime<Utc>) -> Vec<SourceItem> {
    let cutoff_ts = cutoff.timestamp() as f64;
    let mut dropped = 0u64;

    let mut out = Vec::with_capacity(posts.len());
    for post in posts {
        if post.created_utc <= cutoff_ts {
            dropped += 1;
            continue;
        }
        let created = DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0)
            .map(format_created);
        out.push(SourceItem {
            title: post.title,
            url: post.url,
            body: post.selftext,
            authors: None,
            score: Some(post.score),
            created,
        });
    }

    counter!("fetch_dropped_total").increment(dropped);
    out
}
