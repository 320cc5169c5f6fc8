// src/fetch/arxiv.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::fetch::{
    ensure_metrics_described, format_created, normalize_text, trailing_window, SourceItem,
};

const ARXIV_API: &str = "http://export.arxiv.org/api/query";
/// Timestamp precision the arXiv query API expects in `submittedDate` ranges.
const STAMP: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    title: String,
    summary: String,
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

/// Fetches papers submitted in the trailing week that match a topic.
///
/// Owns its HTTP client; construct one per caller instead of sharing a
/// process-wide instance.
pub struct ArxivFetcher {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl ArxivFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("llm-weekly-digest/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            mode: Mode::Http { client },
        }
    }

    /// Parse a canned Atom feed instead of calling the live API.
    pub fn from_fixture(xml: &str) -> Self {
        Self {
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    /// Papers matching `topic` submitted within `[now - 7d, now]`, newest
    /// first (upstream ordering, never re-sorted locally).
    ///
    /// Errors from the network, a non-2xx status, or feed parsing propagate
    /// to the caller; there is no retry and no partial result.
    pub async fn fetch_recent_papers(
        &self,
        topic: &str,
        max_results: u32,
    ) -> Result<Vec<SourceItem>> {
        ensure_metrics_described();

        match &self.mode {
            Mode::Fixture(xml) => parse_feed(xml, max_results as usize),
            Mode::Http { client } => {
                let (start, end) = trailing_window(Utc::now(), 7);
                let query = search_query(topic, start, end);
                let max = max_results.to_string();

                let resp = client
                    .get(ARXIV_API)
                    .query(&[
                        ("search_query", query.as_str()),
                        ("start", "0"),
                        ("max_results", max.as_str()),
                        ("sortBy", "submittedDate"),
                        ("sortOrder", "descending"),
                    ])
                    .send()
                    .await
                    .map_err(|e| {
                        counter!("fetch_errors_total").increment(1);
                        e
                    })
                    .context("arxiv http get()")?;

                let body = resp
                    .error_for_status()
                    .context("arxiv http status")?
                    .text()
                    .await
                    .context("arxiv http .text()")?;

                parse_feed(&body, max_results as usize)
            }
        }
    }
}

impl Default for ArxivFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// `({topic}) AND submittedDate:[{start} TO {end}]`, bounds to the second.
fn search_query(topic: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "({topic}) AND submittedDate:[{} TO {}]",
        start.format(STAMP),
        end.format(STAMP)
    )
}

fn parse_feed(xml: &str, max_results: usize) -> Result<Vec<SourceItem>> {
    let t0 = std::time::Instant::now();
    let feed: Feed = from_str(xml).context("parsing arxiv atom feed")?;

    let mut out = Vec::with_capacity(feed.entries.len().min(max_results));
    for entry in feed.entries.into_iter().take(max_results) {
        let authors = entry
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let created = entry
            .published
            .as_deref()
            .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
            .map(|dt| format_created(dt.with_timezone(&Utc)));

        out.push(SourceItem {
            title: normalize_text(&entry.title),
            url: entry.id,
            body: normalize_text(&entry.summary),
            authors: Some(authors),
            score: None,
            created,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("fetch_parse_ms").record(ms);
    counter!("fetch_items_total").increment(out.len() as u64);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn search_query_embeds_second_precision_window() {
        let start = Utc.with_ymd_and_hms(2024, 5, 8, 9, 30, 5).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 15, 9, 30, 5).unwrap();
        let q = search_query("machine learning", start, end);
        assert_eq!(
            q,
            "(machine learning) AND submittedDate:[20240508093005 TO 20240515093005]"
        );
    }

    #[test]
    fn search_query_stamps_are_14_digits() {
        let (start, end) = trailing_window(Utc::now(), 7);
        let q = search_query("llm", start, end);
        let range = q.split("submittedDate:[").nth(1).unwrap();
        let range = range.trim_end_matches(']');
        let (a, b) = range.split_once(" TO ").unwrap();
        assert_eq!(a.len(), 14);
        assert_eq!(b.len(), 14);
        assert!(a.chars().all(|c| c.is_ascii_digit()));
        assert!(b.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn parse_feed_respects_max_results() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>https://arxiv.org/abs/1234.56789</id>
    <title>Paper 1</title>
    <summary>Summary 1</summary>
    <published>2024-05-10T12:00:00Z</published>
    <author><name>Author 1</name></author>
  </entry>
  <entry>
    <id>https://arxiv.org/abs/9876.54321</id>
    <title>Paper 2</title>
    <summary>Summary 2</summary>
    <published>2024-05-09T12:00:00Z</published>
    <author><name>Author 3</name></author>
  </entry>
</feed>"#;
        let items = parse_feed(xml, 1).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Paper 1");
    }

    #[test]
    fn parse_feed_rejects_garbage() {
        assert!(parse_feed("not xml at all", 5).is_err());
    }
}
