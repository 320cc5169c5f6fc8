// src/fetch/mod.rs
pub mod arxiv;
pub mod reddit;

use chrono::{DateTime, Duration, Utc};
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// One-time metrics registration for the fetch layer.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_items_total", "Items parsed from upstream sources.");
        describe_counter!(
            "fetch_dropped_total",
            "Items dropped by the client-side trailing-window re-filter."
        );
        describe_counter!("fetch_errors_total", "Upstream fetch/parse errors.");
        describe_histogram!("fetch_parse_ms", "Upstream response parse time in milliseconds.");
    });
}

/// One normalized paper or post, ready for the summarizer to cite by URL.
///
/// Built fresh on every fetch call; never cached or mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceItem {
    pub title: String,
    pub url: String,
    /// Abstract for arXiv papers, selftext for Reddit posts (empty for link posts).
    pub body: String,
    /// arXiv only: author display names joined with `", "` in API order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    /// Reddit only: upstream ranking score for the period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    /// Publication instant as `YYYY-MM-DD HH:MM:SS UTC`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Coarse upstream time bucket for Reddit "top" listings.
///
/// Only controls what upstream returns; the strict 7-day re-filter in
/// [`reddit::RedditFetcher`] applies regardless of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl Default for TimeFilter {
    fn default() -> Self {
        TimeFilter::Week
    }
}

impl std::str::FromStr for TimeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hour" => Ok(TimeFilter::Hour),
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            other => Err(anyhow::anyhow!("unknown time filter: {other}")),
        }
    }
}

impl std::fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive trailing window `[now - days, now]`.
pub fn trailing_window(now: DateTime<Utc>, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::days(days), now)
}

/// Strict cutoff for the fixed 7-day re-filter: items at or before this
/// instant are discarded.
pub fn week_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(7)
}

/// Render a publication instant the way downstream consumers expect it.
pub(crate) fn format_created(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Normalize display text: decode HTML entities, fold whitespace, trim.
/// arXiv hard-wraps titles and abstracts; Reddit titles carry entities.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalize_folds_wrapped_lines_and_entities() {
        let s = "Scaling Laws\n  for &amp; Beyond\t Transformers ";
        assert_eq!(normalize_text(s), "Scaling Laws for & Beyond Transformers");
    }

    #[test]
    fn normalize_empty_is_ok() {
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn trailing_window_spans_exactly_n_days() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let (start, end) = trailing_window(now, 7);
        assert_eq!(end, now);
        assert_eq!(end - start, Duration::days(7));
    }

    #[test]
    fn week_cutoff_matches_window_start() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        assert_eq!(week_cutoff(now), trailing_window(now, 7).0);
    }

    #[test]
    fn time_filter_round_trips_wire_spelling() {
        for (s, tf) in [
            ("hour", TimeFilter::Hour),
            ("day", TimeFilter::Day),
            ("week", TimeFilter::Week),
            ("month", TimeFilter::Month),
            ("year", TimeFilter::Year),
            ("all", TimeFilter::All),
        ] {
            assert_eq!(s.parse::<TimeFilter>().unwrap(), tf);
            assert_eq!(tf.as_str(), s);
        }
        assert!("fortnight".parse::<TimeFilter>().is_err());
    }
}
