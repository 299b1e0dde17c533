use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use shared::protocol::RssFeedResponse;
use tracing::{debug, warn};
use url::Url;

use crate::error::SiteClientError;

const SERVICE: &str = "rss2json";
pub const RSS2JSON_ENDPOINT: &str = "https://api.rss2json.com/v1/api.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub feeds: Vec<String>,
    pub max_items: usize,
    pub scroll_speed_px_per_sec: f64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            max_items: 10,
            scroll_speed_px_per_sec: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerEntry {
    pub source: String,
    pub title: String,
    pub link: String,
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerView {
    Empty(String),
    Failed(String),
    Loaded(Vec<TickerEntry>),
}

pub struct RssTicker {
    http: Client,
    endpoint: String,
    config: TickerConfig,
}

impl RssTicker {
    pub fn new(http: Client, config: TickerConfig) -> Self {
        Self::with_endpoint(http, RSS2JSON_ENDPOINT, config)
    }

    pub fn with_endpoint(http: Client, endpoint: impl Into<String>, config: TickerConfig) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            config,
        }
    }

    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    fn endpoint_url(&self) -> Result<Url, SiteClientError> {
        Url::parse(&self.endpoint).map_err(|source| SiteClientError::Url {
            url: self.endpoint.clone(),
            source,
        })
    }

    pub async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<NewsItem>, SiteClientError> {
        let mut url = self.endpoint_url()?;
        url.query_pairs_mut().append_pair("rss_url", feed_url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(SiteClientError::http(SERVICE))?
            .error_for_status()
            .map_err(SiteClientError::http(SERVICE))?
            .json::<RssFeedResponse>()
            .await
            .map_err(SiteClientError::http(SERVICE))?;

        if response.status != "ok" {
            return Err(SiteClientError::Rejected {
                service: SERVICE,
                message: format!("feed status '{}'", response.status),
            });
        }

        let source = response
            .feed
            .map(|feed| feed.title)
            .filter(|title| !title.trim().is_empty())
            .or_else(|| {
                Url::parse(feed_url)
                    .ok()
                    .and_then(|url| url.host_str().map(str::to_string))
            })
            .unwrap_or_default();

        let items = response
            .items
            .into_iter()
            .filter_map(|item| {
                let Some(published) = parse_pub_date(&item.pub_date) else {
                    debug!(feed = feed_url, pub_date = %item.pub_date, "dropping item with unreadable date");
                    return None;
                };
                Some(NewsItem {
                    title: item.title,
                    link: item.link,
                    published,
                    source: source.clone(),
                })
            })
            .collect();
        Ok(items)
    }

    /// Fetches every feed concurrently, newest first. Failing feeds are skipped.
    pub async fn load(&self) -> Result<Vec<NewsItem>, SiteClientError> {
        self.endpoint_url()?;

        let results = join_all(self.config.feeds.iter().map(|feed| self.fetch_feed(feed))).await;

        let mut items = Vec::new();
        for (feed, result) in self.config.feeds.iter().zip(results) {
            match result {
                Ok(feed_items) => items.extend(feed_items),
                Err(err) => warn!(feed = %feed, error = %err, "error loading feed"),
            }
        }

        items.sort_by(|a, b| b.published.cmp(&a.published));
        items.truncate(self.config.max_items);
        debug!(count = items.len(), "news items loaded");
        Ok(items)
    }

    pub async fn view(&self, now: DateTime<Utc>) -> TickerView {
        match self.load().await {
            Ok(items) if items.is_empty() => TickerView::Empty("No news items available".into()),
            Ok(items) => TickerView::Loaded(
                items
                    .into_iter()
                    .map(|item| TickerEntry {
                        time_ago: time_ago(item.published, now),
                        source: item.source,
                        title: item.title,
                        link: item.link,
                    })
                    .collect(),
            ),
            Err(err) => {
                warn!(error = %err, "rss feed error");
                TickerView::Failed("Unable to load news feed".into())
            }
        }
    }
}

const INTERVALS: [(&str, i64); 6] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
];

/// "3 hours ago", "1 week ago", or "Just now" under a minute.
pub fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - published).num_seconds();
    for (name, span) in INTERVALS {
        let count = seconds / span;
        if count >= 1 {
            return if count == 1 {
                format!("1 {name} ago")
            } else {
                format!("{count} {name}s ago")
            };
        }
    }
    "Just now".to_string()
}

/// Items are rendered twice for a seamless loop, so one pass covers half the width.
pub fn scroll_duration(rendered_width_px: f64, speed_px_per_sec: f64) -> Duration {
    if speed_px_per_sec <= 0.0 || !rendered_width_px.is_finite() || rendered_width_px <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(rendered_width_px / 2.0 / speed_px_per_sec)
}

/// rss2json reports "2025-03-01 14:05:00" in UTC; raw feeds use RFC 2822.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|dt| dt.to_utc()))
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.to_utc()))
}

#[cfg(test)]
#[path = "tests/rss_tests.rs"]
mod tests;
