use crate::text;
use crate::transport::{FeedTransport, RawEntry};
use crate::types::{Article, FeedSource, NewsError};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Title used for entries that carry none.
pub const UNTITLED: &str = "Untitled";

/// Outcome of fetching one source. A failed fetch carries no articles.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub source: String,
    pub endpoint: String,
    pub articles: Vec<Article>,
    pub error: Option<String>,
    pub http_status: Option<u16>,
    pub response_time_ms: u64,
}

impl FetchReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct FeedFetcher {
    transport: Arc<dyn FeedTransport>,
    timeout: Duration,
    max_summary_length: usize,
}

impl FeedFetcher {
    pub fn new(transport: Arc<dyn FeedTransport>, timeout: Duration, max_summary_length: usize) -> Self {
        Self {
            transport,
            timeout,
            max_summary_length,
        }
    }

    /// Fetch one source and turn its entries into articles.
    ///
    /// Never fails: transport errors, timeouts and HTTP error statuses are
    /// logged and reported with an empty article list. `today` stands in for
    /// entries without any timestamp.
    pub async fn fetch(&self, source: &FeedSource, today: NaiveDate) -> FetchReport {
        let start_time = Instant::now();
        let mut report = FetchReport {
            source: source.name.clone(),
            endpoint: source.url.clone(),
            articles: Vec::new(),
            error: None,
            http_status: None,
            response_time_ms: 0,
        };

        info!("Fetching feed: {} ({})", source.name, source.url);

        let retrieved = tokio::time::timeout(self.timeout, self.transport.retrieve(&source.url))
            .await
            .unwrap_or(Err(NewsError::Timeout(self.timeout)));
        report.response_time_ms = start_time.elapsed().as_millis() as u64;

        let feed = match retrieved {
            Ok(feed) => feed,
            Err(e) => {
                warn!("Failed to fetch {}: {}", source.name, e);
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.http_status = feed.status;

        if let Some(status) = feed.status.filter(|s| *s >= 400) {
            warn!("Feed {} returned HTTP {}", source.name, status);
            report.error = Some(format!("HTTP status {}", status));
            return report;
        }

        if let Some(reason) = &feed.malformed {
            warn!("Feed {} is malformed, reading salvaged entries: {}", source.name, reason);
        }

        let total = feed.entries.len();
        report.articles = feed
            .entries
            .into_iter()
            .filter_map(|entry| self.build_article(entry, source, today))
            .collect();

        let skipped = total - report.articles.len();
        if skipped > 0 {
            debug!("Skipped {} entries without a link in {}", skipped, source.name);
        }
        info!(
            "Fetched {} articles from {} in {}ms",
            report.articles.len(),
            source.name,
            report.response_time_ms
        );

        report
    }

    fn build_article(&self, entry: RawEntry, source: &FeedSource, today: NaiveDate) -> Option<Article> {
        let url = entry.link.filter(|link| !link.is_empty())?;

        let date = entry
            .published
            .or(entry.updated)
            .map(|timestamp| timestamp.date())
            .unwrap_or(today);

        let summary = entry
            .summary
            .filter(|s| !s.is_empty())
            .or(entry.description);

        Some(Article {
            title: entry.title.unwrap_or_else(|| UNTITLED.to_string()),
            source: source.name.clone(),
            date,
            summary: text::normalize_opt(summary.as_deref(), self.max_summary_length),
            url,
        })
    }
}
