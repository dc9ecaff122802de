use crate::types::{FetchConfig, NewsError, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use feed_rs::parser;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::debug;
use url::Url;

/// What a feed endpoint yielded, before any normalization.
#[derive(Debug, Clone, Default)]
pub struct RawFeed {
    /// HTTP status reported by the transport, if there was one.
    pub status: Option<u16>,
    /// Set when the document could not be parsed cleanly.
    pub malformed: Option<String>,
    /// Entries that could be read, possibly salvaged from a malformed document.
    pub entries: Vec<RawEntry>,
}

impl RawFeed {
    pub fn with_entries(entries: Vec<RawEntry>) -> Self {
        Self {
            status: Some(200),
            malformed: None,
            entries,
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            malformed: None,
            entries: Vec::new(),
        }
    }
}

/// One feed item as the parser sees it. Timestamps carry no zone: they are
/// normalized to UTC by the parser and the offset is dropped.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub published: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
}

/// The network-facing boundary: turn an endpoint into raw entries.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn retrieve(&self, endpoint: &str) -> Result<RawFeed>;
}

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Fetches feeds over HTTP and parses them with feed-rs.
///
/// Endpoints that are not URLs, and `file://` URLs, are read from the local
/// filesystem. Any other scheme fails the source.
pub struct HttpFeedTransport {
    client: Client,
    max_feed_bytes: u64,
}

impl HttpFeedTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self {
            client,
            max_feed_bytes: (config.max_feed_size_mb as u64).saturating_mul(BYTES_PER_MB),
        })
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_feed_bytes {
            return Err(NewsError::FeedTooLarge {
                size_mb: size.div_ceil(BYTES_PER_MB) as usize,
            });
        }
        Ok(())
    }

    async fn retrieve_http(&self, url: Url) -> Result<RawFeed> {
        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            return Ok(RawFeed::with_status(status.as_u16()));
        }

        if let Some(content_length) = response.content_length() {
            self.check_size(content_length)?;
        }

        // Content-Length may be absent; the cap also applies while streaming.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            self.check_size((body.len() + chunk.len()) as u64)?;
            body.extend_from_slice(&chunk);
        }
        debug!("Fetched {} bytes from {}", body.len(), url);

        let mut feed = parse_document(&body);
        feed.status = Some(status.as_u16());
        Ok(feed)
    }

    async fn retrieve_file(&self, path: &Path) -> Result<RawFeed> {
        let metadata = fs::metadata(path).await?;
        self.check_size(metadata.len())?;

        let body = fs::read(path).await?;
        self.check_size(body.len() as u64)?;
        debug!("Read {} bytes from {}", body.len(), path.display());

        Ok(parse_document(&body))
    }
}

#[async_trait]
impl FeedTransport for HttpFeedTransport {
    async fn retrieve(&self, endpoint: &str) -> Result<RawFeed> {
        match Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => self.retrieve_http(url).await,
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| {
                    NewsError::General(format!("{} does not name a local file", endpoint))
                })?;
                self.retrieve_file(&path).await
            }
            Ok(url) => Err(NewsError::General(format!(
                "unsupported feed scheme {:?} in {}",
                url.scheme(),
                endpoint
            ))),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.retrieve_file(Path::new(endpoint)).await
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Parse an RSS, Atom or JSON Feed document.
///
/// A document feed-rs rejects comes back flagged as malformed with no
/// entries rather than as an error.
pub fn parse_document(content: &[u8]) -> RawFeed {
    match parser::parse(content) {
        Ok(feed) => RawFeed {
            status: None,
            malformed: None,
            entries: feed.entries.into_iter().map(RawEntry::from).collect(),
        },
        Err(e) => RawFeed {
            status: None,
            malformed: Some(e.to_string()),
            entries: Vec::new(),
        },
    }
}

impl From<feed_rs::model::Entry> for RawEntry {
    fn from(entry: feed_rs::model::Entry) -> Self {
        // Prefer the alternate link, which is what readers open.
        let link = entry
            .links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| entry.links.first())
            .map(|l| l.href.trim().to_string())
            .filter(|href| !href.is_empty());

        Self {
            title: entry.title.map(|t| t.content),
            link,
            summary: entry.summary.map(|s| s.content),
            description: entry.content.and_then(|c| c.body),
            published: entry.published.map(|dt| dt.naive_utc()),
            updated: entry.updated.map(|dt| dt.naive_utc()),
        }
    }
}
