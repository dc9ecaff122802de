use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single harvested article as it appears in a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub source: String,
    pub date: NaiveDate,
    pub summary: String,
    /// Deduplication key within a category; never empty.
    pub url: String,
}

/// One configured feed: a display name and the endpoint it is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A named, ordered group of feed sources ranked together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub sources: Vec<FeedSource>,
}

impl Category {
    pub fn new(name: impl Into<String>, sources: Vec<FeedSource>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }
}

/// Ranked articles for one category, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryResult {
    pub category: String,
    pub articles: Vec<Article>,
}

impl CategoryResult {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "news-snapshot/0.1".to_string(),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Invalid record key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;
