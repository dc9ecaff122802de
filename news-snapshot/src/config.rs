use crate::snapshot::RESERVED_KEYS;
use crate::types::{Category, FeedSource, FetchConfig, NewsError, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything one harvest run needs to know.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub categories: Vec<Category>,
    pub max_articles_per_category: usize,
    pub max_summary_length: usize,
    pub keep_days: u32,
    pub data_dir: PathBuf,
    /// Zone used for the run's date and `updated_at` timestamp.
    pub timezone: Tz,
    pub concurrent_fetches: bool,
    pub fetch: FetchConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            max_articles_per_category: 10,
            max_summary_length: 150,
            keep_days: 7,
            data_dir: PathBuf::from("data"),
            timezone: chrono_tz::Asia::Tokyo,
            concurrent_fetches: false,
            fetch: FetchConfig::default(),
        }
    }
}

fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "consulting",
            vec![
                FeedSource::new("ITmedia ビジネス", "https://rss.itmedia.co.jp/rss/2.0/bizid.xml"),
                FeedSource::new("東洋経済オンライン", "https://toyokeizai.net/list/feed/rss"),
            ],
        ),
        Category::new(
            "ai",
            vec![
                FeedSource::new("ITmedia AI+", "https://rss.itmedia.co.jp/rss/2.0/aiplus.xml"),
                FeedSource::new("GIGAZINE", "https://gigazine.net/news/rss_2.0/"),
            ],
        ),
        Category::new(
            "poker",
            vec![
                FeedSource::new("PokerNews", "https://www.pokernews.com/news.rss"),
                FeedSource::new("Card Player", "https://www.cardplayer.com/poker-news/rss"),
            ],
        ),
    ]
}

impl HarvestConfig {
    /// Read a JSON config file. Fields missing from the file keep their
    /// defaults; with no path the defaults are used as-is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                let content = std::fs::read_to_string(path)?;
                Self::from_json(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Check the settings a run cannot start without. Source endpoints are
    /// not checked here: a bad one fails only its own source.
    pub fn validate(&self) -> Result<()> {
        if self.max_summary_length == 0 {
            return Err(NewsError::Config("max_summary_length must be positive".to_string()));
        }

        let mut names = HashSet::new();
        for category in &self.categories {
            if category.name.is_empty() {
                return Err(NewsError::Config("category name must not be empty".to_string()));
            }
            if RESERVED_KEYS.contains(&category.name.as_str()) {
                return Err(NewsError::Config(format!(
                    "category name {:?} is reserved",
                    category.name
                )));
            }
            if !names.insert(category.name.as_str()) {
                return Err(NewsError::Config(format!(
                    "category {:?} is configured twice",
                    category.name
                )));
            }
        }

        Ok(())
    }
}
