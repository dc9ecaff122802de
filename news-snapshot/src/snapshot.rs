//! The dated record persisted once per run.
//!
//! On disk a snapshot is a flat JSON object: `date`, `updated_at`, then one
//! array of articles per category, in configured order.

use crate::types::{Article, CategoryResult, NewsError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Format of snapshot dates and of the keys they are stored under.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DATE_KEY: &str = "date";
pub const UPDATED_AT_KEY: &str = "updated_at";

/// Keys a category may not be named after.
pub const RESERVED_KEYS: [&str; 2] = [DATE_KEY, UPDATED_AT_KEY];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub updated_at: DateTime<FixedOffset>,
    pub categories: Vec<CategoryResult>,
}

impl Snapshot {
    pub fn new(updated_at: DateTime<FixedOffset>, categories: Vec<CategoryResult>) -> Self {
        Self {
            date: updated_at.date_naive(),
            updated_at,
            categories,
        }
    }

    /// The store key for this snapshot: its date.
    pub fn key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn category(&self, name: &str) -> Option<&CategoryResult> {
        self.categories.iter().find(|c| c.category == name)
    }

    pub fn total_articles(&self) -> usize {
        self.categories.iter().map(CategoryResult::len).sum()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Read back a stored record. Every key other than `date` and
    /// `updated_at` is taken as a category.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let record: Map<String, Value> = serde_json::from_slice(bytes)?;

        let mut date = None;
        let mut updated_at = None;
        let mut categories = Vec::new();

        for (key, value) in record {
            match key.as_str() {
                DATE_KEY => {
                    let s = value.as_str().unwrap_or_default();
                    let parsed = NaiveDate::parse_from_str(s, DATE_FORMAT)
                        .map_err(|e| NewsError::Parse(format!("bad snapshot date {:?}: {}", s, e)))?;
                    date = Some(parsed);
                }
                UPDATED_AT_KEY => {
                    let s = value.as_str().unwrap_or_default();
                    let parsed = DateTime::parse_from_rfc3339(s)
                        .map_err(|e| NewsError::Parse(format!("bad updated_at {:?}: {}", s, e)))?;
                    updated_at = Some(parsed);
                }
                _ => {
                    let articles: Vec<Article> = serde_json::from_value(value)?;
                    categories.push(CategoryResult { category: key, articles });
                }
            }
        }

        Ok(Self {
            date: date.ok_or_else(|| NewsError::Parse("snapshot has no date".to_string()))?,
            updated_at: updated_at
                .ok_or_else(|| NewsError::Parse("snapshot has no updated_at".to_string()))?,
            categories,
        })
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.categories.len()))?;
        map.serialize_entry(DATE_KEY, &self.key())?;
        map.serialize_entry(
            UPDATED_AT_KEY,
            &self.updated_at.to_rfc3339_opts(SecondsFormat::Micros, false),
        )?;
        for category in &self.categories {
            map.serialize_entry(&category.category, &category.articles)?;
        }
        map.end()
    }
}
