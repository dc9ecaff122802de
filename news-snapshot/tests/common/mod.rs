// Shared helpers for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use news_snapshot::{Article, Category, FeedSource, FeedTransport, NewsError, RawEntry, RawFeed, Result};
use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// How a fake endpoint answers.
#[derive(Clone)]
pub enum FakeResponse {
    Feed(RawFeed),
    Fail(String),
    Hang(Duration),
}

/// Transport serving canned responses per endpoint and recording calls.
#[derive(Default)]
pub struct FakeTransport {
    responses: HashMap<String, FakeResponse>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(mut self, endpoint: &str, entries: Vec<RawEntry>) -> Self {
        self.responses
            .insert(endpoint.to_string(), FakeResponse::Feed(RawFeed::with_entries(entries)));
        self
    }

    pub fn raw(mut self, endpoint: &str, feed: RawFeed) -> Self {
        self.responses.insert(endpoint.to_string(), FakeResponse::Feed(feed));
        self
    }

    pub fn fail(mut self, endpoint: &str, reason: &str) -> Self {
        self.responses
            .insert(endpoint.to_string(), FakeResponse::Fail(reason.to_string()));
        self
    }

    pub fn hang(mut self, endpoint: &str, delay: Duration) -> Self {
        self.responses.insert(endpoint.to_string(), FakeResponse::Hang(delay));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedTransport for FakeTransport {
    async fn retrieve(&self, endpoint: &str) -> Result<RawFeed> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        match self.responses.get(endpoint) {
            Some(FakeResponse::Feed(feed)) => Ok(feed.clone()),
            Some(FakeResponse::Fail(reason)) => Err(NewsError::General(reason.clone())),
            Some(FakeResponse::Hang(delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(RawFeed::default())
            }
            None => Err(NewsError::General(format!("no such endpoint: {}", endpoint))),
        }
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// An entry with a link, a title and a published timestamp at noon.
pub fn entry(link: &str, published: &str) -> RawEntry {
    RawEntry {
        title: Some(format!("Title for {}", link)),
        link: Some(link.to_string()),
        summary: Some(format!("Summary for {}", link)),
        description: None,
        published: Some(timestamp(&format!("{} 12:00:00", published))),
        updated: None,
    }
}

pub fn article(url: &str, on: &str) -> Article {
    Article {
        title: format!("Title for {}", url),
        source: "Test".to_string(),
        date: date(on),
        summary: String::new(),
        url: url.to_string(),
    }
}

pub fn source(name: &str) -> FeedSource {
    FeedSource::new(name, format!("https://{}.example.com/rss", name))
}

pub fn category(name: &str, sources: &[&str]) -> Category {
    Category::new(name, sources.iter().map(|s| source(s)).collect())
}

pub fn urls(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.url.as_str()).collect()
}
