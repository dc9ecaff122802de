use crate::fetcher::{FeedFetcher, FetchReport};
use crate::types::{Article, Category, CategoryResult};
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, info};

/// Per-category outcome of one run.
#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub result: CategoryResult,
    /// Articles gathered across all sources before dedupe.
    pub fetched: usize,
    pub duplicates: usize,
    pub failed_sources: Vec<String>,
}

pub struct CategoryAggregator {
    fetcher: FeedFetcher,
    concurrent: bool,
}

impl CategoryAggregator {
    pub fn new(fetcher: FeedFetcher) -> Self {
        Self {
            fetcher,
            concurrent: false,
        }
    }

    /// Fetch a category's sources at the same time instead of one by one.
    /// Results are still consumed in declared source order.
    pub fn with_concurrent_fetches(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub async fn aggregate(&self, category: &Category, max_count: usize, today: NaiveDate) -> CategoryReport {
        info!("[{}] Fetching {} sources", category.name, category.sources.len());

        let reports: Vec<FetchReport> = if self.concurrent {
            join_all(category.sources.iter().map(|source| self.fetcher.fetch(source, today))).await
        } else {
            let mut reports = Vec::with_capacity(category.sources.len());
            for source in &category.sources {
                reports.push(self.fetcher.fetch(source, today).await);
            }
            reports
        };

        let failed_sources: Vec<String> = reports
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.source.clone())
            .collect();

        let gathered: Vec<Article> = reports.into_iter().flat_map(|r| r.articles).collect();
        let fetched = gathered.len();

        let unique = dedupe_by_url(gathered);
        let duplicates = fetched - unique.len();
        let unique_count = unique.len();
        let articles = rank_and_truncate(unique, max_count);

        if duplicates > 0 {
            debug!("[{}] Dropped {} duplicate URLs", category.name, duplicates);
        }
        info!(
            "[{}] Total: {} articles, limited to {}",
            category.name,
            unique_count,
            articles.len()
        );

        CategoryReport {
            result: CategoryResult {
                category: category.name.clone(),
                articles,
            },
            fetched,
            duplicates,
            failed_sources,
        }
    }
}

/// Keep the first article seen for each URL, preserving input order.
pub fn dedupe_by_url(articles: Vec<Article>) -> Vec<Article> {
    let mut seen_urls = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen_urls.insert(article.url.clone()))
        .collect()
}

/// Order newest first and keep at most `max_count` articles. Articles with
/// the same date keep their relative input order.
pub fn rank_and_truncate(mut articles: Vec<Article>, max_count: usize) -> Vec<Article> {
    // sort_by is stable
    articles.sort_by(|a, b| b.date.cmp(&a.date));
    articles.truncate(max_count);
    articles
}
