use crate::aggregator::{CategoryAggregator, CategoryReport};
use crate::config::HarvestConfig;
use crate::fetcher::FeedFetcher;
use crate::retention::{RetentionSweeper, SweepReport};
use crate::snapshot::Snapshot;
use crate::store::{FsSnapshotStore, SnapshotStore};
use crate::transport::{FeedTransport, HttpFeedTransport};
use crate::types::Result;
use crate::writer::SnapshotWriter;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What one run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub snapshot: Snapshot,
    pub location: String,
    pub category_counts: Vec<(String, usize)>,
    pub total_articles: usize,
    pub failed_sources: Vec<String>,
    pub sweep: SweepReport,
}

impl RunReport {
    pub fn log_summary(&self) {
        info!("Run summary for {}", self.snapshot.key());
        for (category, count) in &self.category_counts {
            info!("  {}: {} articles", category, count);
        }
        info!("  total: {} articles", self.total_articles);
        if !self.failed_sources.is_empty() {
            info!("  failed sources: {}", self.failed_sources.join(", "));
        }
        info!("  old snapshots deleted: {}", self.sweep.deleted_count());
    }
}

/// Runs every configured category once, stores the snapshot and prunes
/// old ones.
pub struct HarvestPipeline {
    config: HarvestConfig,
    aggregator: CategoryAggregator,
    writer: SnapshotWriter,
    sweeper: RetentionSweeper,
}

impl HarvestPipeline {
    pub fn builder(config: HarvestConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.run_at(Utc::now().with_timezone(&self.config.timezone)).await
    }

    /// Run with a fixed clock. `now` supplies both the snapshot date and its
    /// `updated_at` timestamp.
    pub async fn run_at(&self, now: DateTime<Tz>) -> Result<RunReport> {
        let today = now.date_naive();
        info!("Starting run at {}", now.to_rfc3339());

        let mut reports: Vec<CategoryReport> = Vec::with_capacity(self.config.categories.len());
        for category in &self.config.categories {
            let report = self
                .aggregator
                .aggregate(category, self.config.max_articles_per_category, today)
                .await;
            reports.push(report);
        }

        let category_counts: Vec<(String, usize)> = reports
            .iter()
            .map(|r| (r.result.category.clone(), r.result.len()))
            .collect();
        let failed_sources: Vec<String> = reports
            .iter()
            .flat_map(|r| r.failed_sources.iter().cloned())
            .collect();

        let snapshot = Snapshot::new(
            now.fixed_offset(),
            reports.into_iter().map(|r| r.result).collect(),
        );
        let total_articles = snapshot.total_articles();

        let location = self.writer.write(&snapshot).await?;
        let sweep = self.sweeper.sweep(today).await;

        Ok(RunReport {
            snapshot,
            location,
            category_counts,
            total_articles,
            failed_sources,
            sweep,
        })
    }
}

/// Builder for [`HarvestPipeline`]. The HTTP transport and a filesystem
/// store rooted at `data_dir` are used unless others are supplied.
pub struct PipelineBuilder {
    config: HarvestConfig,
    transport: Option<Arc<dyn FeedTransport>>,
    store: Option<Arc<dyn SnapshotStore>>,
}

impl PipelineBuilder {
    pub fn new(config: HarvestConfig) -> Self {
        Self {
            config,
            transport: None,
            store: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn FeedTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<HarvestPipeline> {
        let config = self.config;
        config.validate()?;

        let transport: Arc<dyn FeedTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpFeedTransport::new(&config.fetch)?),
        };
        let store: Arc<dyn SnapshotStore> = match self.store {
            Some(store) => store,
            None => Arc::new(FsSnapshotStore::new(config.data_dir.clone())),
        };

        let fetcher = FeedFetcher::new(
            transport,
            Duration::from_secs(config.fetch.timeout_seconds),
            config.max_summary_length,
        );
        let aggregator = CategoryAggregator::new(fetcher).with_concurrent_fetches(config.concurrent_fetches);

        Ok(HarvestPipeline {
            aggregator,
            writer: SnapshotWriter::new(store.clone()),
            sweeper: RetentionSweeper::new(store, config.keep_days),
            config,
        })
    }
}
