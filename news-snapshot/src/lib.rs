pub mod types;
pub mod text;
pub mod transport;
pub mod fetcher;
pub mod aggregator;
pub mod snapshot;
pub mod store;
pub mod writer;
pub mod retention;
pub mod config;
pub mod pipeline;

pub use types::*;
pub use transport::{FeedTransport, HttpFeedTransport, RawEntry, RawFeed};
pub use fetcher::{FeedFetcher, FetchReport};
pub use aggregator::{CategoryAggregator, CategoryReport};
pub use snapshot::Snapshot;
pub use store::{FsSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use writer::SnapshotWriter;
pub use retention::{RetentionSweeper, SweepReport};
pub use config::HarvestConfig;
pub use pipeline::{HarvestPipeline, PipelineBuilder, RunReport};
