use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;
use crate::types::Result;
use std::sync::Arc;
use tracing::info;

/// Persists snapshots, one record per date.
pub struct SnapshotWriter {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotWriter {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Serialize `snapshot` and store it under its date, replacing any record
    /// already written for that date. Returns where the record landed.
    ///
    /// Storage errors are returned as-is; nothing is retried.
    pub async fn write(&self, snapshot: &Snapshot) -> Result<String> {
        let key = snapshot.key();
        let record = snapshot.to_json()?;

        self.store.ensure_location().await?;
        let location = self.store.put(&key, &record).await?;

        info!(
            "Saved snapshot {} ({} articles) to {}",
            key,
            snapshot.total_articles(),
            location
        );
        Ok(location)
    }
}
