use crate::snapshot::DATE_FORMAT;
use crate::store::SnapshotStore;
use chrono::{Days, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: Vec<String>,
    /// Keys left in place, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl SweepReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

/// Deletes snapshots that fell out of the retention window.
pub struct RetentionSweeper {
    store: Arc<dyn SnapshotStore>,
    keep_days: u32,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn SnapshotStore>, keep_days: u32) -> Self {
        Self { store, keep_days }
    }

    /// Oldest date still kept when sweeping on `today`. A window reaching
    /// past the earliest representable date keeps everything.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.keep_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Delete every record whose key parses as a date before the cutoff.
    ///
    /// Keys that are not dates and failed deletions are logged and skipped.
    /// A store that cannot be listed is treated as empty.
    pub async fn sweep(&self, today: NaiveDate) -> SweepReport {
        let cutoff = self.cutoff(today);
        let mut report = SweepReport::default();

        let keys = match self.store.list_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Could not list stored snapshots: {}", e);
                return report;
            }
        };

        for key in keys {
            let record_date = match NaiveDate::parse_from_str(&key, DATE_FORMAT) {
                Ok(date) => date,
                Err(e) => {
                    warn!("Skipping {}: {}", self.store.location(&key), e);
                    report.skipped.push((key, e.to_string()));
                    continue;
                }
            };

            if record_date >= cutoff {
                continue;
            }

            match self.store.delete(&key).await {
                Ok(()) => {
                    info!("Deleted {}", self.store.location(&key));
                    report.deleted.push(key);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", self.store.location(&key), e);
                    report.skipped.push((key, e.to_string()));
                }
            }
        }

        if report.deleted_count() > 0 {
            info!("Deleted {} old snapshots (cutoff {})", report.deleted_count(), cutoff);
        }
        report
    }
}
