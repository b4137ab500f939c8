use std::sync::Arc;

use crate::{model::ClaimRecord, service::LeaderboardService, snapshot::SnapshotCell};

/// Holds the last fetched claim history.
///
/// Records are kept in the order received; display order is derived on read.
#[derive(Debug)]
pub struct LedgerStore<S> {
    service: Arc<S>,
    snapshot: SnapshotCell<ClaimRecord>,
}

impl<S> LedgerStore<S> {
    /// Create an empty store.
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            snapshot: Default::default(),
        }
    }

    /// Get the current snapshot, in the order received.
    pub fn snapshot(&self) -> Arc<[ClaimRecord]> {
        self.snapshot.get()
    }

    /// Returns whether a refresh has ever succeeded.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_loaded()
    }

    /// Get the current snapshot, most recent first.
    pub fn chronological(&self) -> Vec<ClaimRecord> {
        most_recent_first(&self.snapshot())
    }
}

impl<S: LeaderboardService> LedgerStore<S> {
    /// Fetch the history and replace the snapshot.
    pub async fn refresh(&self) -> crate::Result<()> {
        let history = self.service.history().await?;
        tracing::debug!(records = history.len(), "ledger refreshed");
        self.snapshot.replace(history);
        Ok(())
    }
}

/// Sort by timestamp, most recent first.
///
/// Records with equal timestamps keep their relative order.
pub fn most_recent_first(records: &[ClaimRecord]) -> Vec<ClaimRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}
