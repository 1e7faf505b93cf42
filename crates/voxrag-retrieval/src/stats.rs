use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide retrieval counters.
///
/// Every query ends in exactly one bucket, so the buckets sum to `queries`.
#[derive(Debug, Default)]
pub struct RetrievalStats {
    queries: AtomicU64,
    matched: AtomicU64,
    no_match: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`RetrievalStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub queries: u64,
    pub matched: u64,
    pub no_match: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl RetrievalStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_matched(&self) {
        self.bump(&self.matched);
    }

    pub(crate) fn record_no_match(&self) {
        self.bump(&self.no_match);
    }

    pub(crate) fn record_skipped(&self) {
        self.bump(&self.skipped);
    }

    pub(crate) fn record_failed(&self) {
        self.bump(&self.failed);
    }

    fn bump(&self, bucket: &AtomicU64) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            queries: self.queries.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            no_match: self.no_match.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
