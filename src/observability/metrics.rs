//! Operation counters for mockbase
//!
//! - Counters only, monotonic
//! - One registry per engine, reset only by building a new one
//! - Relaxed atomics; counts are exact once calls have returned

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for every engine operation
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    queries_resolved: AtomicU64,
    rows_inserted: AtomicU64,
    rows_updated: AtomicU64,
    rows_deleted: AtomicU64,
    upserts: AtomicU64,
    faults_injected: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub queries_resolved: u64,
    pub rows_inserted: u64,
    pub rows_updated: u64,
    pub rows_deleted: u64,
    pub upserts: u64,
    pub faults_injected: u64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_resolved(&self) {
        self.queries_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_inserted(&self, rows: u64) {
        self.rows_inserted.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn add_rows_updated(&self, rows: u64) {
        self.rows_updated.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn add_rows_deleted(&self, rows: u64) {
        self.rows_deleted.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_upserts(&self) {
        self.upserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_faults_injected(&self) {
        self.faults_injected.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_resolved: self.queries_resolved.load(Ordering::Relaxed),
            rows_inserted: self.rows_inserted.load(Ordering::Relaxed),
            rows_updated: self.rows_updated.load(Ordering::Relaxed),
            rows_deleted: self.rows_deleted.load(Ordering::Relaxed),
            upserts: self.upserts.load(Ordering::Relaxed),
            faults_injected: self.faults_injected.load(Ordering::Relaxed),
        }
    }
}
