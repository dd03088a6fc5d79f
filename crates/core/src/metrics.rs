//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Remote character API (requests, latency)
//! - Local cache store (lookups, writes)
//! - Pagination controller (cycles, roster size)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Remote API
// =============================================================================

/// Remote API requests by endpoint and result.
pub static REMOTE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "comicvault_remote_requests_total",
            "Total requests to the remote character API",
        ),
        &["endpoint", "result"], // result: "success", "error"
    )
    .unwrap()
});

/// Remote API request duration in seconds.
pub static REMOTE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "comicvault_remote_request_duration_seconds",
            "Duration of remote character API requests",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

// =============================================================================
// Cache
// =============================================================================

/// Cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("comicvault_cache_lookups_total", "Total cache lookups"),
        &["result"], // "hit", "miss", "corrupt", "error"
    )
    .unwrap()
});

/// Cache writes by result.
pub static CACHE_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("comicvault_cache_writes_total", "Total cache writes"),
        &["result"], // "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Pagination
// =============================================================================

/// Pagination cycles by outcome.
pub static PAGINATION_CYCLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "comicvault_pagination_cycles_total",
            "Total load-more requests handled by the pagination controller",
        ),
        &["outcome"], // "fetched", "exhausted", "cache", "failed", "skipped"
    )
    .unwrap()
});

/// Characters currently held in the merged roster.
pub static ROSTER_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "comicvault_roster_characters",
        "Number of characters in the merged roster",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(REMOTE_REQUESTS.clone()),
        Box::new(REMOTE_REQUEST_DURATION.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(CACHE_WRITES.clone()),
        Box::new(PAGINATION_CYCLES.clone()),
        Box::new(ROSTER_SIZE.clone()),
    ]
}
