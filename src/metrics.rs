// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Loopia webhook solver.
//!
//! This module provides metrics collection with the namespace prefix
//! `loopia_webhook_`.
//!
//! # Metrics Categories
//!
//! - **Challenge Metrics** - Track `Present`/`CleanUp` calls and their outcomes
//! - **Record Metrics** - Track mutations made against the zone record store
//! - **Error Metrics** - Track failures by operation and status reason
//!
//! # Example
//!
//! ```rust,no_run
//! use loopia_webhook::metrics::record_challenge_success;
//!
//! // Record a successful present
//! record_challenge_success("present", std::time::Duration::from_millis(350));
//! ```

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all webhook metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "loopia_webhook";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Challenge Metrics
// ============================================================================

/// Total number of challenge operations by operation and status
///
/// Labels:
/// - `operation`: `present` or `cleanup`
/// - `status`: Outcome (`success`, `error`)
pub static CHALLENGE_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_challenge_operations_total"),
        "Total number of challenge operations by operation and status",
    );
    let counter = CounterVec::new(opts, &["operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of challenge operations in seconds
///
/// Labels:
/// - `operation`: `present` or `cleanup`
pub static CHALLENGE_OPERATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_challenge_operation_duration_seconds"),
        "Duration of challenge operations in seconds by operation",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Record Metrics
// ============================================================================

/// Total number of challenge TXT records created
pub static RECORDS_CREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_records_created_total"),
        "Total number of challenge TXT records created",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of challenge TXT records deleted
pub static RECORDS_DELETED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_records_deleted_total"),
        "Total number of challenge TXT records deleted",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of emptied challenge subdomains removed
pub static SUBDOMAINS_REMOVED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_subdomains_removed_total"),
        "Total number of emptied challenge subdomains removed",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by operation and status reason
///
/// Labels:
/// - `operation`: `present` or `cleanup`
/// - `reason`: Status reason (e.g. `SecretKeyMissing`, `RecordCreateFailed`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by operation and status reason",
    );
    let counter = CounterVec::new(opts, &["operation", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful challenge operation
///
/// # Arguments
/// * `operation` - `present` or `cleanup`
/// * `duration` - Duration of the operation
pub fn record_challenge_success(operation: &str, duration: Duration) {
    CHALLENGE_OPERATIONS_TOTAL
        .with_label_values(&[operation, "success"])
        .inc();
    CHALLENGE_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record a failed challenge operation
///
/// # Arguments
/// * `operation` - `present` or `cleanup`
/// * `reason` - Status reason of the failure
/// * `duration` - Duration of the operation before failure
pub fn record_challenge_error(operation: &str, reason: &str, duration: Duration) {
    CHALLENGE_OPERATIONS_TOTAL
        .with_label_values(&[operation, "error"])
        .inc();
    CHALLENGE_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
    record_error(operation, reason);
}

/// Record an error that did not fail the operation
pub fn record_error(operation: &str, reason: &str) {
    ERRORS_TOTAL.with_label_values(&[operation, reason]).inc();
}

/// Record creation of a challenge TXT record
pub fn record_txt_created() {
    RECORDS_CREATED_TOTAL.inc();
}

/// Record deletion of a challenge TXT record
pub fn record_txt_deleted() {
    RECORDS_DELETED_TOTAL.inc();
}

/// Record removal of an emptied subdomain
pub fn record_subdomain_removed() {
    SUBDOMAINS_REMOVED_TOTAL.inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
