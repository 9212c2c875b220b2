//! Prometheus metrics for the gateway.
//!
//! - Authentication outcomes, split by mandatory/optional route mode
//! - Guard rejections by error code
//! - Completion requests and their latency

mod helpers;

pub use helpers::{encode_metrics, AuthMetrics, CompletionMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "gateway";

lazy_static! {
    /// Authentication attempts by mode and outcome
    pub static ref AUTH_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_auth_requests_total", METRIC_PREFIX),
        "Authentication attempts by mode and outcome",
        &["mode", "outcome"]
    ).unwrap();

    /// Requests stopped by a route guard
    pub static ref GUARD_REJECTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_guard_rejections_total", METRIC_PREFIX),
        "Requests rejected by route guards",
        &["code"]
    ).unwrap();

    /// Completion requests by result
    pub static ref COMPLETION_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_completion_requests_total", METRIC_PREFIX),
        "Completion requests by result",
        &["status"]
    ).unwrap();

    /// End-to-end answer latency (retrieval plus completion)
    pub static ref COMPLETION_DURATION: Histogram = register_histogram!(
        format!("{}_completion_duration_seconds", METRIC_PREFIX),
        "Time spent producing an answer",
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();
}
