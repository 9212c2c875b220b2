//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    AUTH_REQUESTS_TOTAL, COMPLETION_DURATION, COMPLETION_REQUESTS_TOTAL, GUARD_REJECTIONS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

pub struct AuthMetrics;

impl AuthMetrics {
    /// Record an authentication attempt (`mode` is "required" or "optional")
    pub fn record(mode: &str, outcome: &str) {
        AUTH_REQUESTS_TOTAL.with_label_values(&[mode, outcome]).inc();
    }

    pub fn record_guard_rejection(code: &str) {
        GUARD_REJECTIONS_TOTAL.with_label_values(&[code]).inc();
    }
}

pub struct CompletionMetrics;

impl CompletionMetrics {
    pub fn record_success(duration_secs: f64) {
        COMPLETION_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();
        COMPLETION_DURATION.observe(duration_secs);
    }

    pub fn record_failure() {
        COMPLETION_REQUESTS_TOTAL.with_label_values(&["error"]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_metrics_are_exported() {
        AuthMetrics::record("required", "authenticated");
        AuthMetrics::record_guard_rejection("insufficient_tier");

        let output = encode_metrics().unwrap();
        assert!(output.contains("gateway_auth_requests_total"));
        assert!(output.contains("gateway_guard_rejections_total"));
    }

    #[test]
    fn test_completion_metrics() {
        CompletionMetrics::record_success(0.42);
        CompletionMetrics::record_failure();
        // Just verify no panics
    }
}
