// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for order submission
// ============================================================================
//
// - Submission outcomes and latency
// - Failure kinds, split by whether the customer was already charged
// - Funds transfer outcomes
// - Dropped customer notifications
//
// Each Metrics owns its Registry; nothing is registered globally.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub order_submissions: IntCounterVec,
    pub order_submission_failures: IntCounterVec,
    pub order_submission_duration: Histogram,
    pub funds_transfers: IntCounterVec,
    pub notifications_failed: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let order_submissions = IntCounterVec::new(
            Opts::new("order_submissions_total", "Order submissions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(order_submissions.clone()))?;

        let order_submission_failures = IntCounterVec::new(
            Opts::new(
                "order_submission_failures_total",
                "Failed order submissions by failure kind",
            ),
            &["kind", "funds_captured"],
        )?;
        registry.register(Box::new(order_submission_failures.clone()))?;

        let order_submission_duration = Histogram::with_opts(
            HistogramOpts::new(
                "order_submission_duration_seconds",
                "End-to-end order submission duration",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(order_submission_duration.clone()))?;

        let funds_transfers = IntCounterVec::new(
            Opts::new("funds_transfers_total", "Funds transfer calls by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(funds_transfers.clone()))?;

        let notifications_failed = IntCounter::new(
            "notifications_failed_total",
            "Customer notifications that could not be sent",
        )?;
        registry.register(Box::new(notifications_failed.clone()))?;

        Ok(Self {
            registry,
            order_submissions,
            order_submission_failures,
            order_submission_duration,
            funds_transfers,
            notifications_failed,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_submitted(&self, elapsed_secs: f64) {
        self.order_submissions.with_label_values(&["submitted"]).inc();
        self.order_submission_duration.observe(elapsed_secs);
    }

    pub fn record_failed(&self, kind: &str, funds_captured: bool, elapsed_secs: f64) {
        self.order_submissions.with_label_values(&["failed"]).inc();
        self.order_submission_failures
            .with_label_values(&[kind, if funds_captured { "true" } else { "false" }])
            .inc();
        self.order_submission_duration.observe(elapsed_secs);
    }

    pub fn record_funds_transfer(&self, outcome: &str) {
        self.funds_transfers.with_label_values(&[outcome]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_submitted(0.2);
        metrics.record_failed("delivery_unavailable", true, 0.3);

        let names: Vec<String> = metrics
            .registry()
            .gather()
            .iter()
            .map(|family| family.name().to_string())
            .collect();

        assert!(names.contains(&"order_submissions_total".to_string()));
        assert!(names.contains(&"order_submission_failures_total".to_string()));
    }

    #[test]
    fn test_failure_labels() {
        let metrics = Metrics::new().unwrap();
        metrics.record_failed("insufficient_stock", true, 0.1);

        let captured = metrics
            .order_submission_failures
            .with_label_values(&["insufficient_stock", "true"])
            .get();
        assert_eq!(captured, 1);
    }
}
