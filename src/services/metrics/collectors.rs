use std::sync::Arc;

use super::MetricsRegistry;

/// Collector for account lifecycle metrics
pub struct AuthMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl AuthMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    /// `outcome` is one of `success`, `rejected` (client error) or `error`.
    pub fn record_event(&self, event: &str, outcome: &str) {
        self.metrics
            .auth_events_total
            .with_label_values(&[event, outcome])
            .inc();
    }
}

/// Collector for geo search metrics
pub struct SearchMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl SearchMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_search(&self, kind: &str, returned: usize) {
        self.metrics
            .place_searches_total
            .with_label_values(&[kind])
            .inc();

        self.metrics
            .place_search_results
            .with_label_values(&[kind])
            .observe(returned as f64);
    }
}
