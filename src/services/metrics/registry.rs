use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Central metrics registry for the marketplace API
pub struct MetricsRegistry {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Auth Metrics
    pub auth_events_total: CounterVec,

    // Search Metrics
    pub place_searches_total: CounterVec,
    pub place_search_results: HistogramVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        // HTTP Metrics
        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests").namespace("karnya"),
            &["method", "endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request duration")
                .namespace("karnya")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        // Auth Metrics
        let auth_events_total = CounterVec::new(
            Opts::new("auth_events_total", "Account lifecycle operations by outcome")
                .namespace("karnya"),
            &["event", "outcome"],
        )?;
        registry.register(Box::new(auth_events_total.clone()))?;

        // Search Metrics
        let place_searches_total = CounterVec::new(
            Opts::new("place_searches_total", "Geo searches served").namespace("karnya"),
            &["kind"],
        )?;
        registry.register(Box::new(place_searches_total.clone()))?;

        let place_search_results = HistogramVec::new(
            HistogramOpts::new("place_search_results", "Records returned per search page")
                .namespace("karnya")
                .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
            &["kind"],
        )?;
        registry.register(Box::new(place_search_results.clone()))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            auth_events_total,
            place_searches_total,
            place_search_results,
        }))
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
