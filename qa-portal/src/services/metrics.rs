use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Process-wide Prometheus collectors.
pub struct PortalMetrics {
    registry: Registry,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub generate_requests_total: IntCounterVec,
}

static METRICS: OnceLock<PortalMetrics> = OnceLock::new();

impl PortalMetrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;

        let generate_requests_total = IntCounterVec::new(
            Opts::new(
                "generate_requests_total",
                "Generate calls by answering model and outcome",
            ),
            &["model", "outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(generate_requests_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            generate_requests_total,
        })
    }
}

/// Collectors, registered on first use.
pub fn metrics() -> &'static PortalMetrics {
    METRICS.get_or_init(|| {
        // Fixed metric names and label sets; construction only fails on a
        // programming error.
        PortalMetrics::new().expect("metric definitions are valid")
    })
}

pub fn record_generate(model: &str, outcome: &str) {
    metrics()
        .generate_requests_total
        .with_label_values(&[model, outcome])
        .inc();
}

/// Text exposition of every registered collector.
pub fn get_metrics() -> Result<String, anyhow::Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = metrics().registry.gather();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
