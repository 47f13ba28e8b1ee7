// Prometheus metrics for authord monitoring
//
// Exposed on the /metrics endpoint of the main router:
// - Requests by action (counter)
// - Rejections by reason (counter)
// - Stored record count (gauge)

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

lazy_static! {
    pub static ref REGISTRY: Arc<Registry> = Arc::new(Registry::new());

    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new("http_requests_total", "Total requests received, by action"),
        &["action"]
    ).expect("Failed to create request counter");

    pub static ref REQUESTS_REJECTED_TOTAL: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new("requests_rejected_total", "Total rejected requests, by reason"),
        &["reason"]
    ).expect("Failed to create rejection counter");

    pub static ref STORED_AUTHORS: IntGauge = IntGauge::new(
        "stored_authors",
        "Number of author records currently stored"
    ).expect("Failed to create stored authors gauge");
}

/// Initialize metrics registry - must be called once at startup
pub fn init() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUESTS_REJECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORED_AUTHORS.clone()))?;
    Ok(())
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))?;
    String::from_utf8(buffer).map_err(|e| anyhow::anyhow!("Invalid UTF-8 in metrics: {}", e))
}
