//! # Prometheus Metrics
//!
//! Operational metrics for the ledger node. Scraped by Prometheus at the
//! `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] under
//! the `peerledger` prefix so they do not collide with any default global
//! registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, Registry, TextEncoder,
};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
///
/// Clone-friendly (prometheus handles are `Arc` internally) so it can be
/// shared across request handlers.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Successful logins.
    pub logins_total: IntCounter,
    /// Rejected logins (unknown user or wrong credential, not told apart).
    pub login_failures_total: IntCounter,
    /// Transactions recorded.
    pub transactions_created_total: IntCounter,
    /// Successful `mark_paid` calls, including repeats.
    pub settlements_total: IntCounter,
    /// Credit score computations attempted.
    pub score_requests_total: IntCounter,
    /// Handler latency in seconds, labelled by endpoint.
    pub request_latency_seconds: HistogramVec,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let counter = IntCounter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("peerledger".into()), None)?;

        let logins_total = counter(&registry, "logins_total", "Total number of successful logins")?;
        let login_failures_total = counter(
            &registry,
            "login_failures_total",
            "Total number of rejected login attempts",
        )?;
        let transactions_created_total = counter(
            &registry,
            "transactions_created_total",
            "Total number of ledger transactions recorded",
        )?;
        let settlements_total = counter(
            &registry,
            "settlements_total",
            "Total number of successful mark_paid calls",
        )?;
        let score_requests_total = counter(
            &registry,
            "score_requests_total",
            "Total number of credit score requests",
        )?;

        let request_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "request_latency_seconds",
                "API handler latency in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
            &["endpoint"],
        )?;
        registry.register(Box::new(request_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            logins_total,
            login_failures_total,
            transactions_created_total,
            settlements_total,
            score_requests_total,
            request_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
