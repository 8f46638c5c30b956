//! Prometheus metrics for bfhl-service.
//!
//! HTTP request metrics come from the shared middleware; this module adds
//! per-operation and AI provider series.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::InternalError(anyhow::anyhow!("metrics handle already initialized"))
    })
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_operation(operation: &'static str, ok: bool) {
    let outcome = if ok { "success" } else { "error" };
    counter!("bfhl_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

pub fn record_provider_call(provider: &'static str, elapsed: Duration, ok: bool) {
    let outcome = if ok { "success" } else { "error" };
    counter!("ai_provider_requests_total", "provider" => provider, "outcome" => outcome)
        .increment(1);
    histogram!("ai_provider_latency_seconds", "provider" => provider)
        .record(elapsed.as_secs_f64());
}
