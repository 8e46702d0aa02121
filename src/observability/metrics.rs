//! Metrics collection and exposition.
//!
//! # Metrics
//! - `folio_bootstrap_total` (counter): bootstrap attempts by outcome
//! - `folio_navigation_total` (counter): navigations by route and status
//! - `folio_bootstrap_duration_seconds` (histogram): identity handshake latency
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; `install` puts a Prometheus recorder behind it
//! - The shell is short-lived, so the exposition is rendered on demand instead of served
//! - Recording can be switched off from configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Handle of the globally installed Prometheus recorder.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics recorder already installed")]
    AlreadyInstalled,

    #[error("failed to install Prometheus recorder: {0}")]
    Install(#[from] BuildError),
}

/// Install the Prometheus recorder as the global `metrics` recorder.
pub fn install() -> Result<(), MetricsError> {
    if METRICS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInstalled);
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    METRICS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInstalled)?;

    describe();
    tracing::debug!("Prometheus recorder installed");
    Ok(())
}

/// Prometheus text exposition of everything recorded so far, if installed.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Register metric descriptions with the current recorder.
pub fn describe() {
    describe_counter!("folio_bootstrap_total", "Bootstrap attempts by outcome");
    describe_counter!("folio_navigation_total", "Navigations through the route table");
    describe_histogram!(
        "folio_bootstrap_duration_seconds",
        Unit::Seconds,
        "Time from identity init to mount"
    );
}

/// Turn metric recording on or off.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Record the outcome of a bootstrap attempt.
pub fn record_bootstrap(outcome: &'static str, start: Instant) {
    if !is_enabled() {
        return;
    }
    ::metrics::counter!("folio_bootstrap_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("folio_bootstrap_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a navigation through the route table.
pub fn record_navigation(route: &'static str, status: &'static str) {
    if !is_enabled() {
        return;
    }
    ::metrics::counter!("folio_navigation_total", "route" => route, "status" => status).increment(1);
}
