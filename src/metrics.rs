use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
/// Renders an empty payload; meant for tests and embedding.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

fn register_metrics() {
    // Pre-register counters so they appear even before the first increment.
    counter!("opportunities_seen_total").absolute(0);
    counter!("alerts_sent_total").absolute(0);
    counter!("alerts_suppressed_total", "reason" => "cooling_down").absolute(0);
    counter!("poll_failures_total", "endpoint" => "opportunities").absolute(0);

    gauge!("alerting_paused").set(0.0);
}
