use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe the pipeline series.
    /// Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!("analyze_requests_total", "Analyze requests received.");
        describe_counter!(
            "analyze_adapter_failures_total",
            "Requests that failed because the sentiment classifier failed."
        );
        describe_counter!(
            "analyze_items_skipped_total",
            "Items dropped after a per-item processing failure."
        );
        describe_counter!("analyze_spikes_total", "Negative sentiment spikes detected.");
        describe_histogram!("analyze_batch_size", "Texts sent to the classifier per request.");

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
