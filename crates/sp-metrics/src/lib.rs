use std::env;
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize a Prometheus exporter listening on `0.0.0.0:<port>`.
///
/// The port is resolved from the provided environment variable name or the
/// supplied `default_port`. Returns a handle to the exporter if it was started.
pub fn init_metrics(port_env: &str, default_port: u16) -> Option<&'static PrometheusHandle> {
    let port = env::var(port_env)
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(default_port);

    if let Some(existing) = PROMETHEUS_HANDLE.get() {
        return Some(existing);
    }

    match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install_recorder()
    {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle);
            info!(metrics_port = port, "started prometheus exporter");
            PROMETHEUS_HANDLE.get()
        }
        Err(err) => {
            warn!(error = %err, metrics_port = port, "failed to start prometheus exporter");
            PROMETHEUS_HANDLE.get()
        }
    }
}

/// Record one batch pairing run. A no-op when no recorder is installed.
pub fn record_pairing_run(source: &'static str, clients: usize, therapists: usize, elapsed: Duration) {
    counter!("smart_pairing_runs_total", "source" => source).increment(1);
    counter!("smart_pairing_pairs_scored_total", "source" => source)
        .increment((clients * therapists) as u64);
    histogram!("smart_pairing_run_seconds", "source" => source).record(elapsed.as_secs_f64());
}

/// Record a rejected pairing request, labelled by error code.
pub fn record_pairing_rejected(code: &'static str) {
    counter!("smart_pairing_rejected_total", "code" => code).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_pairing_run("test", 3, 4, Duration::from_millis(5));
        record_pairing_rejected("bad_request");
    }
}
