use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

/// Counts logins by outcome (`success`, `invalid`, `rate_limited`).
pub(crate) fn record_login(outcome: &'static str) {
    metrics::counter!("tutorias_logins_total", "outcome" => outcome).increment(1);
}

/// Counts sessions ended by a guard (`displaced`, `idle`).
pub(crate) fn record_session_termination(reason: &'static str) {
    metrics::counter!("tutorias_session_terminations_total", "reason" => reason).increment(1);
}

/// Counts tutoring session state changes by target status.
pub(crate) fn record_tutoring_transition(status: &'static str) {
    metrics::counter!("tutorias_session_transitions_total", "status" => status).increment(1);
}
