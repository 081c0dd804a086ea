use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: admission decisions. Labels: outcome.
pub const ADMISSIONS_TOTAL: &str = "reserva_admissions_total";

/// Histogram: admission decision latency in seconds.
pub const ADMISSION_DURATION_SECONDS: &str = "reserva_admission_duration_seconds";

/// Counter: availability searches executed.
pub const SEARCHES_TOTAL: &str = "reserva_searches_total";

// ── Reminder scan ───────────────────────────────────────────────

/// Counter: reminder notifications delivered.
pub const REMINDERS_SENT_TOTAL: &str = "reserva_reminders_sent_total";

/// Counter: reminder notifications that failed (swallowed, logged).
pub const REMINDER_FAILURES_TOTAL: &str = "reserva_reminder_failures_total";

/// Install the Prometheus metrics exporter on the given port. No-op if port
/// is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
