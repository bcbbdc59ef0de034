use std::net::SocketAddr;

use crate::command::Command;

// ── Request-driven metrics ──────────────────────────────────────

/// Counter: session commands executed. Labels: command, status.
pub const COMMANDS_TOTAL: &str = "roomres_commands_total";

/// Histogram: command latency in seconds. Labels: command.
pub const COMMAND_DURATION_SECONDS: &str = "roomres_command_duration_seconds";

// ── Reservation lifecycle ───────────────────────────────────────

/// Counter: reservations stored.
pub const RESERVATIONS_CREATED_TOTAL: &str = "roomres_reservations_created_total";

/// Counter: reservations deleted by the user.
pub const RESERVATIONS_DELETED_TOTAL: &str = "roomres_reservations_deleted_total";

/// Counter: rejected submissions. Labels: reason (invalid, quota, overlap, store).
pub const SUBMISSIONS_REJECTED_TOTAL: &str = "roomres_submissions_rejected_total";

// ── Store health ────────────────────────────────────────────────

/// Gauge: records in the stored list, expired ones included (never purged).
pub const STORED_RESERVATIONS: &str = "roomres_stored_reservations";

/// Counter: stored reservation lists that failed to parse and were read as empty.
pub const STORE_PARSE_FAILURES_TOTAL: &str = "roomres_store_parse_failures_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Buildings => "buildings",
        Command::Select { .. } => "select",
        Command::Plan => "plan",
        Command::ChangeBuilding { .. } => "building",
        Command::Counter { .. } => "counter",
        Command::Reserve(_) => "reserve",
        Command::Manage => "manage",
        Command::Summary => "summary",
        Command::Refresh => "refresh",
        Command::List { .. } => "list",
        Command::Delete { .. } => "delete",
        Command::Theme => "theme",
        Command::Help => "help",
        Command::Quit => "quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_port_is_noop() {
        assert!(init(None).is_ok());
    }

    #[test]
    fn labels_follow_command_words() {
        assert_eq!(command_label(&Command::Theme), "theme");
        assert_eq!(command_label(&Command::Delete { id: "r_1".into() }), "delete");
    }
}
