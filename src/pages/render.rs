use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use crate::model::Reservation;

/// Placeholder for an absent value.
pub const EMPTY: &str = "—";

pub const NO_RESERVATION: &str = "No reservation found.";
pub const NO_ACTIVE: &str = "No active reservations.";

/// Timestamp in the user's local time, e.g. `3/1/2025, 10:00:00 AM`.
pub fn format_display(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
        None => EMPTY.to_string(),
    }
}

pub fn reservation_card(r: &Reservation) -> String {
    let notes = if r.notes.trim().is_empty() {
        EMPTY
    } else {
        r.notes.as_str()
    };
    let mut out = String::new();
    let _ = writeln!(out, "{}", r.title);
    let _ = writeln!(out, "  Name: {}", r.fullname);
    let _ = writeln!(out, "  Email: {}", r.email);
    let _ = writeln!(out, "  Building: {}", r.building);
    let _ = writeln!(out, "  Room: {}", r.room);
    let _ = writeln!(out, "  Start: {}", format_display(Some(r.start)));
    let _ = writeln!(out, "  End: {}", format_display(Some(r.end)));
    let _ = writeln!(out, "  Notes: {notes}");
    out.push_str("Reservation Complete!");
    out
}

/// One line per reservation, or the empty-state message.
pub fn reservation_list(active: &[Reservation]) -> String {
    if active.is_empty() {
        return NO_ACTIVE.to_string();
    }
    active
        .iter()
        .map(|r| {
            format!(
                "[{}] {} | {} • {} | {}",
                r.id,
                r.title,
                r.building,
                r.room,
                format_display(Some(r.start))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
