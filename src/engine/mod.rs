mod conflict;
mod error;
mod validate;
#[cfg(test)]
mod tests;

pub use error::{EngineError, Field, FieldError};

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::RESERVATION_DURATION_MS;
use crate::model::*;
use crate::observability;
use crate::repository::ReservationRepository;

use conflict::{check_no_overlap, check_quota};
use validate::check_fields;

/// Current wall-clock instant, the default evaluation time for "active".
pub fn now() -> DateTime<Utc> {
    conflict::now()
}

/// Validation and scheduling rules on top of the reservation repository.
pub struct Engine {
    repo: Arc<ReservationRepository>,
    email_domain: String,
}

impl Engine {
    pub fn new(repo: Arc<ReservationRepository>, email_domain: impl Into<String>) -> Self {
        Self {
            repo,
            email_domain: email_domain.into(),
        }
    }

    pub fn repository(&self) -> &Arc<ReservationRepository> {
        &self.repo
    }

    /// Check a form against the current store and build the reservation it
    /// would create. Nothing is written.
    ///
    /// Order: field checks, then the active quota, then overlap.
    pub fn validate_and_build(&self, input: &FormInput, now: DateTime<Utc>) -> Result<Reservation, EngineError> {
        let form = check_fields(input, &self.email_domain).map_err(EngineError::Invalid)?;
        let end = form.start + Duration::milliseconds(RESERVATION_DURATION_MS);

        let active = self.repo.find_active_by_email(&form.email, now);
        check_quota(&active)?;
        check_no_overlap(&active, &Span::new(form.start.timestamp_millis(), end.timestamp_millis()))?;

        Ok(Reservation {
            id: new_reservation_id(),
            fullname: form.fullname,
            email: form.email,
            building: form.building,
            room: form.room,
            title: form.title,
            start: form.start,
            end,
            notes: form.notes,
        })
    }

    /// Validate, store, and remember the new reservation as last created.
    pub fn submit(&self, input: &FormInput, now: DateTime<Utc>) -> Result<Reservation, EngineError> {
        let reservation = match self.validate_and_build(input, now) {
            Ok(r) => r,
            Err(e) => {
                debug!("submission rejected: {e}");
                metrics::counter!(observability::SUBMISSIONS_REJECTED_TOTAL, "reason" => e.reason())
                    .increment(1);
                return Err(e);
            }
        };
        self.repo.append(reservation.clone())?;
        self.repo.remember_last_created(&reservation.id)?;
        metrics::counter!(observability::RESERVATIONS_CREATED_TOTAL).increment(1);
        info!(
            "reserved {} / {} for {} at {}",
            reservation.building, reservation.room, reservation.email, reservation.start
        );
        Ok(reservation)
    }

    /// Remove a reservation by id; see [`ReservationRepository::remove_by_id`].
    pub fn cancel(&self, id: &str) -> Result<Option<Reservation>, EngineError> {
        let removed = self.repo.remove_by_id(id)?;
        if let Some(r) = &removed {
            metrics::counter!(observability::RESERVATIONS_DELETED_TOTAL).increment(1);
            info!("deleted reservation {} for {}", r.id, r.email);
        }
        Ok(removed)
    }
}

/// `r_` followed by a ULID: millisecond timestamp plus 80 random bits.
fn new_reservation_id() -> String {
    format!("r_{}", Ulid::new())
}
