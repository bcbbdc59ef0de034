use chrono::{DateTime, Utc};

use crate::limits::MAX_ACTIVE_PER_USER;
use crate::model::*;

use super::EngineError;

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `active` must already be filtered to one user's reservations with `end > now`.
pub(crate) fn check_quota(active: &[Reservation]) -> Result<(), EngineError> {
    if active.len() >= MAX_ACTIVE_PER_USER {
        return Err(EngineError::QuotaExceeded);
    }
    Ok(())
}

pub(crate) fn check_no_overlap(active: &[Reservation], span: &Span) -> Result<(), EngineError> {
    match active.iter().find(|r| r.span().overlaps(span)) {
        Some(r) => Err(EngineError::Overlap(r.id.clone())),
        None => Ok(()),
    }
}
