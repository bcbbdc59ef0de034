use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::directory;
use crate::limits::MAX_NOTES_LEN;
use crate::model::FormInput;

use super::error::{Field, FieldError};

/// Form values that passed every field check, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckedForm {
    pub fullname: String,
    pub email: String,
    pub building: String,
    pub room: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub notes: String,
}

/// Run every field check and collect all failures in form order.
pub(crate) fn check_fields(input: &FormInput, email_domain: &str) -> Result<CheckedForm, Vec<FieldError>> {
    let mut errors = Vec::new();

    let fullname = input.fullname.trim();
    let email = input.email.trim().to_lowercase();
    let title = input.title.trim();
    let building = input.building.trim();
    let room = input.room.trim();

    if fullname.is_empty() {
        errors.push(FieldError::new(Field::Fullname, "Name is required."));
    }
    if !is_institutional(&email, email_domain) {
        errors.push(FieldError::new(
            Field::Email,
            format!("Enter a valid {email_domain} email."),
        ));
    }
    if title.is_empty() {
        errors.push(FieldError::new(Field::Title, "Title required."));
    }

    let start = match parse_start(&input.datetime) {
        Ok(start) => Some(start),
        Err(msg) => {
            errors.push(FieldError::new(Field::Datetime, msg));
            None
        }
    };

    if !directory::has_room(building, room) {
        errors.push(FieldError::new(Field::Room, "Choose a room from the list."));
    }
    if input.notes.chars().count() > MAX_NOTES_LEN {
        errors.push(FieldError::new(
            Field::Notes,
            format!("Notes must be {MAX_NOTES_LEN} characters or fewer."),
        ));
    }

    match start {
        Some(start) if errors.is_empty() => Ok(CheckedForm {
            fullname: fullname.to_string(),
            email,
            building: building.to_string(),
            room: room.to_string(),
            title: title.to_string(),
            start,
            notes: input.notes.clone(),
        }),
        _ => Err(errors),
    }
}

/// `email` is already trimmed and lower-cased. The local part must be non-empty.
fn is_institutional(email: &str, email_domain: &str) -> bool {
    let domain = email_domain.to_lowercase();
    email.len() > domain.len() && email.ends_with(&domain)
}

/// Accepts RFC 3339 with an explicit offset, or an HTML `datetime-local`
/// value (`YYYY-MM-DDTHH:MM[:SS]`) read as local time.
pub(crate) fn parse_start(raw: &str) -> Result<DateTime<Utc>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Choose a date/time.");
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or("Invalid date/time.")?;
    // A wall-clock time skipped by a DST jump has no instant.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or("Invalid date/time.")
}
