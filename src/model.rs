use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unix milliseconds, used for interval arithmetic.
pub type Ms = i64;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// An empty span overlaps nothing.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }
}

/// A stored room reservation. Field names are the persisted JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub building: String,
    pub room: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

impl Reservation {
    /// Stored records are not trusted to have `start < end`; a reversed or
    /// zero-length record yields an empty span.
    pub fn span(&self) -> Span {
        Span {
            start: self.start.timestamp_millis(),
            end: self.end.timestamp_millis(),
        }
    }

    /// Active means the reservation ends strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end > now
    }

    pub fn belongs_to(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.trim().to_lowercase()
    }
}

/// Raw values read from the plan form, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub fullname: String,
    pub email: String,
    pub building: String,
    pub room: String,
    pub title: String,
    pub datetime: String,
    pub notes: String,
}

/// Pages a controller can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Plan,
    Summary,
    /// The current-reservations management view.
    Current,
}

impl std::fmt::Display for Navigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Navigation::Plan => write!(f, "plan"),
            Navigation::Summary => write!(f, "summary"),
            Navigation::Current => write!(f, "current"),
        }
    }
}

/// Broadcast to subscribers after a successful repository mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationEvent {
    Created { id: String, email: String },
    Deleted { id: String, email: String },
}

impl ReservationEvent {
    pub fn email(&self) -> &str {
        match self {
            ReservationEvent::Created { email, .. } | ReservationEvent::Deleted { email, .. } => email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(start_min: i64, len_min: i64) -> Reservation {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap() + chrono::Duration::minutes(start_min);
        Reservation {
            id: "r_1".into(),
            fullname: "Ada".into(),
            email: "Ada@Rider.edu".into(),
            building: "Moore Library".into(),
            room: "Study Room A".into(),
            title: "Meeting".into(),
            start,
            end: start + chrono::Duration::minutes(len_min),
            notes: String::new(),
        }
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(100, 200);
        let b = Span::new(150, 250);
        let c = Span::new(200, 300);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn degenerate_stored_record_has_empty_span() {
        let zero = sample(0, 0);
        let reversed = sample(0, -30);
        assert!(zero.span().is_empty());
        assert!(reversed.span().is_empty());
        let around = Span::new(zero.span().start - 60_000, zero.span().start + 60_000);
        assert!(!zero.span().overlaps(&around));
        assert!(!around.overlaps(&reversed.span()));
    }

    #[test]
    fn reservation_span_in_ms() {
        let r = sample(0, 90);
        assert_eq!(r.span().duration_ms(), 90 * 60_000);
    }

    #[test]
    fn active_is_strictly_after_now() {
        let r = sample(0, 90);
        assert!(r.is_active_at(r.start));
        assert!(!r.is_active_at(r.end));
    }

    #[test]
    fn email_match_ignores_case() {
        let r = sample(0, 90);
        assert!(r.belongs_to("ada@rider.edu"));
        assert!(r.belongs_to("  ADA@RIDER.EDU "));
        assert!(!r.belongs_to("bob@rider.edu"));
    }

    #[test]
    fn deserializes_browser_record() {
        let json = r#"{"id":"r_1700000000000_42","fullname":"Ada","email":"ada@rider.edu",
            "building":"Moore Library","room":"Study Room A","title":"Meeting",
            "start":"2025-03-01T10:00:00.000Z","end":"2025-03-01T11:30:00.000Z","extra":1}"#;
        let r: Reservation = serde_json::from_str(json).unwrap();
        assert_eq!(r.notes, "");
        assert_eq!(r.end - r.start, chrono::Duration::minutes(90));
    }
}
