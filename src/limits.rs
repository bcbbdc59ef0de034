use crate::model::Ms;

/// Every reservation lasts exactly this long.
pub const RESERVATION_DURATION_MS: Ms = 90 * 60_000;

/// Reservations a single email may hold with `end > now`.
pub const MAX_ACTIVE_PER_USER: usize = 2;

/// Notes are counted in characters, not bytes.
pub const MAX_NOTES_LEN: usize = 200;

/// Institutional suffix used when `ROOMRES_EMAIL_DOMAIN` is unset.
pub const DEFAULT_EMAIL_DOMAIN: &str = "@rider.edu";
