use std::sync::Arc;

use crate::store::{KeyValueStore, StoreError};

pub const RESERVATIONS_KEY: &str = "rider_reservations";
pub const LAST_RESERVATION_KEY: &str = "lastReservationId";
pub const SAVED_NAME_KEY: &str = "savedName";
pub const SAVED_EMAIL_KEY: &str = "savedEmail";
pub const SELECTED_BUILDING_KEY: &str = "selectedBuilding";
pub const THEME_KEY: &str = "themeIsDark";

/// Typed access to the fixed set of persisted keys.
#[derive(Clone)]
pub struct StoreAdapter {
    store: Arc<dyn KeyValueStore>,
}

impl StoreAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    // ── Reservation list ─────────────────────────────────────

    pub fn reservations_json(&self) -> Option<String> {
        self.store.get(RESERVATIONS_KEY)
    }

    pub fn set_reservations_json(&self, json: &str) -> Result<(), StoreError> {
        self.store.set(RESERVATIONS_KEY, json)
    }

    // ── Last-created pointer ─────────────────────────────────

    pub fn last_reservation_id(&self) -> Option<String> {
        self.store.get(LAST_RESERVATION_KEY).filter(|id| !id.is_empty())
    }

    pub fn set_last_reservation_id(&self, id: &str) -> Result<(), StoreError> {
        self.store.set(LAST_RESERVATION_KEY, id)
    }

    pub fn clear_last_reservation_id(&self) -> Result<(), StoreError> {
        self.store.remove(LAST_RESERVATION_KEY)
    }

    // ── Form pre-fill ────────────────────────────────────────

    pub fn saved_name(&self) -> String {
        self.store.get(SAVED_NAME_KEY).unwrap_or_default()
    }

    pub fn saved_email(&self) -> String {
        self.store.get(SAVED_EMAIL_KEY).unwrap_or_default()
    }

    pub fn set_saved_identity(&self, name: &str, email: &str) -> Result<(), StoreError> {
        self.store.set(SAVED_NAME_KEY, name)?;
        self.store.set(SAVED_EMAIL_KEY, email)
    }

    // ── Selection and theme ──────────────────────────────────

    pub fn selected_building(&self) -> String {
        self.store.get(SELECTED_BUILDING_KEY).unwrap_or_default()
    }

    pub fn set_selected_building(&self, building: &str) -> Result<(), StoreError> {
        self.store.set(SELECTED_BUILDING_KEY, building)
    }

    /// Only the exact value `"1"` means dark.
    pub fn theme_is_dark(&self) -> bool {
        self.store.get(THEME_KEY).as_deref() == Some("1")
    }

    pub fn set_theme_dark(&self, dark: bool) -> Result<(), StoreError> {
        self.store.set(THEME_KEY, if dark { "1" } else { "0" })
    }

    /// Flip the theme flag, returning the new value.
    pub fn toggle_theme(&self) -> Result<bool, StoreError> {
        let dark = !self.theme_is_dark();
        self.set_theme_dark(dark)?;
        Ok(dark)
    }
}
