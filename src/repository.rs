use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::adapter::StoreAdapter;
use crate::model::{Reservation, ReservationEvent};
use crate::notify::NotifyHub;
use crate::observability;
use crate::store::StoreError;

/// Ordered reservation list persisted as one JSON array under a single key.
///
/// There is no locking across `load_all`/`save_all`: two writers sharing a
/// store can lose each other's updates.
pub struct ReservationRepository {
    store: StoreAdapter,
    notify: Arc<NotifyHub>,
}

impl ReservationRepository {
    pub fn new(store: StoreAdapter, notify: Arc<NotifyHub>) -> Self {
        Self { store, notify }
    }

    pub fn adapter(&self) -> &StoreAdapter {
        &self.store
    }

    /// Persisted list in insertion order. Absent, `null`, or unparseable data
    /// yields an empty list; the failure is logged and counted, never raised.
    pub fn load_all(&self) -> Vec<Reservation> {
        let Some(raw) = self.store.reservations_json() else {
            return Vec::new();
        };
        match serde_json::from_str::<Option<Vec<Reservation>>>(&raw) {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                warn!("stored reservation list is unreadable, treating as empty: {e}");
                metrics::counter!(observability::STORE_PARSE_FAILURES_TOTAL).increment(1);
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted list with a single store write.
    pub fn save_all(&self, list: &[Reservation]) -> Result<(), StoreError> {
        let json = serde_json::to_string(list).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.store.set_reservations_json(&json)?;
        metrics::gauge!(observability::STORED_RESERVATIONS).set(list.len() as f64);
        Ok(())
    }

    pub fn append(&self, reservation: Reservation) -> Result<(), StoreError> {
        let mut all = self.load_all();
        let event = ReservationEvent::Created {
            id: reservation.id.clone(),
            email: reservation.email.clone(),
        };
        all.push(reservation);
        self.save_all(&all)?;
        debug!("appended reservation, {} stored", all.len());
        self.notify.send(&event);
        Ok(())
    }

    /// Remove by id and clear the last-created pointer if it referenced `id`.
    /// Removing an unknown id leaves the list unchanged.
    pub fn remove_by_id(&self, id: &str) -> Result<Option<Reservation>, StoreError> {
        let mut all = self.load_all();
        let removed = all
            .iter()
            .position(|r| r.id == id)
            .map(|pos| all.remove(pos));
        if removed.is_some() {
            all.retain(|r| r.id != id);
            self.save_all(&all)?;
        }

        if self.store.last_reservation_id().as_deref() == Some(id) {
            self.store.clear_last_reservation_id()?;
        }

        if let Some(r) = &removed {
            self.notify.send(&ReservationEvent::Deleted {
                id: r.id.clone(),
                email: r.email.clone(),
            });
        }
        Ok(removed)
    }

    /// Reservations for `email` (case-insensitive) with `end > now`, in insertion order.
    pub fn find_active_by_email(&self, email: &str, now: DateTime<Utc>) -> Vec<Reservation> {
        self.load_all()
            .into_iter()
            .filter(|r| r.belongs_to(email) && r.is_active_at(now))
            .collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Reservation> {
        self.load_all().into_iter().find(|r| r.id == id)
    }

    /// Resolve the last-created pointer against the current list.
    pub fn last_created(&self) -> Option<Reservation> {
        let id = self.store.last_reservation_id()?;
        self.find_by_id(&id)
    }

    pub fn remember_last_created(&self, id: &str) -> Result<(), StoreError> {
        self.store.set_last_reservation_id(id)
    }

    /// Observe mutations affecting `email`.
    pub fn subscribe(&self, email: &str) -> broadcast::Receiver<ReservationEvent> {
        self.notify.subscribe(email)
    }
}
