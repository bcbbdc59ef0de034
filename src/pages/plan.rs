use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::directory;
use crate::engine::{Engine, EngineError, FieldError};
use crate::limits::MAX_NOTES_LEN;
use crate::model::{FormInput, Navigation, Reservation};
use crate::store::StoreError;

/// Initial state of the plan form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanView {
    pub fullname: String,
    pub email: String,
    pub building: String,
    pub rooms: Vec<&'static str>,
    pub notes_counter: String,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Created {
        reservation: Reservation,
        navigate: Navigation,
    },
    /// Shown inline next to the fields; the user stays on the form.
    Invalid(Vec<FieldError>),
    /// Blocking alert, optionally followed by navigation.
    Rejected {
        alert: String,
        navigate: Option<Navigation>,
    },
}

/// The reservation form.
pub struct PlanPage {
    engine: Arc<Engine>,
}

impl PlanPage {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Pre-fill from saved name, email, and the selected building.
    pub fn open(&self) -> PlanView {
        let store = self.engine.repository().adapter();
        let building = store.selected_building();
        PlanView {
            fullname: store.saved_name(),
            email: store.saved_email(),
            rooms: directory::rooms_for(&building).to_vec(),
            building,
            notes_counter: Self::notes_counter(""),
        }
    }

    /// Persist a new building choice and return its rooms.
    pub fn change_building(&self, building: &str) -> Result<Vec<&'static str>, StoreError> {
        let building = building.trim();
        self.engine.repository().adapter().set_selected_building(building)?;
        Ok(directory::rooms_for(building).to_vec())
    }

    pub fn notes_counter(notes: &str) -> String {
        format!("{} / {MAX_NOTES_LEN}", notes.chars().count())
    }

    pub fn manage(&self) -> Navigation {
        Navigation::Current
    }

    /// Name and email are remembered before validation runs, rejected
    /// attempts included.
    pub fn submit(&self, input: &FormInput, now: DateTime<Utc>) -> SubmitOutcome {
        let store = self.engine.repository().adapter();
        if let Err(e) = store.set_saved_identity(input.fullname.trim(), &input.email.trim().to_lowercase()) {
            warn!("could not remember name/email: {e}");
        }

        match self.engine.submit(input, now) {
            Ok(reservation) => SubmitOutcome::Created {
                reservation,
                navigate: Navigation::Summary,
            },
            Err(EngineError::Invalid(errors)) => SubmitOutcome::Invalid(errors),
            Err(e @ EngineError::QuotaExceeded) => SubmitOutcome::Rejected {
                alert: e.to_string(),
                navigate: Some(Navigation::Current),
            },
            Err(e @ EngineError::Overlap(_)) => SubmitOutcome::Rejected {
                alert: e.to_string(),
                navigate: None,
            },
            Err(e @ EngineError::Store(_)) => SubmitOutcome::Rejected {
                alert: format!("Could not save the reservation: {e}"),
                navigate: None,
            },
        }
    }
}
