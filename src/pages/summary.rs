use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

use crate::engine::{Engine, EngineError};
use crate::model::{Reservation, ReservationEvent};

use super::render;

/// What the summary page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    /// The reservation the last-created pointer resolves to.
    pub last: Option<Reservation>,
    /// Active reservations for `last`'s email.
    pub active: Vec<Reservation>,
}

impl std::fmt::Display for SummaryView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.last {
            Some(last) => {
                writeln!(f, "{}", render::reservation_card(last))?;
                writeln!(f)?;
                writeln!(f, "Your active reservations:")?;
                write!(f, "{}", render::reservation_list(&self.active))
            }
            None => write!(f, "{}", render::NO_RESERVATION),
        }
    }
}

/// Summary and management view. Holds a subscription for the shown email so
/// deletions made elsewhere can be picked up with [`SummaryPage::refresh`].
pub struct SummaryPage {
    engine: Arc<Engine>,
    subscription: Option<(String, broadcast::Receiver<ReservationEvent>)>,
}

impl SummaryPage {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            subscription: None,
        }
    }

    pub fn open(&mut self, now: DateTime<Utc>) -> SummaryView {
        let repo = self.engine.repository().clone();
        let Some(last) = repo.last_created() else {
            return SummaryView {
                last: None,
                active: Vec::new(),
            };
        };
        self.watch(&last.email);
        let active = repo.find_active_by_email(&last.email, now);
        SummaryView {
            last: Some(last),
            active,
        }
    }

    /// Active reservations for any email, as the management view lists them.
    pub fn list_active(&self, email: &str, now: DateTime<Utc>) -> Vec<Reservation> {
        self.engine.repository().find_active_by_email(email, now)
    }

    /// Delete and re-render. Our own notification is drained so a following
    /// `refresh` does not render twice.
    pub fn delete(&mut self, id: &str, now: DateTime<Utc>) -> Result<(Option<Reservation>, SummaryView), EngineError> {
        let removed = self.engine.cancel(id)?;
        self.drain();
        Ok((removed, self.open(now)))
    }

    /// Re-render if a mutation for the watched email was broadcast since the
    /// last render; `None` when nothing changed.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Option<SummaryView> {
        if self.drain() {
            debug!("summary refresh after change notification");
            Some(self.open(now))
        } else {
            None
        }
    }

    fn watch(&mut self, email: &str) {
        let email = email.to_lowercase();
        if self.subscription.as_ref().is_some_and(|(e, _)| *e == email) {
            return;
        }
        let rx = self.engine.repository().subscribe(&email);
        self.subscription = Some((email, rx));
    }

    /// Consume pending notifications, reporting whether any arrived.
    fn drain(&mut self) -> bool {
        let Some((_, rx)) = self.subscription.as_mut() else {
            return false;
        };
        let mut changed = false;
        loop {
            match rx.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => changed = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StoreAdapter;
    use crate::model::FormInput;
    use crate::notify::NotifyHub;
    use crate::repository::ReservationRepository;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap()
    }

    fn engine() -> Arc<Engine> {
        let store = StoreAdapter::new(Arc::new(MemoryStore::new()));
        let repo = Arc::new(ReservationRepository::new(store, Arc::new(NotifyHub::new())));
        Arc::new(Engine::new(repo, "@rider.edu"))
    }

    fn submit(engine: &Engine, title: &str, offset_min: i64) -> Reservation {
        engine
            .submit(
                &FormInput {
                    fullname: "Ada".into(),
                    email: "a@rider.edu".into(),
                    building: "Moore Library".into(),
                    room: "Study Room A".into(),
                    title: title.into(),
                    datetime: (t0() + Duration::minutes(offset_min)).to_rfc3339(),
                    notes: String::new(),
                },
                t0(),
            )
            .unwrap()
    }

    #[test]
    fn nothing_created_shows_not_found() {
        let mut page = SummaryPage::new(engine());
        let view = page.open(t0());
        assert_eq!(view.last, None);
        assert_eq!(view.to_string(), "No reservation found.");
    }

    #[test]
    fn shows_last_and_active_list() {
        let engine = engine();
        let first = submit(&engine, "First", 0);
        let second = submit(&engine, "Second", 200);

        let mut page = SummaryPage::new(engine);
        let view = page.open(t0());
        assert_eq!(view.last.as_ref(), Some(&second));
        assert_eq!(view.active, vec![first, second]);
        let text = view.to_string();
        assert!(text.starts_with("Second\n"));
        assert!(text.contains("Your active reservations:"));
    }

    #[test]
    fn deleting_last_created_clears_summary() {
        let engine = engine();
        let r = submit(&engine, "Meeting", 0);
        let mut page = SummaryPage::new(engine);
        page.open(t0());

        let (removed, view) = page.delete(&r.id, t0()).unwrap();
        assert_eq!(removed, Some(r));
        assert_eq!(view.last, None);
        assert_eq!(view.to_string(), "No reservation found.");
    }

    #[test]
    fn deleting_other_keeps_last_and_shows_empty_state() {
        let engine = engine();
        let first = submit(&engine, "First", 0);
        let second = submit(&engine, "Second", 200);
        let mut page = SummaryPage::new(engine);
        page.open(t0());

        let (_, view) = page.delete(&first.id, t0()).unwrap();
        assert_eq!(view.active, vec![second.clone()]);

        // After the pointer's own reservation expires, the card still renders
        // but the active list is empty.
        let later = second.end + Duration::minutes(1);
        let view = page.open(later);
        assert_eq!(view.last, Some(second));
        assert!(view.to_string().ends_with("No active reservations."));
    }

    #[test]
    fn other_view_refreshes_after_delete() {
        let engine = engine();
        let first = submit(&engine, "First", 0);
        submit(&engine, "Second", 200);

        let mut left = SummaryPage::new(engine.clone());
        let mut right = SummaryPage::new(engine);
        left.open(t0());
        assert_eq!(right.open(t0()).active.len(), 2);
        assert!(right.refresh(t0()).is_none());

        left.delete(&first.id, t0()).unwrap();
        assert!(left.refresh(t0()).is_none());

        let refreshed = right.refresh(t0()).expect("change was broadcast");
        assert_eq!(refreshed.active.len(), 1);
        assert!(right.refresh(t0()).is_none());
    }
}
