use super::*;
use crate::adapter::StoreAdapter;
use crate::notify::NotifyHub;
use crate::store::MemoryStore;
use chrono::TimeZone;

const M: i64 = 60_000; // 1 minute in ms

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap()
}

fn at(offset_min: i64) -> String {
    (t0() + Duration::minutes(offset_min)).to_rfc3339()
}

fn engine() -> Engine {
    let store = Arc::new(MemoryStore::new());
    let repo = Arc::new(ReservationRepository::new(
        StoreAdapter::new(store),
        Arc::new(NotifyHub::new()),
    ));
    Engine::new(repo, "@rider.edu")
}

fn form(email: &str, title: &str, datetime: String) -> FormInput {
    FormInput {
        fullname: "Ada".into(),
        email: email.into(),
        building: "Fine Arts Center".into(),
        room: "Yvonne Theater".into(),
        title: title.into(),
        datetime,
        notes: String::new(),
    }
}

#[test]
fn end_is_start_plus_ninety_minutes() {
    let engine = engine();
    let r = engine.submit(&form("a@rider.edu", "Meeting", at(0)), t0()).unwrap();
    assert_eq!(r.start, t0());
    assert_eq!(r.end, t0() + Duration::minutes(90));
    assert_eq!(r.span().duration_ms(), 90 * M);
    assert!(r.id.starts_with("r_"));

    let stored = engine.repository().load_all();
    assert_eq!(stored, vec![r.clone()]);
    assert_eq!(engine.repository().last_created(), Some(r));
}

#[test]
fn overlapping_submit_rejected_and_not_stored() {
    let engine = engine();
    let first = engine.submit(&form("a@rider.edu", "Meeting", at(0)), t0()).unwrap();

    let result = engine.submit(&form("a@rider.edu", "Meeting", at(30)), t0());
    match result {
        Err(EngineError::Overlap(id)) => assert_eq!(id, first.id),
        other => panic!("expected overlap, got {other:?}"),
    }
    assert_eq!(engine.repository().load_all().len(), 1);
}

#[test]
fn adjacent_reservation_is_not_overlap() {
    let engine = engine();
    engine.submit(&form("a@rider.edu", "First", at(0)), t0()).unwrap();
    // Half-open: starting exactly at the previous end is allowed.
    engine.submit(&form("a@rider.edu", "Second", at(90)), t0()).unwrap();
    assert_eq!(engine.repository().load_all().len(), 2);
}

#[test]
fn earlier_start_reaching_into_existing_is_overlap() {
    let engine = engine();
    engine.submit(&form("a@rider.edu", "First", at(60)), t0()).unwrap();
    let result = engine.submit(&form("a@rider.edu", "Second", at(-29)), t0());
    assert!(matches!(result, Err(EngineError::Overlap(_))));
}

#[test]
fn third_active_reservation_hits_quota() {
    let engine = engine();
    engine.submit(&form("a@rider.edu", "One", at(0)), t0()).unwrap();
    engine.submit(&form("a@rider.edu", "Two", at(240)), t0()).unwrap();

    let result = engine.submit(&form("A@Rider.edu", "Three", at(600)), t0());
    assert!(matches!(result, Err(EngineError::QuotaExceeded)));
    assert_eq!(engine.repository().load_all().len(), 2);
}

#[test]
fn quota_checked_before_overlap() {
    let engine = engine();
    engine.submit(&form("a@rider.edu", "One", at(0)), t0()).unwrap();
    engine.submit(&form("a@rider.edu", "Two", at(240)), t0()).unwrap();

    // Overlaps "One" and exceeds the quota: quota wins.
    let result = engine.validate_and_build(&form("a@rider.edu", "Three", at(10)), t0());
    assert!(matches!(result, Err(EngineError::QuotaExceeded)));
}

#[test]
fn expired_reservations_free_the_quota() {
    let engine = engine();
    engine.submit(&form("a@rider.edu", "One", at(0)), t0()).unwrap();
    engine.submit(&form("a@rider.edu", "Two", at(120)), t0()).unwrap();

    // Once "One" has ended only one reservation is active.
    let later = t0() + Duration::minutes(100);
    engine.submit(&form("a@rider.edu", "Three", at(400)), later).unwrap();
    assert_eq!(engine.repository().load_all().len(), 3);
    assert_eq!(engine.repository().find_active_by_email("a@rider.edu", later).len(), 2);
}

#[test]
fn other_users_do_not_count() {
    let engine = engine();
    engine.submit(&form("a@rider.edu", "Mine", at(0)), t0()).unwrap();
    engine.submit(&form("b@rider.edu", "Theirs", at(0)), t0()).unwrap();
    engine.submit(&form("b@rider.edu", "Theirs too", at(200)), t0()).unwrap();
    assert_eq!(engine.repository().load_all().len(), 3);
}

#[test]
fn foreign_domain_rejected_without_storing() {
    let engine = engine();
    let result = engine.submit(&form("a@gmail.com", "Meeting", at(0)), t0());
    match result {
        Err(EngineError::Invalid(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, Field::Email);
        }
        other => panic!("expected field error, got {other:?}"),
    }
    assert!(engine.repository().load_all().is_empty());
    assert!(engine.repository().adapter().last_reservation_id().is_none());
}

#[test]
fn invalid_date_blocks_scheduling_checks() {
    let engine = engine();
    engine.submit(&form("a@rider.edu", "One", at(0)), t0()).unwrap();
    engine.submit(&form("a@rider.edu", "Two", at(240)), t0()).unwrap();

    // Quota is already full, but the field error is reported instead.
    let result = engine.submit(&form("a@rider.edu", "Three", "soon".into()), t0());
    assert!(matches!(result, Err(EngineError::Invalid(_))));
}

#[test]
fn normalizes_stored_fields() {
    let engine = engine();
    let mut input = form("  Ada@RIDER.edu ", "  Weekly sync ", at(0));
    input.fullname = " Ada Lovelace ".into();
    let r = engine.submit(&input, t0()).unwrap();
    assert_eq!(r.email, "ada@rider.edu");
    assert_eq!(r.fullname, "Ada Lovelace");
    assert_eq!(r.title, "Weekly sync");
}

#[test]
fn ids_are_unique() {
    let engine = engine();
    let a = engine.validate_and_build(&form("a@rider.edu", "x", at(0)), t0()).unwrap();
    let b = engine.validate_and_build(&form("a@rider.edu", "x", at(0)), t0()).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn cancel_frees_a_slot() {
    let engine = engine();
    let one = engine.submit(&form("a@rider.edu", "One", at(0)), t0()).unwrap();
    engine.submit(&form("a@rider.edu", "Two", at(240)), t0()).unwrap();

    assert_eq!(engine.cancel(&one.id).unwrap(), Some(one.clone()));
    assert!(engine.cancel(&one.id).unwrap().is_none());
    engine.submit(&form("a@rider.edu", "Three", at(30)), t0()).unwrap();
}

#[test]
fn invariants_hold_after_many_submits() {
    let engine = engine();
    let now = t0();
    for i in 0..40 {
        let email = if i % 2 == 0 { "a@rider.edu" } else { "b@rider.edu" };
        let _ = engine.submit(&form(email, "slot", at(i * 37)), now);
    }

    for email in ["a@rider.edu", "b@rider.edu"] {
        let active = engine.repository().find_active_by_email(email, now);
        assert!(active.len() <= crate::limits::MAX_ACTIVE_PER_USER);
        for (i, a) in active.iter().enumerate() {
            assert_eq!(a.end - a.start, Duration::minutes(90));
            for b in &active[i + 1..] {
                assert!(!a.span().overlaps(&b.span()), "{} overlaps {}", a.id, b.id);
            }
        }
    }
}

#[test]
fn zero_length_stored_record_is_tolerated() {
    let engine = engine();
    let stamp = (t0() + Duration::hours(5)).to_rfc3339();
    let json = format!(
        r#"[{{"id":"r_bad","fullname":"Ada","email":"a@rider.edu","building":"Moore Library",
            "room":"Study Room A","title":"Broken","start":"{stamp}","end":"{stamp}"}}]"#
    );
    engine.repository().adapter().set_reservations_json(&json).unwrap();

    // Still active (end > now) and counted, but it occupies no time.
    let r = engine.submit(&form("a@rider.edu", "Around it", at(260)), t0()).unwrap();
    assert!(r.start < t0() + Duration::hours(5) && t0() + Duration::hours(5) < r.end);

    let result = engine.submit(&form("a@rider.edu", "Third", at(600)), t0());
    assert!(matches!(result, Err(EngineError::QuotaExceeded)));
}

#[test]
fn quota_alert_text_is_fixed_even_past_the_limit() {
    let engine = engine();
    engine.submit(&form("a@rider.edu", "One", at(0)), t0()).unwrap();
    engine.submit(&form("a@rider.edu", "Two", at(200)), t0()).unwrap();
    // A concurrent writer slipped a third one in.
    let mut all = engine.repository().load_all();
    let mut extra = all[0].clone();
    extra.id = "r_extra".into();
    extra.start = t0() + Duration::minutes(400);
    extra.end = extra.start + Duration::minutes(90);
    all.push(extra);
    engine.repository().save_all(&all).unwrap();

    let err = engine.submit(&form("a@rider.edu", "Four", at(800)), t0()).unwrap_err();
    assert_eq!(err.to_string(), "You already have 2 active reservations.");
}
