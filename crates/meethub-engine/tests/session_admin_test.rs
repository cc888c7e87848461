//! Integration tests for staff session administration.

mod helpers;

use chrono::{Duration, TimeZone, Utc};

use helpers::TestEngine;
use meethub_core::error::ErrorKind;
use meethub_engine::{DeleteOutcome, SessionUpdate};
use meethub_entity::{ReservationState, SessionStatus};

#[tokio::test]
async fn test_edit_rejects_overlap_then_accepts_free_slot() {
    let app = TestEngine::new().await;
    let day = Utc.with_ymd_and_hms(2026, 9, 14, 0, 0, 0).unwrap();

    let _morning = app
        .session_at(10, "Room 1", day + Duration::hours(10), day + Duration::hours(11))
        .await;
    let late = app
        .session_at(10, "Room 1", day + Duration::hours(14), day + Duration::hours(15))
        .await;

    // Moving the later session onto the morning slot conflicts.
    let err = app
        .engine
        .update_session(
            late,
            app.staff_id,
            SessionUpdate {
                starts_at: Some(day + Duration::minutes(10 * 60 + 30)),
                ends_at: Some(day + Duration::minutes(11 * 60 + 30)),
                ..SessionUpdate::default()
            },
        )
        .await
        .expect_err("overlap");
    assert_eq!(err.kind, ErrorKind::Conflict);

    // Starting exactly when the other ends is fine.
    let updated = app
        .engine
        .update_session(
            late,
            app.staff_id,
            SessionUpdate {
                starts_at: Some(day + Duration::minutes(11 * 60 + 30)),
                ends_at: Some(day + Duration::minutes(12 * 60 + 30)),
                ..SessionUpdate::default()
            },
        )
        .await
        .expect("free slot");
    assert_eq!(updated.starts_at, day + Duration::minutes(11 * 60 + 30));
}

#[tokio::test]
async fn test_edit_rejects_inverted_time_range() {
    let app = TestEngine::new().await;
    let session = app.session(10).await;
    let now = Utc::now();

    let err = app
        .engine
        .update_session(
            session,
            app.staff_id,
            SessionUpdate {
                starts_at: Some(now + Duration::hours(2)),
                ends_at: Some(now + Duration::hours(1)),
                ..SessionUpdate::default()
            },
        )
        .await
        .expect_err("inverted range");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_non_staff_cannot_administer() {
    let app = TestEngine::new().await;
    let session = app.session(10).await;
    let attendee = app.attendee("Ada").await;

    let err = app
        .engine
        .update_session(session, attendee, SessionUpdate::default())
        .await
        .expect_err("update forbidden");
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = app
        .engine
        .delete_session(session, attendee)
        .await
        .expect_err("delete forbidden");
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_delete_with_reservations_soft_cancels() {
    let app = TestEngine::new().await;
    let session = app.session(5).await;
    let actor = app.attendee("Ada").await;

    let reservation = app
        .engine
        .request_reservation(actor, session)
        .await
        .expect("request");

    let outcome = app
        .engine
        .delete_session(session, app.staff_id)
        .await
        .expect("delete");
    assert_eq!(outcome, DeleteOutcome::SoftCancelled);

    // The session survives as cancelled and rejects new reservations.
    let cancelled = app.engine.session(session).await.expect("session");
    assert_eq!(cancelled.status, SessionStatus::Cancelled);
    let late = app.attendee("Late").await;
    let err = app
        .engine
        .request_reservation(late, session)
        .await
        .expect_err("closed");
    assert_eq!(err.kind, ErrorKind::Conflict);

    // Reservation history stays readable.
    let kept = app
        .engine
        .reservation(reservation.reservation_id)
        .await
        .expect("reservation");
    assert_eq!(kept.state, ReservationState::Confirmed);
}

#[tokio::test]
async fn test_delete_without_active_reservations_removes_session() {
    let app = TestEngine::new().await;
    let session = app.session(5).await;
    let actor = app.attendee("Ada").await;

    let reservation = app
        .engine
        .request_reservation(actor, session)
        .await
        .expect("request");
    app.engine
        .cancel_reservation(reservation.reservation_id, actor)
        .await
        .expect("cancel");

    let outcome = app
        .engine
        .delete_session(session, app.staff_id)
        .await
        .expect("delete");
    assert_eq!(outcome, DeleteOutcome::Deleted);

    let err = app.engine.session(session).await.expect_err("gone");
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app.engine.occupancy(session).await.expect_err("deregistered");
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Cancelled reservation rows survive the hard delete.
    app.engine
        .reservation(reservation.reservation_id)
        .await
        .expect("history kept");
}

#[tokio::test]
async fn test_deleting_twice_reports_not_found() {
    let app = TestEngine::new().await;
    let session = app.session(5).await;

    app.engine
        .delete_session(session, app.staff_id)
        .await
        .expect("first delete");
    let err = app
        .engine
        .delete_session(session, app.staff_id)
        .await
        .expect_err("second delete");
    assert_eq!(err.kind, ErrorKind::NotFound);
}
