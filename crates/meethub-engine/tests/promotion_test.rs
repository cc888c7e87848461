//! Integration tests for FIFO waitlist promotion.

mod helpers;

use std::time::Duration;

use helpers::TestEngine;
use meethub_core::error::ErrorKind;
use meethub_core::events::{EventPayload, ReservationEvent};
use meethub_core::types::ActorId;
use meethub_engine::SessionUpdate;
use meethub_entity::ReservationState;

/// Requests a reservation, pausing briefly afterwards so waitlist order
/// is unambiguous.
async fn request(app: &TestEngine, actor: ActorId, session: meethub_core::types::SessionId) -> meethub_engine::ReservationOutcome {
    let outcome = app
        .engine
        .request_reservation(actor, session)
        .await
        .expect("request");
    tokio::time::sleep(Duration::from_millis(2)).await;
    outcome
}

#[tokio::test]
async fn test_cancellation_promotes_oldest_waitlisted() {
    let app = TestEngine::new().await;
    let session = app.session(2).await;

    let a = app.attendee("Ada").await;
    let b = app.attendee("Ben").await;
    let c = app.attendee("Cam").await;

    let res_a = request(&app, a, session).await;
    let res_b = request(&app, b, session).await;
    let res_c = request(&app, c, session).await;
    assert_eq!(res_a.state, ReservationState::Confirmed);
    assert_eq!(res_b.state, ReservationState::Confirmed);
    assert_eq!(res_c.state, ReservationState::Waitlisted);

    app.engine
        .cancel_reservation(res_a.reservation_id, a)
        .await
        .expect("cancel");

    let promoted = app
        .engine
        .reservation(res_c.reservation_id)
        .await
        .expect("reservation");
    assert_eq!(promoted.state, ReservationState::Confirmed);

    let occupancy = app.engine.occupancy(session).await.expect("occupancy");
    assert_eq!(occupancy.confirmed, 2);
    assert!(app.engine.waitlist(session).await.is_empty());
}

#[tokio::test]
async fn test_capacity_increase_promotes_in_fifo_order() {
    let app = TestEngine::new().await;
    let session = app.session(1).await;

    let a = app.attendee("Ada").await;
    let b = app.attendee("Ben").await;
    let c = app.attendee("Cam").await;
    let d = app.attendee("Dee").await;

    let res_a = request(&app, a, session).await;
    let res_b = request(&app, b, session).await;
    let res_c = request(&app, c, session).await;
    let res_d = request(&app, d, session).await;
    assert_eq!(res_a.state, ReservationState::Confirmed);
    assert_eq!(res_b.state, ReservationState::Waitlisted);

    app.engine
        .update_session(
            session,
            app.staff_id,
            SessionUpdate {
                capacity: Some(3),
                ..SessionUpdate::default()
            },
        )
        .await
        .expect("update");

    // B and C get the two new seats; D stays waitlisted.
    for (id, expected) in [
        (res_b.reservation_id, ReservationState::Confirmed),
        (res_c.reservation_id, ReservationState::Confirmed),
        (res_d.reservation_id, ReservationState::Waitlisted),
    ] {
        let reservation = app.engine.reservation(id).await.expect("reservation");
        assert_eq!(reservation.state, expected);
    }

    // Promotion events were emitted oldest-first.
    let promotions: Vec<_> = app
        .sink
        .events()
        .await
        .into_iter()
        .filter_map(|event| match event.payload {
            EventPayload::Reservation(ReservationEvent::Promoted { reservation_id, .. }) => {
                Some(reservation_id)
            }
            _ => None,
        })
        .collect();
    assert_eq!(promotions, vec![res_b.reservation_id, res_c.reservation_id]);
}

#[tokio::test]
async fn test_capacity_decrease_keeps_existing_confirmations() {
    let app = TestEngine::new().await;
    let session = app.session(3).await;

    for i in 0..3 {
        let actor = app.attendee(&format!("actor-{i}")).await;
        let outcome = request(&app, actor, session).await;
        assert_eq!(outcome.state, ReservationState::Confirmed);
    }

    app.engine
        .update_session(
            session,
            app.staff_id,
            SessionUpdate {
                capacity: Some(1),
                ..SessionUpdate::default()
            },
        )
        .await
        .expect("shrink");

    // Nobody is evicted, but new requests go straight to the waitlist.
    let occupancy = app.engine.occupancy(session).await.expect("occupancy");
    assert_eq!(occupancy.confirmed, 3);

    let late = app.attendee("Late").await;
    let outcome = request(&app, late, session).await;
    assert_eq!(outcome.state, ReservationState::Waitlisted);
}

#[tokio::test]
async fn test_no_show_write_off_frees_seat_for_waitlist() {
    let app = TestEngine::new().await;
    let session = app.session(1).await;

    let absent = app.attendee("Absent").await;
    let waiting = app.attendee("Waiting").await;

    let res_absent = request(&app, absent, session).await;
    let res_waiting = request(&app, waiting, session).await;
    assert_eq!(res_absent.state, ReservationState::Confirmed);
    assert_eq!(res_waiting.state, ReservationState::Waitlisted);

    app.engine
        .write_off_no_show(res_absent.reservation_id, app.staff_id)
        .await
        .expect("write off");

    let promoted = app
        .engine
        .reservation(res_waiting.reservation_id)
        .await
        .expect("reservation");
    assert_eq!(promoted.state, ReservationState::Confirmed);
}

#[tokio::test]
async fn test_checked_in_actor_cannot_be_written_off() {
    let app = TestEngine::new().await;
    let session = app.session(1).await;
    let actor = app.attendee("Present").await;

    let outcome = request(&app, actor, session).await;
    app.engine.check_in(actor).await.expect("check in");

    let err = app
        .engine
        .write_off_no_show(outcome.reservation_id, app.staff_id)
        .await
        .expect_err("checked in");
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = app
        .engine
        .write_off_no_show(outcome.reservation_id, actor)
        .await
        .expect_err("not staff");
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_waitlisted_cancellation_does_not_promote() {
    let app = TestEngine::new().await;
    let session = app.session(1).await;

    let a = app.attendee("Ada").await;
    let b = app.attendee("Ben").await;
    let c = app.attendee("Cam").await;

    let _res_a = request(&app, a, session).await;
    let res_b = request(&app, b, session).await;
    let res_c = request(&app, c, session).await;

    // B leaves the waitlist; C moves up in order but stays waitlisted.
    app.engine
        .cancel_reservation(res_b.reservation_id, b)
        .await
        .expect("cancel");

    let still_waiting = app
        .engine
        .reservation(res_c.reservation_id)
        .await
        .expect("reservation");
    assert_eq!(still_waiting.state, ReservationState::Waitlisted);
    let occupancy = app.engine.occupancy(session).await.expect("occupancy");
    assert_eq!(occupancy.confirmed, 1);
}
