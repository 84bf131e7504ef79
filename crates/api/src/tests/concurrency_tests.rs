// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Racing callers against one file database.

use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use tourbook::CoreError;
use tourbook_audit::Actor;
use tourbook_domain::{Reservation, SettlementOutcome, Tour};
use tourbook_persistence::{Persistence, PersistenceError};

use crate::{
    CreateReservationRequest, ReservationError, Settlement, cancel_reservation,
    create_reservation, get_tour, settle_payment,
};

use super::helpers::{NOW, book, create_test_policy, create_test_tour, create_valid_request};

fn file_persistence(dir: &tempfile::TempDir) -> Persistence {
    Persistence::new_with_file(dir.path().join("api.db"), 8).unwrap()
}

/// Runs `threads` copies of `work` released together by a barrier.
fn race<T, F>(threads: usize, work: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize) -> T + Send + Sync + 'static,
{
    let barrier: Arc<Barrier> = Arc::new(Barrier::new(threads));
    let work: Arc<F> = Arc::new(work);
    let handles: Vec<thread::JoinHandle<T>> = (0..threads)
        .map(|i| {
            let barrier: Arc<Barrier> = Arc::clone(&barrier);
            let work: Arc<F> = Arc::clone(&work);
            thread::spawn(move || {
                barrier.wait();
                work(i)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_racing_bookings_never_oversell() {
    let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
    let persistence: Persistence = file_persistence(&dir);
    let tour: Tour = create_test_tour(&persistence, 4);
    let tour_id: i64 = tour.tour_id;

    let shared: Persistence = persistence.clone();
    let results: Vec<Result<Reservation, ReservationError>> = race(12, move |i| {
        create_reservation(
            &shared,
            &create_test_policy(),
            create_valid_request(&format!("user-{i}"), tour_id, 1),
            NOW,
        )
    });

    let admitted: usize = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 4);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result,
            Err(ReservationError::CapacityExceeded { .. })
        ));
    }
    assert_eq!(get_tour(&persistence, tour_id).unwrap().current_bookings, 4);
    assert_eq!(persistence.held_seats(tour_id).unwrap(), 4);
}

#[test]
fn test_same_user_racing_duplicates_gets_one_booking() {
    let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
    let persistence: Persistence = file_persistence(&dir);
    let tour: Tour = create_test_tour(&persistence, 20);
    let tour_id: i64 = tour.tour_id;

    let shared: Persistence = persistence.clone();
    let results: Vec<Result<Reservation, ReservationError>> = race(6, move |_| {
        create_reservation(
            &shared,
            &create_test_policy(),
            create_valid_request("user-1", tour_id, 2),
            NOW,
        )
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ReservationError::DuplicateBooking { .. }))
    );
    assert_eq!(get_tour(&persistence, tour_id).unwrap().current_bookings, 2);
}

#[test]
fn test_racing_cancellations_release_seats_once() {
    let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
    let persistence: Persistence = file_persistence(&dir);
    let tour: Tour = create_test_tour(&persistence, 10);
    book(&persistence, "user-2", tour.tour_id, 1, NOW);
    let booking: Reservation = book(&persistence, "user-1", tour.tour_id, 3, NOW);
    let booking_id: i64 = booking.booking_id;

    let shared: Persistence = persistence.clone();
    let results: Vec<Result<Reservation, ReservationError>> = race(8, move |_| {
        cancel_reservation(
            &shared,
            booking_id,
            &Actor::admin("admin-1"),
            "duplicate click",
            NOW,
        )
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ReservationError::AlreadyCancelled { .. }))
    );
    assert_eq!(
        get_tour(&persistence, tour.tour_id).unwrap().current_bookings,
        1
    );
}

#[test]
fn test_cancel_racing_failed_settlement_releases_seats_once() {
    let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
    let persistence: Persistence = file_persistence(&dir);
    let tour: Tour = create_test_tour(&persistence, 10);
    let booking: Reservation = book(&persistence, "user-1", tour.tour_id, 5, NOW);
    let booking_id: i64 = booking.booking_id;

    let shared: Persistence = persistence.clone();
    let changed: Vec<bool> = race(2, move |i| {
        if i == 0 {
            cancel_reservation(
                &shared,
                booking_id,
                &Actor::customer("user-1"),
                "cancelled",
                NOW,
            )
            .is_ok()
        } else {
            settle_payment(&shared, booking_id, SettlementOutcome::Failed, NOW)
                .as_ref()
                .is_ok_and(Settlement::is_applied)
        }
    });

    assert_eq!(changed.iter().filter(|c| **c).count(), 1);
    assert_eq!(
        get_tour(&persistence, tour.tour_id).unwrap().current_bookings,
        0
    );
}

#[test]
fn test_invalid_request_is_rejected_while_writer_holds_the_lock() {
    let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
    let persistence: Persistence = file_persistence(&dir);
    let tour: Tour = create_test_tour(&persistence, 10);
    let tour_id: i64 = tour.tour_id;

    // Park a writer inside its transaction until released.
    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let holder: Persistence = persistence.clone();
    let writer: thread::JoinHandle<Result<Reservation, PersistenceError>> = thread::spawn(move || {
        holder.admit("holder", tour_id, |_context| {
            entered_tx.send(()).unwrap();
            let _ = release_rx.recv();
            Err(CoreError::TourEnded { tour_id })
        })
    });
    entered_rx.recv().unwrap();

    let mut request: CreateReservationRequest = create_valid_request("user-1", tour_id, 1);
    request.contact.full_name = String::new();
    let started: Instant = Instant::now();
    let result: Result<Reservation, ReservationError> =
        create_reservation(&persistence, &create_test_policy(), request, NOW);
    let waited: Duration = started.elapsed();

    release_tx.send(()).unwrap();
    let held: Result<Reservation, PersistenceError> = writer.join().unwrap();

    assert_eq!(
        result,
        Err(ReservationError::InvalidContact {
            field: String::from("full_name")
        })
    );
    assert!(waited < Duration::from_secs(2), "rejection waited {waited:?} on the writer");
    assert!(matches!(held, Err(PersistenceError::Rejected(CoreError::TourEnded { .. }))));
    assert_eq!(get_tour(&persistence, tour_id).unwrap().current_bookings, 0);
}
