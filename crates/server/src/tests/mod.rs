// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod catalog_tests;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use serde::{Serialize, de::DeserializeOwned};
use time::{Date, Duration, OffsetDateTime};
use tourbook::ReservationPolicy;
use tourbook_api::{CreateTourRequest, create_tour};
use tourbook_domain::{Address, Contact, Guest, PaymentMethod, format_date};
use tourbook_persistence::Persistence;
use tower::ServiceExt;

use super::{AppState, CreateBookingApiRequest, build_router};

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence,
        policy: ReservationPolicy::default(),
    }
}

/// Registers a departure `starts_in_days` from today lasting five days.
fn create_tour_in(app_state: &AppState, starts_in_days: i64, seats: u32) -> i64 {
    let today: Date = OffsetDateTime::now_utc().date();
    let start: Date = today + Duration::days(starts_in_days);
    let end: Date = start + Duration::days(5);
    create_tour(
        &app_state.persistence,
        &CreateTourRequest {
            name: format!("Departure {}", format_date(start)),
            start_date: format_date(start),
            end_date: format_date(end),
            base_price: String::from("1000000"),
            max_group_size: seats,
        },
    )
    .unwrap()
    .tour_id
}

/// Helper to create a booking body with `guests` adults.
fn create_test_booking_request(
    user_id: &str,
    tour_id: i64,
    guests: u32,
    payment_method: PaymentMethod,
) -> CreateBookingApiRequest {
    CreateBookingApiRequest {
        user_id: user_id.to_string(),
        tour_id,
        guest_size: guests,
        guests: (0..guests)
            .map(|i| Guest::new(&format!("Guest {i}"), 30, "adult"))
            .collect(),
        contact: Contact {
            full_name: String::from("Tran Thi Mai"),
            phone: String::from("0901234567"),
        },
        address: Address {
            street: String::from("12 Ly Thuong Kiet"),
            ward: String::from("Hang Bai"),
            district: String::from("Hoan Kiem"),
            province: String::from("Ha Noi"),
        },
        payment_method,
        book_at: None,
        single_room_count: 0,
    }
}

async fn post_json<B: Serialize>(app: &Router, uri: &str, body: &B) -> Response {
    send(app, "POST", uri, Body::from(serde_json::to_string(body).unwrap())).await
}

async fn put_json<B: Serialize>(app: &Router, uri: &str, body: &B) -> Response {
    send(app, "PUT", uri, Body::from(serde_json::to_string(body).unwrap())).await
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, "GET", uri, Body::empty()).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Body) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

/// Asserts the status, then decodes the body.
async fn expect_json<T: DeserializeOwned>(response: Response, status: StatusCode) -> T {
    assert_eq!(response.status(), status);
    read_json(response).await
}

fn test_app() -> (AppState, Router) {
    let app_state: AppState = create_test_app_state();
    let app: Router = build_router(app_state.clone());
    (app_state, app)
}
