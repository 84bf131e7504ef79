// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::Value;
use time::{Date, Duration, OffsetDateTime};
use tourbook_api::TourResponse;
use tourbook_domain::{
    DiscountType, Guest, PriceBreakdown, Promotion, RulePayload, SeasonWindow, format_date,
};

use super::{create_tour_in, expect_json, get, post_json, put_json, test_app};
use crate::{
    CreateTourApiRequest, ErrorResponse, PricePreviewApiRequest, RuleActivationApiRequest,
};

fn early_bird_payload() -> RulePayload {
    RulePayload::Promotion(Promotion {
        name: String::from("early bird"),
        start_date: None,
        end_date: None,
        days_before_departure: Some(7),
        days_before_departure_max: None,
        discount_type: DiscountType::Percentage,
        discount_value: Decimal::from(10),
    })
}

fn one_adult_preview() -> PricePreviewApiRequest {
    PricePreviewApiRequest {
        booking_date: None,
        guests: vec![Guest::new("Pham Minh Duc", 35, "adult")],
        single_room_count: 0,
    }
}

fn rule_id_of(rule: &Value) -> i64 {
    rule["rule_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_tour_registration_over_http() {
    let (_, app) = test_app();
    let start: Date = OffsetDateTime::now_utc().date() + Duration::days(40);
    let body: CreateTourApiRequest = CreateTourApiRequest {
        name: String::from("Ha Long Bay"),
        start_date: format_date(start),
        end_date: format_date(start + Duration::days(3)),
        base_price: String::from("2500000.50"),
        max_group_size: 16,
    };

    let created: TourResponse =
        expect_json(post_json(&app, "/tours", &body).await, StatusCode::CREATED).await;

    assert_eq!(created.remaining, 16);
    assert_eq!(created.base_price, Decimal::new(250_000_050, 2));
    let fetched: TourResponse = expect_json(
        get(&app, &format!("/tours/{}", created.tour_id)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(fetched, created);
    let listed: Vec<TourResponse> = expect_json(get(&app, "/tours").await, StatusCode::OK).await;
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn test_malformed_tour_is_bad_request() {
    let (_, app) = test_app();
    let body: CreateTourApiRequest = CreateTourApiRequest {
        name: String::from("Sapa"),
        start_date: String::from("2026-13-01"),
        end_date: String::from("2026-13-05"),
        base_price: String::from("100"),
        max_group_size: 8,
    };

    let response = post_json(&app, "/tours", &body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preview_prices_without_reserving() {
    let (app_state, app) = test_app();
    let tour_id: i64 = create_tour_in(&app_state, 30, 1);

    let price: PriceBreakdown = expect_json(
        post_json(
            &app,
            &format!("/tours/{tour_id}/price-preview"),
            &one_adult_preview(),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(price.total_amount, Decimal::from(1_000_000));
    let tour: TourResponse =
        expect_json(get(&app, &format!("/tours/{tour_id}")).await, StatusCode::OK).await;
    assert_eq!(tour.remaining, 1);
}

#[tokio::test]
async fn test_preview_for_unknown_tour_is_not_found() {
    let (_, app) = test_app();

    let error: ErrorResponse = expect_json(
        post_json(&app, "/tours/77/price-preview", &one_adult_preview()).await,
        StatusCode::NOT_FOUND,
    )
    .await;

    assert_eq!(error.code, "tour_not_found");
}

#[tokio::test]
async fn test_rule_lifecycle_changes_preview() {
    let (app_state, app) = test_app();
    let tour_id: i64 = create_tour_in(&app_state, 30, 10);
    let preview_uri: String = format!("/tours/{tour_id}/price-preview");

    let rule: Value = expect_json(
        post_json(
            &app,
            &format!("/tours/{tour_id}/rules"),
            &early_bird_payload(),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(rule["kind"], "promotion");
    assert_eq!(rule["version"], 1);

    let discounted: PriceBreakdown = expect_json(
        post_json(&app, &preview_uri, &one_adult_preview()).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(discounted.total_amount, Decimal::from(900_000));

    let toggled: Value = expect_json(
        post_json(
            &app,
            &format!("/rules/{}/active", rule_id_of(&rule)),
            &RuleActivationApiRequest { is_active: false },
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(toggled["is_active"], false);

    let full: PriceBreakdown = expect_json(
        post_json(&app, &preview_uri, &one_adult_preview()).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(full.total_amount, Decimal::from(1_000_000));

    let active: Vec<Value> = expect_json(
        get(&app, &format!("/tours/{tour_id}/rules?active_only=true")).await,
        StatusCode::OK,
    )
    .await;
    assert!(active.is_empty());
    let all: Vec<Value> = expect_json(
        get(&app, &format!("/tours/{tour_id}/rules")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_rule_edit_cannot_change_kind() {
    let (app_state, app) = test_app();
    let tour_id: i64 = create_tour_in(&app_state, 30, 10);
    let rule: Value = expect_json(
        post_json(
            &app,
            &format!("/tours/{tour_id}/rules"),
            &early_bird_payload(),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let today: Date = OffsetDateTime::now_utc().date();
    let seasonal: RulePayload = RulePayload::Seasonal(vec![SeasonWindow {
        name: String::from("all year"),
        start_date: today,
        end_date: today + Duration::days(365),
        price_multiplier: Decimal::new(11, 1),
    }]);

    let error: ErrorResponse = expect_json(
        put_json(&app, &format!("/rules/{}", rule_id_of(&rule)), &seasonal).await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(error.code, "invalid_input");
}
