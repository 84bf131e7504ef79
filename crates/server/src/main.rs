// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod sweeper;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use tourbook::ReservationPolicy;
use tourbook_api::{
    BookingEventResponse, CreateReservationRequest, CreateTourRequest, ErrorKind,
    PreviewPriceRequest, PricingRuleResponse, ReservationError, ReservationResponse, Settlement,
    SettlementResponse, SweepReport, TourResponse, cancel_reservation, create_pricing_rule,
    create_reservation, create_tour, get_reservation, get_tour, list_booking_events,
    list_pricing_rules, list_reservations, list_tours, parse_timestamp, preview_price, run_sweep,
    set_pricing_rule_active, settle_payment, update_pricing_rule, utc_today,
};
use tourbook_audit::{Actor, ActorRole};
use tourbook_domain::{
    Address, Contact, Guest, PaymentMethod, PriceBreakdown, Reservation, RulePayload,
    SettlementOutcome,
};
use tourbook_persistence::{DEFAULT_POOL_SIZE, Persistence};
use tracing::{error, info};

use crate::sweeper::spawn_expiry_sweeper;

/// Tour Booking Server - HTTP server for seat reservations and pricing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Minutes a gateway reservation may stay pending before it expires
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..))]
    pending_ttl_minutes: u32,

    /// Minutes between expiry sweeps
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    sweep_interval_minutes: u32,

    /// Pending reservations a user may hold at once
    #[arg(long, default_value_t = 3)]
    max_pending_per_user: usize,

    /// Connections in the database pool
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    pool_size: u32,
}

impl Args {
    /// The reservation policy configured on the command line.
    fn policy(&self) -> ReservationPolicy {
        ReservationPolicy {
            pending_ttl: Duration::minutes(i64::from(self.pending_ttl_minutes)),
            sweep_interval: Duration::minutes(i64::from(self.sweep_interval_minutes)),
            max_pending_per_user: self.max_pending_per_user,
        }
    }
}

/// Application state shared across handlers.
///
/// `Persistence` wraps a connection pool and is cheap to clone; every
/// handler clones it into the blocking pool.
#[derive(Clone)]
struct AppState {
    /// The booking store.
    persistence: Persistence,
    /// Reservation limits and timings.
    policy: ReservationPolicy,
}

/// API request for creating a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateBookingApiRequest {
    /// The booking user.
    user_id: String,
    /// The departure.
    tour_id: i64,
    /// Declared number of guests.
    guest_size: u32,
    /// The guests.
    guests: Vec<Guest>,
    /// Contact details.
    contact: Contact,
    /// Contact address.
    address: Address,
    /// `cash_on_arrival` or `gateway`.
    payment_method: PaymentMethod,
    /// Date to price the booking for (RFC 3339). Defaults to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    book_at: Option<String>,
    /// Requested single rooms.
    #[serde(default)]
    single_room_count: u32,
}

/// API request for cancelling a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CancelBookingApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// Why the booking is cancelled.
    reason: String,
}

/// Payment notifier callback body.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SettlementApiRequest {
    /// `success` or `failed`.
    outcome: SettlementOutcome,
}

/// API request for previewing a price.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct PricePreviewApiRequest {
    /// Date to price for (RFC 3339). Defaults to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    booking_date: Option<String>,
    /// The guests.
    guests: Vec<Guest>,
    /// Requested single rooms.
    #[serde(default)]
    single_room_count: u32,
}

/// API request for registering a departure.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateTourApiRequest {
    /// Display name.
    name: String,
    /// First day (`YYYY-MM-DD`).
    start_date: String,
    /// Last day (`YYYY-MM-DD`).
    end_date: String,
    /// Per-guest base price as a decimal string.
    base_price: String,
    /// Seat capacity.
    max_group_size: u32,
}

/// API request for activating or deactivating a pricing rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RuleActivationApiRequest {
    /// Whether the rule participates in pricing.
    is_active: bool,
}

/// Query parameters for listing pricing rules.
#[derive(Debug, Deserialize)]
struct ListRulesQuery {
    /// Include only active rules.
    #[serde(default)]
    active_only: bool,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    /// Always `"ok"`.
    status: String,
}

/// API response for listing a user's bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ListBookingsApiResponse {
    /// The user.
    user_id: String,
    /// Their bookings, oldest first.
    bookings: Vec<ReservationResponse>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Stable machine-readable code.
    code: String,
    /// Error message.
    message: String,
    /// True when the request was a repeat of something already done.
    benign: bool,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// Stable machine-readable code.
    code: &'static str,
    /// The error message.
    message: String,
    /// Whether the failure is a benign repeat.
    benign: bool,
}

impl HttpError {
    const fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_input",
            message,
            benign: false,
        }
    }

    const fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message,
            benign: false,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            code: self.code.to_string(),
            message: self.message,
            benign: self.benign,
        });
        (self.status, body).into_response()
    }
}

impl From<ReservationError> for HttpError {
    fn from(err: ReservationError) -> Self {
        let status: StatusCode = match err.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Contention | ErrorKind::Benign | ErrorKind::Conflict => {
                StatusCode::CONFLICT
            }
            ErrorKind::TourEnded => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
            benign: err.kind() == ErrorKind::Benign,
        }
    }
}

/// Runs synchronous API work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ReservationError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(HttpError::from),
        Err(join_err) => {
            error!(error = %join_err, "Blocking task failed");
            Err(HttpError::internal(String::from("Request processing failed")))
        }
    }
}

/// Parses an optional RFC 3339 timestamp, defaulting to `now`.
fn timestamp_or_now(
    field: &str,
    value: Option<&str>,
    now: OffsetDateTime,
) -> Result<OffsetDateTime, HttpError> {
    value.map_or(Ok(now), |raw| {
        parse_timestamp(field, raw).map_err(HttpError::from)
    })
}

/// Parses a role string into an `ActorRole`.
fn parse_role(role_str: &str) -> Result<ActorRole, HttpError> {
    ActorRole::from_str(&role_str.to_lowercase()).map_err(|_| {
        HttpError::bad_request(format!(
            "Invalid role: '{role_str}'. Must be 'customer', 'admin' or 'system'"
        ))
    })
}

/// Handler for GET `/health`.
#[allow(clippy::unused_async)]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Handler for POST `/bookings` endpoint.
///
/// Admits a booking and returns it with status 201.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateBookingApiRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), HttpError> {
    info!(
        user_id = %req.user_id,
        tour_id = req.tour_id,
        guest_size = req.guest_size,
        "Handling create_booking request"
    );

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let book_at: Option<OffsetDateTime> = match req.book_at.as_deref() {
        Some(raw) => Some(parse_timestamp("book_at", raw)?),
        None => None,
    };
    let request: CreateReservationRequest = CreateReservationRequest {
        user_id: req.user_id,
        tour_id: req.tour_id,
        guest_size: req.guest_size,
        guests: req.guests,
        contact: req.contact,
        address: req.address,
        payment_method: req.payment_method,
        book_at,
        single_room_count: req.single_room_count,
    };

    let AppState {
        persistence,
        policy,
    } = app_state;
    let response: ReservationResponse = run_blocking(move || {
        let reservation: Reservation = create_reservation(&persistence, &policy, request, now)?;
        ReservationResponse::from_reservation(&reservation)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/bookings/{booking_id}` endpoint.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ReservationResponse>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let response: ReservationResponse = run_blocking(move || {
        let reservation: Reservation = get_reservation(&persistence, booking_id)?;
        ReservationResponse::from_reservation(&reservation)
    })
    .await?;

    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}/events` endpoint.
///
/// Returns the booking's audit trail, oldest first.
async fn handle_list_booking_events(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Vec<BookingEventResponse>>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let response: Vec<BookingEventResponse> = run_blocking(move || {
        list_booking_events(&persistence, booking_id)?
            .iter()
            .map(BookingEventResponse::from_event)
            .collect::<Result<Vec<BookingEventResponse>, ReservationError>>()
    })
    .await?;

    Ok(Json(response))
}

/// Handler for GET `/users/{user_id}/bookings` endpoint.
async fn handle_list_user_bookings(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ListBookingsApiResponse>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let lookup: String = user_id.clone();
    let bookings: Vec<ReservationResponse> = run_blocking(move || {
        list_reservations(&persistence, &lookup)?
            .iter()
            .map(ReservationResponse::from_reservation)
            .collect::<Result<Vec<ReservationResponse>, ReservationError>>()
    })
    .await?;

    Ok(Json(ListBookingsApiResponse { user_id, bookings }))
}

/// Handler for POST `/bookings/{booking_id}/cancel` endpoint.
///
/// A repeat cancellation is answered with 409 and `"benign": true`.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<CancelBookingApiRequest>,
) -> Result<Json<ReservationResponse>, HttpError> {
    info!(
        booking_id = booking_id,
        actor_id = %req.actor_id,
        role = %req.actor_role,
        "Handling cancel_booking request"
    );

    let role: ActorRole = parse_role(&req.actor_role)?;
    let actor: Actor = Actor::new(req.actor_id, role);
    let persistence: Persistence = app_state.persistence;
    let now: OffsetDateTime = OffsetDateTime::now_utc();

    let response: ReservationResponse = run_blocking(move || {
        let reservation: Reservation =
            cancel_reservation(&persistence, booking_id, &actor, &req.reason, now)?;
        ReservationResponse::from_reservation(&reservation)
    })
    .await?;

    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/settlement` endpoint.
///
/// Called by the payment notifier. Repeated or late callbacks are answered
/// with 200 and `"applied": false`.
async fn handle_settle_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<SettlementApiRequest>,
) -> Result<Json<SettlementResponse>, HttpError> {
    info!(
        booking_id = booking_id,
        outcome = ?req.outcome,
        "Handling settlement callback"
    );

    let persistence: Persistence = app_state.persistence;
    let now: OffsetDateTime = OffsetDateTime::now_utc();

    let response: SettlementResponse = run_blocking(move || {
        let settlement: Settlement = settle_payment(&persistence, booking_id, req.outcome, now)?;
        let reason: Option<String> = match &settlement {
            Settlement::Applied(_) => None,
            Settlement::NoOp { reason, .. } => Some((*reason).to_string()),
        };
        Ok(SettlementResponse {
            applied: settlement.is_applied(),
            reason,
            reservation: ReservationResponse::from_reservation(settlement.reservation())?,
        })
    })
    .await?;

    Ok(Json(response))
}

/// Handler for POST `/tours/{tour_id}/price-preview` endpoint.
///
/// Prices a prospective booking without reserving seats.
async fn handle_price_preview(
    AxumState(app_state): AxumState<AppState>,
    Path(tour_id): Path<i64>,
    Json(req): Json<PricePreviewApiRequest>,
) -> Result<Json<PriceBreakdown>, HttpError> {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let booking_date: OffsetDateTime =
        timestamp_or_now("booking_date", req.booking_date.as_deref(), now)?;
    let request: PreviewPriceRequest = PreviewPriceRequest {
        tour_id,
        booking_date,
        guests: req.guests,
        single_room_count: req.single_room_count,
    };

    let persistence: Persistence = app_state.persistence;
    let price: PriceBreakdown =
        run_blocking(move || preview_price(&persistence, &request, utc_today(now))).await?;

    Ok(Json(price))
}

/// Handler for POST `/tours` endpoint.
async fn handle_create_tour(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateTourApiRequest>,
) -> Result<(StatusCode, Json<TourResponse>), HttpError> {
    info!(name = %req.name, "Handling create_tour request");

    let request: CreateTourRequest = CreateTourRequest {
        name: req.name,
        start_date: req.start_date,
        end_date: req.end_date,
        base_price: req.base_price,
        max_group_size: req.max_group_size,
    };
    let persistence: Persistence = app_state.persistence;
    let response: TourResponse = run_blocking(move || {
        create_tour(&persistence, &request).map(|tour| TourResponse::from(&tour))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/tours` endpoint.
async fn handle_list_tours(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<TourResponse>>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let tours: Vec<TourResponse> = run_blocking(move || {
        list_tours(&persistence).map(|tours| tours.iter().map(TourResponse::from).collect())
    })
    .await?;

    Ok(Json(tours))
}

/// Handler for GET `/tours/{tour_id}` endpoint.
async fn handle_get_tour(
    AxumState(app_state): AxumState<AppState>,
    Path(tour_id): Path<i64>,
) -> Result<Json<TourResponse>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let tour: TourResponse = run_blocking(move || {
        get_tour(&persistence, tour_id).map(|tour| TourResponse::from(&tour))
    })
    .await?;

    Ok(Json(tour))
}

/// Handler for POST `/tours/{tour_id}/rules` endpoint.
///
/// The body is a tagged rule payload: `{"kind": ..., "payload": ...}`.
async fn handle_create_rule(
    AxumState(app_state): AxumState<AppState>,
    Path(tour_id): Path<i64>,
    Json(payload): Json<RulePayload>,
) -> Result<(StatusCode, Json<PricingRuleResponse>), HttpError> {
    info!(
        tour_id = tour_id,
        kind = %payload.kind(),
        "Handling create_rule request"
    );

    let persistence: Persistence = app_state.persistence;
    let rule: PricingRuleResponse = run_blocking(move || {
        create_pricing_rule(&persistence, tour_id, &payload)
            .map(|rule| PricingRuleResponse::from(&rule))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

/// Handler for GET `/tours/{tour_id}/rules` endpoint.
async fn handle_list_rules(
    AxumState(app_state): AxumState<AppState>,
    Path(tour_id): Path<i64>,
    Query(query): Query<ListRulesQuery>,
) -> Result<Json<Vec<PricingRuleResponse>>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let rules: Vec<PricingRuleResponse> = run_blocking(move || {
        list_pricing_rules(&persistence, tour_id, query.active_only)
            .map(|rules| rules.iter().map(PricingRuleResponse::from).collect())
    })
    .await?;

    Ok(Json(rules))
}

/// Handler for PUT `/rules/{rule_id}` endpoint.
///
/// Replaces a rule's payload. The rule kind cannot change.
async fn handle_update_rule(
    AxumState(app_state): AxumState<AppState>,
    Path(rule_id): Path<i64>,
    Json(payload): Json<RulePayload>,
) -> Result<Json<PricingRuleResponse>, HttpError> {
    info!(rule_id = rule_id, "Handling update_rule request");

    let persistence: Persistence = app_state.persistence;
    let rule: PricingRuleResponse = run_blocking(move || {
        update_pricing_rule(&persistence, rule_id, &payload)
            .map(|rule| PricingRuleResponse::from(&rule))
    })
    .await?;

    Ok(Json(rule))
}

/// Handler for POST `/rules/{rule_id}/active` endpoint.
async fn handle_set_rule_active(
    AxumState(app_state): AxumState<AppState>,
    Path(rule_id): Path<i64>,
    Json(req): Json<RuleActivationApiRequest>,
) -> Result<Json<PricingRuleResponse>, HttpError> {
    info!(
        rule_id = rule_id,
        is_active = req.is_active,
        "Handling set_rule_active request"
    );

    let persistence: Persistence = app_state.persistence;
    let rule: PricingRuleResponse = run_blocking(move || {
        set_pricing_rule_active(&persistence, rule_id, req.is_active)
            .map(|rule| PricingRuleResponse::from(&rule))
    })
    .await?;

    Ok(Json(rule))
}

/// Handler for POST `/admin/sweep` endpoint.
///
/// Runs one expiry sweep immediately.
async fn handle_run_sweep(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<SweepReport>, HttpError> {
    let AppState {
        persistence,
        policy,
    } = app_state;
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let report: SweepReport = run_blocking(move || run_sweep(&persistence, &policy, now)).await?;

    Ok(Json(report))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/bookings", post(handle_create_booking))
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/{booking_id}/cancel", post(handle_cancel_booking))
        .route(
            "/bookings/{booking_id}/settlement",
            post(handle_settle_booking),
        )
        .route(
            "/bookings/{booking_id}/events",
            get(handle_list_booking_events),
        )
        .route("/users/{user_id}/bookings", get(handle_list_user_bookings))
        .route("/tours", post(handle_create_tour).get(handle_list_tours))
        .route("/tours/{tour_id}", get(handle_get_tour))
        .route("/tours/{tour_id}/price-preview", post(handle_price_preview))
        .route(
            "/tours/{tour_id}/rules",
            post(handle_create_rule).get(handle_list_rules),
        )
        .route("/rules/{rule_id}", put(handle_update_rule))
        .route("/rules/{rule_id}/active", post(handle_set_rule_active))
        .route("/admin/sweep", post(handle_run_sweep))
        .with_state(app_state)
}

/// Resolves when the process is asked to stop.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Tour Booking Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!(pool_size = args.pool_size, "Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path, args.pool_size)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let policy: ReservationPolicy = args.policy();
    let sweeper: tokio::task::JoinHandle<()> = spawn_expiry_sweeper(persistence.clone(), policy);

    let app_state: AppState = AppState {
        persistence,
        policy,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped");

    Ok(())
}

#[cfg(test)]
mod tests;
