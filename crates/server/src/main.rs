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

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use trip_queue::{DEFAULT_TICKET_REFERENCE_ATTEMPTS, Engine, EngineConfig};
use trip_queue_api::{
    ActiveBookingInfo, ApiError, BookingCancellationResponse, BookingConfirmationResponse,
    BookingDetailsResponse, BookingInfo, CancellationHistoryQuery, CreateBookingRequest,
    DEFAULT_CONFLICT_RETRIES, DriverTripResponse, EmailSearchQuery, EnqueueTripRequest,
    InvariantReportResponse, LatestPaymentResponse, NameSearchQuery, NextTripResponse,
    QueueStatusResponse, ReassignDriverRequest, ReassignVehicleRequest, RetryPolicy, RouteInfo,
    TripCancellationResponse, TripDetailsResponse, TripHistoryQuery, TripInfo,
    TripManifestResponse,
};
use trip_queue_domain::{BoardingPolicy, ErrorKind};
use trip_queue_persistence::{RegistrySeed, SqliteStore};

/// Trip Queue Server - HTTP server for terminal dispatch and seat booking
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Whether new trips start boarding (`immediate`) or waiting (`manual`)
    #[arg(long, default_value = "immediate")]
    boarding_policy: BoardingPolicy,

    /// Ticket references tried per booking before giving up
    #[arg(long, default_value_t = DEFAULT_TICKET_REFERENCE_ATTEMPTS)]
    ticket_attempts: u32,

    /// Retries of a write that lost a concurrency race
    #[arg(long, default_value_t = DEFAULT_CONFLICT_RETRIES)]
    conflict_retries: u32,

    /// JSON file of routes, vehicles and drivers loaded at startup
    #[arg(long)]
    seed: Option<PathBuf>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The engine over the `SQLite` store.
    engine: Arc<Engine<SqliteStore>>,
    /// Retry policy for state-changing requests.
    retry: RetryPolicy,
}

/// HTTP error wrapper that implements `IntoResponse`.
///
/// The body is the API error itself, `{ "kind": ..., "message": ... }`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The API error returned as the body.
    error: ApiError,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// Maps an error kind onto its HTTP status.
const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState | ErrorKind::SeatUnavailable | ErrorKind::NoAvailableTrip => {
            StatusCode::CONFLICT
        }
        ErrorKind::DuplicateReference | ErrorKind::ConcurrencyConflict => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = status_for(err.kind());
        if status.is_server_error() {
            error!(kind = %err.kind(), message = err.message(), "Request failed");
        }
        Self { status, error: err }
    }
}

/// Runs a blocking API handler off the async runtime.
///
/// Engine operations hold the store connection for their whole unit of
/// work, so they run on tokio's blocking pool.
async fn run_blocking<T, F>(app_state: &AppState, operation: F) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce(&Engine<SqliteStore>, &RetryPolicy) -> Result<T, ApiError> + Send + 'static,
{
    let engine: Arc<Engine<SqliteStore>> = Arc::clone(&app_state.engine);
    let retry: RetryPolicy = app_state.retry;

    let outcome: Result<T, ApiError> =
        tokio::task::spawn_blocking(move || operation(&engine, &retry))
            .await
            .map_err(|e| {
                HttpError::from(ApiError::new(
                    ErrorKind::Internal,
                    format!("Request task failed: {e}"),
                ))
            })?;
    outcome.map_err(HttpError::from)
}

// ============================================================================
// Queue
// ============================================================================

/// Handler for GET `/queue` endpoint.
async fn handle_get_queue(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<QueueStatusResponse>, HttpError> {
    let response = run_blocking(&app_state, |engine, _| {
        trip_queue_api::get_queue_status(engine, None)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/queue/{route_id}` endpoint.
async fn handle_get_route_queue(
    AxumState(app_state): AxumState<AppState>,
    Path(route_id): Path<i64>,
) -> Result<Json<QueueStatusResponse>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_queue_status(engine, Some(route_id))
    })
    .await?;
    Ok(Json(response))
}

// ============================================================================
// Trips
// ============================================================================

/// Handler for POST `/trips` endpoint.
///
/// Appends a trip to the tail of its route's queue.
async fn handle_enqueue_trip(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<EnqueueTripRequest>,
) -> Result<Json<TripInfo>, HttpError> {
    info!(
        route_id = req.route_id,
        vehicle_id = req.vehicle_id,
        driver_id = req.driver_id,
        "Handling enqueue_trip request"
    );
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::enqueue_trip(engine, retry, &req)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/trips/{trip_id}` endpoint.
async fn handle_get_trip(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripDetailsResponse>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_trip_details(engine, trip_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/trips/{trip_id}/manifest` endpoint.
async fn handle_get_manifest(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripManifestResponse>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_trip_manifest(engine, trip_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/trips/{trip_id}/manifest.csv` endpoint.
async fn handle_get_manifest_csv(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Response, HttpError> {
    let csv: String = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::export_trip_manifest_csv(engine, trip_id)
    })
    .await?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv).into_response())
}

/// Handler for POST `/trips/{trip_id}/open` endpoint.
async fn handle_open_boarding(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripInfo>, HttpError> {
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::open_boarding(engine, retry, trip_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/trips/{trip_id}/depart` endpoint.
async fn handle_depart_trip(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripInfo>, HttpError> {
    info!(trip_id, "Handling depart request");
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::depart_trip(engine, retry, trip_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/trips/{trip_id}/arrive` endpoint.
async fn handle_mark_arrived(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripInfo>, HttpError> {
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::mark_arrived(engine, retry, trip_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/trips/{trip_id}/cancel` endpoint.
async fn handle_cancel_trip(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripCancellationResponse>, HttpError> {
    info!(trip_id, "Handling cancel_trip request");
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::cancel_trip(engine, retry, trip_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/trips/{trip_id}/cancel-with-refunds` endpoint.
async fn handle_cancel_trip_with_refunds(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripCancellationResponse>, HttpError> {
    info!(trip_id, "Handling cancel_trip_with_refunds request");
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::cancel_trip_with_refunds(engine, retry, trip_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for PUT `/trips/{trip_id}/vehicle` endpoint.
async fn handle_reassign_vehicle(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
    Json(req): Json<ReassignVehicleRequest>,
) -> Result<Json<TripInfo>, HttpError> {
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::reassign_vehicle(engine, retry, trip_id, &req)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for PUT `/trips/{trip_id}/driver` endpoint.
async fn handle_reassign_driver(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
    Json(req): Json<ReassignDriverRequest>,
) -> Result<Json<TripInfo>, HttpError> {
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::reassign_driver(engine, retry, trip_id, &req)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/trips/{trip_id}/bookings` endpoint.
///
/// Books seats on a specific trip, typically a walk-in at the terminal.
async fn handle_book_for_trip(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingConfirmationResponse>, HttpError> {
    info!(trip_id, seat_count = req.seat_count, "Handling book_for_trip request");
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::book_for_trip(engine, retry, trip_id, &req)
    })
    .await?;
    Ok(Json(response))
}

// ============================================================================
// Routes
// ============================================================================

/// Handler for GET `/routes` endpoint.
async fn handle_list_routes(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<RouteInfo>>, HttpError> {
    let response = run_blocking(&app_state, |engine, _| {
        trip_queue_api::list_active_routes(engine)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/routes/{route_id}/bookings` endpoint.
///
/// Books seats on the front-most boarding trip with room.
async fn handle_smart_book(
    AxumState(app_state): AxumState<AppState>,
    Path(route_id): Path<i64>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingConfirmationResponse>, HttpError> {
    info!(route_id, seat_count = req.seat_count, "Handling smart_book request");
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::smart_book(engine, retry, route_id, &req)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/routes/{route_id}/next-trip` endpoint.
async fn handle_next_trip(
    AxumState(app_state): AxumState<AppState>,
    Path(route_id): Path<i64>,
) -> Result<Json<NextTripResponse>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_next_available_trip(engine, route_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/routes/{route_id}/trips` endpoint.
async fn handle_available_trips(
    AxumState(app_state): AxumState<AppState>,
    Path(route_id): Path<i64>,
) -> Result<Json<Vec<TripInfo>>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_available_trips(engine, route_id)
    })
    .await?;
    Ok(Json(response))
}

// ============================================================================
// Drivers
// ============================================================================

/// Handler for GET `/drivers/{driver_id}/current-trip` endpoint.
async fn handle_current_trip(
    AxumState(app_state): AxumState<AppState>,
    Path(driver_id): Path<i64>,
) -> Result<Json<DriverTripResponse>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_current_trip_for_driver(engine, driver_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/drivers/{driver_id}/upcoming-trips` endpoint.
async fn handle_upcoming_trips(
    AxumState(app_state): AxumState<AppState>,
    Path(driver_id): Path<i64>,
) -> Result<Json<Vec<TripInfo>>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_upcoming_trips_for_driver(engine, driver_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/drivers/{driver_id}/trip-history?limit=` endpoint.
async fn handle_trip_history(
    AxumState(app_state): AxumState<AppState>,
    Path(driver_id): Path<i64>,
    Query(query): Query<TripHistoryQuery>,
) -> Result<Json<Vec<TripInfo>>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_trip_history_for_driver(engine, driver_id, &query)
    })
    .await?;
    Ok(Json(response))
}

// ============================================================================
// Bookings
// ============================================================================

/// Handler for GET `/bookings/{booking_id}` endpoint.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingDetailsResponse>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_booking_details(engine, booking_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/cancel` endpoint.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingCancellationResponse>, HttpError> {
    info!(booking_id, "Handling cancel_booking request");
    let response = run_blocking(&app_state, move |engine, retry| {
        trip_queue_api::cancel_booking(engine, retry, booking_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}/payment` endpoint.
async fn handle_latest_payment(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<LatestPaymentResponse>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_latest_payment(engine, booking_id)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/reference/{ticket_reference}` endpoint.
async fn handle_booking_by_reference(
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_reference): Path<String>,
) -> Result<Json<BookingDetailsResponse>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_booking_by_reference(engine, &ticket_reference)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/search?email=` endpoint.
async fn handle_search_by_email(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<EmailSearchQuery>,
) -> Result<Json<Vec<BookingInfo>>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::search_bookings_by_email(engine, &query)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/search/name?name=` endpoint.
async fn handle_search_by_name(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<NameSearchQuery>,
) -> Result<Json<Vec<BookingInfo>>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::search_bookings_by_name(engine, &query)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/cancellations?limit=` endpoint.
async fn handle_cancellation_history(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<CancellationHistoryQuery>,
) -> Result<Json<Vec<BookingInfo>>, HttpError> {
    let response = run_blocking(&app_state, move |engine, _| {
        trip_queue_api::get_cancellation_history(engine, &query)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/active` endpoint.
async fn handle_active_bookings(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<ActiveBookingInfo>>, HttpError> {
    let response = run_blocking(&app_state, |engine, _| {
        trip_queue_api::list_active_bookings(engine)
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET `/audit/invariants` endpoint.
async fn handle_verify_invariants(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<InvariantReportResponse>, HttpError> {
    let response =
        run_blocking(&app_state, |engine, _| trip_queue_api::verify_invariants(engine)).await?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/queue", get(handle_get_queue))
        .route("/queue/{route_id}", get(handle_get_route_queue))
        .route("/trips", post(handle_enqueue_trip))
        .route("/trips/{trip_id}", get(handle_get_trip))
        .route("/trips/{trip_id}/manifest", get(handle_get_manifest))
        .route("/trips/{trip_id}/manifest.csv", get(handle_get_manifest_csv))
        .route("/trips/{trip_id}/open", post(handle_open_boarding))
        .route("/trips/{trip_id}/depart", post(handle_depart_trip))
        .route("/trips/{trip_id}/arrive", post(handle_mark_arrived))
        .route("/trips/{trip_id}/cancel", post(handle_cancel_trip))
        .route(
            "/trips/{trip_id}/cancel-with-refunds",
            post(handle_cancel_trip_with_refunds),
        )
        .route("/trips/{trip_id}/vehicle", put(handle_reassign_vehicle))
        .route("/trips/{trip_id}/driver", put(handle_reassign_driver))
        .route("/trips/{trip_id}/bookings", post(handle_book_for_trip))
        .route("/routes", get(handle_list_routes))
        .route("/routes/{route_id}/bookings", post(handle_smart_book))
        .route("/routes/{route_id}/next-trip", get(handle_next_trip))
        .route("/routes/{route_id}/trips", get(handle_available_trips))
        .route("/drivers/{driver_id}/current-trip", get(handle_current_trip))
        .route("/drivers/{driver_id}/upcoming-trips", get(handle_upcoming_trips))
        .route("/drivers/{driver_id}/trip-history", get(handle_trip_history))
        .route("/bookings/active", get(handle_active_bookings))
        .route("/bookings/cancellations", get(handle_cancellation_history))
        .route("/bookings/search", get(handle_search_by_email))
        .route("/bookings/search/name", get(handle_search_by_name))
        .route(
            "/bookings/reference/{ticket_reference}",
            get(handle_booking_by_reference),
        )
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/{booking_id}/cancel", post(handle_cancel_booking))
        .route("/bookings/{booking_id}/payment", get(handle_latest_payment))
        .route("/audit/invariants", get(handle_verify_invariants))
        .with_state(app_state)
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

    info!("Initializing Trip Queue Server");

    // Initialize the store (in-memory or file-based based on CLI argument)
    let store: SqliteStore = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqliteStore::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqliteStore::new_in_memory()?
    };

    if let Some(seed_path) = &args.seed {
        info!("Seeding registry from: {}", seed_path.display());
        let document: String = std::fs::read_to_string(seed_path)?;
        store.seed_registry(&RegistrySeed::from_json(&document)?)?;
    }

    let config: EngineConfig = EngineConfig {
        boarding_policy: args.boarding_policy,
        ticket_reference_attempts: args.ticket_attempts,
    };
    info!(
        boarding_policy = %config.boarding_policy,
        ticket_attempts = config.ticket_reference_attempts,
        conflict_retries = args.conflict_retries,
        "Engine configured"
    );

    let app_state: AppState = AppState {
        engine: Arc::new(Engine::new(store, config)),
        retry: RetryPolicy::with_max_retries(args.conflict_retries),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
