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
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use stayrate::{EngineConfig, PricingEngine};
use stayrate_api::{
    AcceptSuggestionRequest, ApiError, BlockDatesRequest, BulkBlockRequest, BulkUnblockRequest,
    CalendarMutationResponse, CreatePropertyRequest, CreatePropertyResponse, GetCalendarResponse,
    GetMonthPricingResponse, ListBlockedDatesResponse, PriceSuggestionResponse,
    SetCustomPricingRequest, SuggestPriceRequest, UnblockDatesRequest, accept_suggestion,
    block_dates, bulk_block, bulk_unblock, create_property, get_calendar, get_month_pricing,
    get_suggestion, list_blocked_dates, reject_suggestion, set_custom_pricing, suggest_price,
    unblock_dates,
};
use time::{Date, OffsetDateTime};
use tracing::info;

/// StayRate Server - HTTP server for the StayRate pricing engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Bounded wait for per-property calendar locks, in milliseconds
    #[arg(long, default_value_t = 2000)]
    lock_wait_ms: u64,
}

/// Application state shared across handlers.
///
/// The engine is fully thread-safe; handlers share it through an `Arc`
/// without any outer lock.
#[derive(Clone)]
struct AppState {
    /// The pricing and availability engine.
    engine: Arc<PricingEngine>,
}

/// Query parameters for the calendar overview.
#[derive(Debug, Deserialize)]
struct CalendarQuery {
    /// First date of the range.
    start_date: Date,
    /// Last date of the range (inclusive).
    end_date: Date,
}

/// Query parameters for month pricing.
#[derive(Debug, Deserialize)]
struct MonthQuery {
    /// The month in `YYYY-MM` form.
    month: String,
}

/// JSON error payload returned on every failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// The conflicting dates, present only on booking conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    conflicting_dates: Option<Vec<Date>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// The conflicting dates, for booking conflicts.
    conflicting_dates: Option<Vec<Date>>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            conflicting_dates: self.conflicting_dates,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::RetryLater { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let conflicting_dates: Option<Vec<Date>> = match &err {
            ApiError::Conflict {
                conflicting_dates, ..
            } => Some(conflicting_dates.clone()),
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            conflicting_dates,
        }
    }
}

/// Handler for POST `/properties`.
async fn handle_create_property(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<CreatePropertyRequest>,
) -> Result<Json<CreatePropertyResponse>, HttpError> {
    let response: CreatePropertyResponse = create_property(&state.engine, req)?;
    Ok(Json(response))
}

/// Handler for GET `/properties/{id}/calendar`.
async fn handle_get_calendar(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<GetCalendarResponse>, HttpError> {
    let response: GetCalendarResponse = get_calendar(
        &state.engine,
        property_id,
        query.start_date,
        query.end_date,
        OffsetDateTime::now_utc().date(),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/properties/{id}/calendar/pricing`.
async fn handle_get_month_pricing(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<GetMonthPricingResponse>, HttpError> {
    let response: GetMonthPricingResponse = get_month_pricing(
        &state.engine,
        property_id,
        &query.month,
        OffsetDateTime::now_utc().date(),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/properties/{id}/calendar/blocked-dates`.
async fn handle_list_blocked_dates(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
) -> Result<Json<ListBlockedDatesResponse>, HttpError> {
    let response: ListBlockedDatesResponse = list_blocked_dates(&state.engine, property_id)?;
    Ok(Json(response))
}

/// Handler for POST `/properties/{id}/block-dates`.
async fn handle_block_dates(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
    Json(req): Json<BlockDatesRequest>,
) -> Result<Json<CalendarMutationResponse>, HttpError> {
    let response: CalendarMutationResponse = block_dates(&state.engine, property_id, req)?;
    Ok(Json(response))
}

/// Handler for POST `/properties/{id}/unblock-dates`.
async fn handle_unblock_dates(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
    Json(req): Json<UnblockDatesRequest>,
) -> Result<Json<CalendarMutationResponse>, HttpError> {
    let response: CalendarMutationResponse = unblock_dates(&state.engine, property_id, req)?;
    Ok(Json(response))
}

/// Handler for POST `/properties/{id}/calendar/bulk-block`.
async fn handle_bulk_block(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
    Json(req): Json<BulkBlockRequest>,
) -> Result<Json<CalendarMutationResponse>, HttpError> {
    let response: CalendarMutationResponse = bulk_block(&state.engine, property_id, req)?;
    Ok(Json(response))
}

/// Handler for POST `/properties/{id}/calendar/bulk-unblock`.
async fn handle_bulk_unblock(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
    Json(req): Json<BulkUnblockRequest>,
) -> Result<Json<CalendarMutationResponse>, HttpError> {
    let response: CalendarMutationResponse = bulk_unblock(&state.engine, property_id, req)?;
    Ok(Json(response))
}

/// Handler for POST `/properties/{id}/custom-pricing`.
async fn handle_set_custom_pricing(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
    Json(req): Json<SetCustomPricingRequest>,
) -> Result<Json<CalendarMutationResponse>, HttpError> {
    let response: CalendarMutationResponse = set_custom_pricing(&state.engine, property_id, req)?;
    Ok(Json(response))
}

/// Handler for POST `/properties/{id}/price-suggestions`.
async fn handle_suggest_price(
    AxumState(state): AxumState<AppState>,
    Path(property_id): Path<i64>,
    Json(req): Json<SuggestPriceRequest>,
) -> Result<Json<PriceSuggestionResponse>, HttpError> {
    let response: PriceSuggestionResponse = suggest_price(
        &state.engine,
        property_id,
        req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/price-suggestions/{id}`.
async fn handle_get_suggestion(
    AxumState(state): AxumState<AppState>,
    Path(suggestion_id): Path<i64>,
) -> Result<Json<PriceSuggestionResponse>, HttpError> {
    let response: PriceSuggestionResponse = get_suggestion(&state.engine, suggestion_id)?;
    Ok(Json(response))
}

/// Handler for POST `/price-suggestions/{id}/accept`.
async fn handle_accept_suggestion(
    AxumState(state): AxumState<AppState>,
    Path(suggestion_id): Path<i64>,
    Json(req): Json<AcceptSuggestionRequest>,
) -> Result<Json<PriceSuggestionResponse>, HttpError> {
    let response: PriceSuggestionResponse = accept_suggestion(
        &state.engine,
        suggestion_id,
        req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/price-suggestions/{id}/reject`.
async fn handle_reject_suggestion(
    AxumState(state): AxumState<AppState>,
    Path(suggestion_id): Path<i64>,
) -> Result<Json<PriceSuggestionResponse>, HttpError> {
    let response: PriceSuggestionResponse =
        reject_suggestion(&state.engine, suggestion_id, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Builds the application router with all routes.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/properties", post(handle_create_property))
        .route("/properties/{id}/calendar", get(handle_get_calendar))
        .route(
            "/properties/{id}/calendar/pricing",
            get(handle_get_month_pricing),
        )
        .route(
            "/properties/{id}/calendar/blocked-dates",
            get(handle_list_blocked_dates),
        )
        .route("/properties/{id}/block-dates", post(handle_block_dates))
        .route("/properties/{id}/unblock-dates", post(handle_unblock_dates))
        .route(
            "/properties/{id}/calendar/bulk-block",
            post(handle_bulk_block),
        )
        .route(
            "/properties/{id}/calendar/bulk-unblock",
            post(handle_bulk_unblock),
        )
        .route(
            "/properties/{id}/custom-pricing",
            post(handle_set_custom_pricing),
        )
        .route(
            "/properties/{id}/price-suggestions",
            post(handle_suggest_price),
        )
        .route("/price-suggestions/{id}", get(handle_get_suggestion))
        .route(
            "/price-suggestions/{id}/accept",
            post(handle_accept_suggestion),
        )
        .route(
            "/price-suggestions/{id}/reject",
            post(handle_reject_suggestion),
        )
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

    info!("Initializing StayRate Server");

    let config: EngineConfig = EngineConfig {
        lock_wait: Duration::from_millis(args.lock_wait_ms),
        ..EngineConfig::default()
    };
    let app_state: AppState = AppState {
        engine: Arc::new(PricingEngine::new(config)),
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
