// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP server for the Care Ledger System.
//!
//! The server exposes the ledger engine over JSON routes. All writes go
//! through a single shared persistence adapter behind a mutex, which
//! serializes writers within this process; the invoice version check in
//! the persistence layer guards against writers outside it.

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
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use care_ledger_api::{
    ApiError, AuthenticatedActor, CreateInvoiceRequest, CreateInvoiceResponse,
    CreateRateBlockRequest, CreateRateBlockResponse, EditLineItemRequest, EditLineItemResponse,
    GenerateLedgerRequest, GenerateLedgerResponse, GetInvoiceResponse, ListAuditEventsResponse,
    ListInvoicesResponse, LockLedgerRequest, LockLedgerResponse, authenticate_stub,
    create_invoice, create_rate_block, edit_line_item, generate_ledger, get_invoice,
    list_audit_events, list_invoices, lock_ledger,
};
use care_ledger_persistence::SqlitePersistence;

/// Care Ledger Server - HTTP server for the Care Ledger System
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
///
/// The persistence layer sits behind a mutex so that ledger writes are
/// serialized within this process.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for the care ledger.
    persistence: Arc<Mutex<SqlitePersistence>>,
}

/// JSON body for error responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// JSON body for the health endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct HealthResponse {
    /// Service status.
    status: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { .. } => Self {
                status: StatusCode::FORBIDDEN,
                message: err.to_string(),
            },
            ApiError::DomainRuleViolation { .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: err.to_string(),
            },
            ApiError::InvalidInput { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            ApiError::ResourceNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            ApiError::Conflict { .. } => Self {
                status: StatusCode::CONFLICT,
                message: err.to_string(),
            },
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal API error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Authenticates the actor fields carried on a request body.
fn authenticate(actor_id: &str, actor_role: &str) -> Result<AuthenticatedActor, HttpError> {
    authenticate_stub(actor_id, actor_role).map_err(HttpError::from)
}

/// Handler for GET `/health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Handler for POST `/rate_blocks`.
///
/// Creates a rate block after validation and overlap checking.
async fn handle_create_rate_block(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<CreateRateBlockRequest>,
) -> Result<Json<CreateRateBlockResponse>, HttpError> {
    let authenticated: AuthenticatedActor =
        authenticate(&request.actor_id, &request.actor_role)?;

    let mut persistence = state.persistence.lock().await;
    let response: CreateRateBlockResponse =
        create_rate_block(&mut persistence, &authenticated, &request)?;
    Ok(Json(response))
}

/// Handler for POST `/invoices`.
///
/// Creates a new, empty, unlocked invoice.
async fn handle_create_invoice(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<CreateInvoiceResponse>, HttpError> {
    let authenticated: AuthenticatedActor =
        authenticate(&request.actor_id, &request.actor_role)?;

    let mut persistence = state.persistence.lock().await;
    let response: CreateInvoiceResponse =
        create_invoice(&mut persistence, &authenticated, &request)?;
    Ok(Json(response))
}

/// Handler for GET `/invoices`.
async fn handle_list_invoices(
    AxumState(state): AxumState<AppState>,
) -> Result<Json<ListInvoicesResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let response: ListInvoicesResponse = list_invoices(&mut persistence)?;
    Ok(Json(response))
}

/// Handler for GET `/invoices/{invoice_id}`.
async fn handle_get_invoice(
    AxumState(state): AxumState<AppState>,
    Path(invoice_id): Path<i64>,
) -> Result<Json<GetInvoiceResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let response: GetInvoiceResponse = get_invoice(&mut persistence, invoice_id)?;
    Ok(Json(response))
}

/// Handler for POST `/generate_ledger`.
///
/// Regenerates the invoice's ledger from delivered visits and reports
/// "N of M visits priced, K flagged".
async fn handle_generate_ledger(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<GenerateLedgerRequest>,
) -> Result<Json<GenerateLedgerResponse>, HttpError> {
    let authenticated: AuthenticatedActor =
        authenticate(&request.actor_id, &request.actor_role)?;

    let mut persistence = state.persistence.lock().await;
    let response: GenerateLedgerResponse =
        generate_ledger(&mut persistence, &authenticated, &request)?;
    Ok(Json(response))
}

/// Handler for POST `/lock_ledger`.
///
/// Locks or unlocks an invoice's ledger; unlocking requires the
/// administrator role.
async fn handle_lock_ledger(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<LockLedgerRequest>,
) -> Result<Json<LockLedgerResponse>, HttpError> {
    let authenticated: AuthenticatedActor =
        authenticate(&request.actor_id, &request.actor_role)?;

    let mut persistence = state.persistence.lock().await;
    let response: LockLedgerResponse = lock_ledger(&mut persistence, &authenticated, &request)?;
    Ok(Json(response))
}

/// Handler for POST `/edit_line_item`.
///
/// Manually adjusts one ledger line and recomputes the invoice totals.
async fn handle_edit_line_item(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<EditLineItemRequest>,
) -> Result<Json<EditLineItemResponse>, HttpError> {
    let authenticated: AuthenticatedActor =
        authenticate(&request.actor_id, &request.actor_role)?;

    let mut persistence = state.persistence.lock().await;
    let response: EditLineItemResponse =
        edit_line_item(&mut persistence, &authenticated, &request)?;
    Ok(Json(response))
}

/// Handler for GET `/audit/timeline/{invoice_id}`.
async fn handle_get_audit_timeline(
    AxumState(state): AxumState<AppState>,
    Path(invoice_id): Path<i64>,
) -> Result<Json<ListAuditEventsResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let response: ListAuditEventsResponse = list_audit_events(&mut persistence, invoice_id)?;
    Ok(Json(response))
}

/// Builds the application router.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/rate_blocks", post(handle_create_rate_block))
        .route("/invoices", post(handle_create_invoice))
        .route("/invoices", get(handle_list_invoices))
        .route("/invoices/{invoice_id}", get(handle_get_invoice))
        .route("/generate_ledger", post(handle_generate_ledger))
        .route("/lock_ledger", post(handle_lock_ledger))
        .route("/edit_line_item", post(handle_edit_line_item))
        .route("/audit/timeline/{invoice_id}", get(handle_get_audit_timeline))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Care Ledger Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
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
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use care_ledger_api::CalculationInput;
    use care_ledger_domain::{ClientCategory, DayType, ServiceId, Visit};
    use rust_decimal::Decimal;
    use time::macros::{date, time};
    use tower::ServiceExt;

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: SqlitePersistence =
            SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
        }
    }

    fn rate_block_request() -> CreateRateBlockRequest {
        CreateRateBlockRequest {
            actor_id: String::from("op-1"),
            actor_role: String::from("operator"),
            cause_id: String::from("test-cause"),
            cause_description: String::from("Test configuration"),
            name: String::from("All week hourly"),
            applicable_days: vec![
                String::from("monday"),
                String::from("tuesday"),
                String::from("wednesday"),
                String::from("thursday"),
                String::from("friday"),
                String::from("saturday"),
                String::from("sunday"),
                String::from("bank_holiday"),
            ],
            rate_type: String::from("standard"),
            window_from: None,
            window_until: None,
            charge_basis: String::from("hours_minutes"),
            calculation: CalculationInput {
                method: String::from("rate_per_hour"),
                rate: Some(Decimal::from(10)),
                break_points: None,
                consecutive_hours_threshold: None,
            },
            linked_services: Vec::new(),
            bank_holiday_multiplier: Some(Decimal::from(2)),
            is_vatable: false,
        }
    }

    fn invoice_request() -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            actor_id: String::from("op-1"),
            actor_role: String::from("operator"),
            cause_id: String::from("test-cause"),
            cause_description: String::from("Test invoice"),
            client_id: 10,
            period_start: String::from("2026-03-01"),
            period_end: String::from("2026-03-31"),
            vat_rate: Decimal::new(20, 2),
        }
    }

    async fn post_json<T: Serialize>(app: Router, uri: &str, body: &T) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json<T: for<'de> Deserialize<'de>>(response: axum::response::Response) -> T {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    /// Seeds a rate block, two visits, and an invoice; returns the app
    /// state and invoice id.
    async fn seed_scenario() -> (AppState, i64) {
        let app_state: AppState = create_test_app_state();

        let response =
            post_json(build_router(app_state.clone()), "/rate_blocks", &rate_block_request())
                .await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        {
            let mut persistence = app_state.persistence.lock().await;
            let monday: Visit = Visit::new(
                0,
                10,
                date!(2026 - 03 - 02),
                DayType::Monday,
                time!(09:00),
                time!(11:00),
                ServiceId::new("personal-care"),
                ClientCategory::Standard,
            );
            let holiday: Visit = Visit::new(
                0,
                10,
                date!(2026 - 03 - 09),
                DayType::BankHoliday,
                time!(14:00),
                time!(15:00),
                ServiceId::new("personal-care"),
                ClientCategory::Standard,
            );
            persistence.save_visit(&monday).unwrap();
            persistence.save_visit(&holiday).unwrap();
        }

        let response =
            post_json(build_router(app_state.clone()), "/invoices", &invoice_request()).await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let created: CreateInvoiceResponse = body_json(response).await;

        (app_state, created.invoice.invoice_id.unwrap())
    }

    fn generate_request(invoice_id: i64) -> GenerateLedgerRequest {
        GenerateLedgerRequest {
            actor_id: String::from("op-1"),
            actor_role: String::from("operator"),
            cause_id: String::from("test-cause"),
            cause_description: String::from("Ledger run"),
            invoice_id,
        }
    }

    fn lock_request(invoice_id: i64, locked: bool) -> LockLedgerRequest {
        LockLedgerRequest {
            actor_id: String::from("op-1"),
            actor_role: String::from("operator"),
            cause_id: String::from("test-cause"),
            cause_description: String::from("Close"),
            invoice_id,
            locked,
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let health: HealthResponse = body_json(response).await;
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_generate_ledger_flow() {
        let (app_state, invoice_id): (AppState, i64) = seed_scenario().await;

        let response = post_json(
            build_router(app_state.clone()),
            "/generate_ledger",
            &generate_request(invoice_id),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let generated: GenerateLedgerResponse = body_json(response).await;
        assert_eq!(generated.summary, "2 of 2 visits priced, 0 flagged");
        assert_eq!(generated.invoice.net_amount, "40.00");
        assert_eq!(generated.invoice.total_invoiced_minutes, 180);
    }

    #[tokio::test]
    async fn test_locked_invoice_returns_conflict() {
        let (app_state, invoice_id): (AppState, i64) = seed_scenario().await;

        post_json(
            build_router(app_state.clone()),
            "/generate_ledger",
            &generate_request(invoice_id),
        )
        .await;
        let response = post_json(
            build_router(app_state.clone()),
            "/lock_ledger",
            &lock_request(invoice_id, true),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let response = post_json(
            build_router(app_state.clone()),
            "/generate_ledger",
            &generate_request(invoice_id),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::CONFLICT);

        // The stored ledger survives the rejected attempt
        let response = build_router(app_state)
            .oneshot(
                Request::builder()
                    .uri(format!("/invoices/{invoice_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let invoice: GetInvoiceResponse = body_json(response).await;
        assert_eq!(invoice.invoice.net_amount, "40.00");
        assert_eq!(invoice.invoice.lock_state, "locked");
    }

    #[tokio::test]
    async fn test_operator_cannot_unlock() {
        let (app_state, invoice_id): (AppState, i64) = seed_scenario().await;
        post_json(
            build_router(app_state.clone()),
            "/lock_ledger",
            &lock_request(invoice_id, true),
        )
        .await;

        let response = post_json(
            build_router(app_state.clone()),
            "/lock_ledger",
            &lock_request(invoice_id, false),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_invoice_is_not_found() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/invoices/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_rate_block_is_bad_request() {
        let app: Router = build_router(create_test_app_state());

        let mut request: CreateRateBlockRequest = rate_block_request();
        request.applicable_days = vec![String::from("someday")];

        let response = post_json(app, "/rate_blocks", &request).await;

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }
}
