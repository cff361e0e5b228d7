// BankSight - Web API Server
// JSON API over the data access layer: table browsing with filters, CRUD,
// the balance simulator, the 15 insights and CSV export.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use banksight::{
    adjust_balance, insights, run_insight, store, Database, Direction, Row, StoreError, Table,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Database>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Map the error taxonomy onto HTTP statuses.
fn status_for(error: &StoreError) -> StatusCode {
    match error {
        StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
        StoreError::NotFound { .. } | StoreError::UnknownTable(_) => StatusCode::NOT_FOUND,
        StoreError::InsufficientBalance { .. } => StatusCode::CONFLICT,
        StoreError::Sqlite(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: StoreError) -> Response {
    (
        status_for(&error),
        Json(ApiResponse::<Value>::err(error.to_string())),
    )
        .into_response()
}

/// Turn query-string pairs into a filter conjunction. `min_<col>` and
/// `max_<col>` become range bounds, anything else is column equality.
fn parse_filters(params: &HashMap<String, String>) -> Result<Vec<store::Filter>, StoreError> {
    let mut filters = Vec::new();
    for (key, raw) in params {
        if let Some(column) = key.strip_prefix("min_") {
            let value: f64 = raw.parse().map_err(|_| {
                StoreError::validation(column, format!("expected a number, got '{raw}'"))
            })?;
            filters.push(store::Filter::min(column, value));
        } else if let Some(column) = key.strip_prefix("max_") {
            let value: f64 = raw.parse().map_err(|_| {
                StoreError::validation(column, format!("expected a number, got '{raw}'"))
            })?;
            filters.push(store::Filter::max(column, value));
        } else {
            filters.push(store::Filter::eq(key.clone(), raw.clone()));
        }
    }
    Ok(filters)
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

#[derive(Serialize)]
struct TableInfo {
    name: &'static str,
    rows: i64,
}

/// GET /api/tables - List tables with row counts
async fn list_tables(State(state): State<AppState>) -> Response {
    let db = state.db.lock().unwrap();

    let mut tables = Vec::new();
    for table in Table::all() {
        match db.count(table) {
            Ok(rows) => tables.push(TableInfo {
                name: table.name(),
                rows,
            }),
            Err(e) => return error_response(e),
        }
    }
    Json(ApiResponse::ok(tables)).into_response()
}

/// GET /api/tables/:table - List rows, query params become filters
async fn list_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let db = state.db.lock().unwrap();

    let result = Table::parse(&table)
        .and_then(|table| Ok((table, parse_filters(&params)?)))
        .and_then(|(table, filters)| store::list(&db, table, &filters));

    match result {
        Ok(rows) => Json(ApiResponse::ok(rows)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/tables/:table - Create a row
async fn create_row(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(fields): Json<Row>,
) -> Response {
    let db = state.db.lock().unwrap();

    let result = Table::parse(&table).and_then(|table| store::create(&db, table, &fields));
    match result {
        Ok(()) => (StatusCode::CREATED, Json(ApiResponse::ok("created"))).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/tables/:table/:id - Partial update by primary key
async fn update_row(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, String)>,
    Json(fields): Json<Row>,
) -> Response {
    let db = state.db.lock().unwrap();

    let result = Table::parse(&table).and_then(|table| store::update(&db, table, &id, &fields));
    match result {
        Ok(()) => Json(ApiResponse::ok("updated")).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/tables/:table/:id - Hard row removal
async fn delete_row(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, String)>,
) -> Response {
    let db = state.db.lock().unwrap();

    let result = Table::parse(&table).and_then(|table| store::delete(&db, table, &id));
    match result {
        Ok(()) => Json(ApiResponse::ok("deleted")).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/tables/:table/export - Full table as text/csv
async fn export_table_csv(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Response {
    let db = state.db.lock().unwrap();

    let table = match Table::parse(&table) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };
    match banksight::table_to_csv(&db, table) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            csv,
        )
            .into_response(),
        Err(e) => {
            eprintln!("Error exporting {}: {e:#}", table.name());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Value>::err("export failed".into())),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
struct AdjustRequest {
    amount: f64,
    direction: String,
}

/// POST /api/accounts/:id/adjust - Balance simulator
async fn adjust_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AdjustRequest>,
) -> Response {
    let db = state.db.lock().unwrap();

    let direction = match Direction::parse(&request.direction) {
        Some(d) => d,
        None => {
            return error_response(StoreError::validation(
                "direction",
                format!("expected credit or debit, got '{}'", request.direction),
            ))
        }
    };

    match adjust_balance(&db, &id, request.amount, direction) {
        Ok(adjustment) => Json(ApiResponse::ok(adjustment)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/insights - List the insight templates
async fn list_insights() -> impl IntoResponse {
    Json(ApiResponse::ok(insights::INSIGHTS))
}

/// GET /api/insights/:key - Run one insight
async fn run_insight_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Response {
    let db = state.db.lock().unwrap();

    match run_insight(&db, &key) {
        Ok(result) => Json(ApiResponse::ok(result)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/insights/:key/export - Insight result as text/csv
async fn export_insight_csv(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Response {
    let db = state.db.lock().unwrap();

    let result = match run_insight(&db, &key) {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };
    match banksight::result_set_to_csv(&result) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            csv,
        )
            .into_response(),
        Err(e) => {
            eprintln!("Error exporting insight {key}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Value>::err("export failed".into())),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 BankSight - Web API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "banksight.db".to_string());
    let db_path = std::path::Path::new(&db_path);

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: cargo run -- init");
        eprintln!("   to create and seed it first.");
        std::process::exit(1);
    }

    let db = Database::open(db_path).expect("Failed to open database");
    println!("✓ Database opened: {:?}", db_path);

    let state = AppState {
        db: Arc::new(Mutex::new(db)),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/tables", get(list_tables))
        .route("/tables/:table", get(list_rows).post(create_row))
        .route("/tables/:table/export", get(export_table_csv))
        .route("/tables/:table/:id", axum::routing::put(update_row).delete(delete_row))
        .route("/accounts/:id/adjust", post(adjust_account))
        .route("/insights", get(list_insights))
        .route("/insights/:key", get(run_insight_handler))
        .route("/insights/:key/export", get(export_insight_csv))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   Tables:   http://localhost:3000/api/tables");
    println!("   Insights: http://localhost:3000/api/insights");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
