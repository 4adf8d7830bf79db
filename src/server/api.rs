use crate::error::AppError;
use crate::models::{Market, SortOrder};
use crate::server::AppState;
use crate::services::{get_assets_by_market, parse_as_of, QueryOptions, StoreStats};
use crate::worker::SchedulerStatus;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": message.into()
        })),
    )
        .into_response()
}

/// Health response: process, store and scheduler summary
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub current_system_time: String,
    pub store: StoreStats,
    pub scheduler_active: bool,
    pub scanning: bool,
}

/// GET /health
#[instrument(skip(app_state))]
pub async fn health_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let store = match app_state.store.stats().await {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %e, "Failed to read store statistics");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read store statistics");
        }
    };

    let health = HealthResponse {
        status: "ok",
        uptime_secs: app_state.started_at.elapsed().as_secs(),
        current_system_time: Utc::now().to_rfc3339(),
        store,
        scheduler_active: app_state.scheduler.is_active().await,
        scanning: app_state.scheduler.is_scanning(),
    };

    // No info logging for /health (too noisy)
    (StatusCode::OK, Json(health)).into_response()
}

/// Query parameters for /regimes
#[derive(Debug, Deserialize, Clone)]
pub struct RegimeParams {
    /// Ticker symbols to query (can be repeated: symbol=BTC&symbol=AAPL)
    pub symbol: Option<Vec<String>>,

    /// trending or ranging
    pub market: Option<String>,

    /// Maximum number of rows
    pub limit: Option<usize>,

    /// Confidence order: desc (default) or asc
    pub order: Option<String>,

    /// Point-in-time bound: RFC 3339, or YYYY-MM-DD for the end of that UTC day
    pub date: Option<String>,
}

/// GET /regimes - Assets classified as a given market, ordered by confidence
///
/// Examples:
/// - /regimes?symbol=BTC&symbol=ETH&market=trending
/// - /regimes?symbol=AAPL&market=ranging&order=asc&limit=5
/// - /regimes?symbol=BTC&market=trending&date=2024-06-15 (state as of the end of that day)
#[instrument(skip(app_state))]
pub async fn get_regimes_handler(
    State(app_state): State<AppState>,
    Query(params): Query<RegimeParams>,
) -> impl IntoResponse {
    let tickers: Vec<String> = params
        .symbol
        .unwrap_or_default()
        .into_iter()
        .flat_map(|s| {
            s.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        })
        .collect();

    if tickers.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "At least one symbol is required");
    }

    let market = match params.market.as_deref().map(str::parse::<Market>) {
        Some(Ok(market)) => market,
        Some(Err(e)) => {
            warn!(market = ?params.market, "Invalid market parameter");
            return error_response(StatusCode::BAD_REQUEST, e);
        }
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing market. Valid values: trending, ranging",
            );
        }
    };

    let order = match params.order.as_deref().map(str::parse::<SortOrder>) {
        Some(Ok(order)) => order,
        Some(Err(e)) => {
            warn!(order = ?params.order, "Invalid order parameter");
            return error_response(StatusCode::BAD_REQUEST, e);
        }
        None => SortOrder::default(),
    };

    let date = match params.date.as_deref().map(parse_as_of) {
        Some(Ok(date)) => Some(date),
        Some(Err(e)) => {
            warn!(date = ?params.date, "Invalid date parameter");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
        None => None,
    };

    let options = QueryOptions {
        limit: params.limit,
        order,
    };

    match get_assets_by_market(app_state.store.as_ref(), &tickers, market, options, date).await {
        Ok(assets) => {
            debug!(tickers = tickers.len(), rows = assets.len(), "Returning regimes");
            (StatusCode::OK, Json(assets)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Regime query failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Regime query failed")
        }
    }
}

/// GET /scan/status
pub async fn scan_status_handler(State(app_state): State<AppState>) -> Json<SchedulerStatus> {
    Json(app_state.scheduler.status().await)
}

/// POST /scan - Run one scan now; 409 when a scan is already running
#[instrument(skip(app_state))]
pub async fn trigger_scan_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    match app_state.scheduler.trigger_manual().await {
        Ok(report) => {
            info!(
                rows_saved = report.rows_saved,
                errors = report.errors.len(),
                failed = report.failed,
                "Manual scan completed"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(AppError::ScanInProgress) => {
            error_response(StatusCode::CONFLICT, AppError::ScanInProgress.to_string())
        }
        Err(e) => {
            error!(error = %e, "Manual scan failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SchedulerControlResponse {
    /// Whether this call changed the scheduler state
    pub changed: bool,
    pub status: SchedulerStatus,
}

/// POST /scan/start
#[instrument(skip(app_state))]
pub async fn start_scheduler_handler(State(app_state): State<AppState>) -> Json<SchedulerControlResponse> {
    let changed = app_state.scheduler.start().await;
    Json(SchedulerControlResponse {
        changed,
        status: app_state.scheduler.status().await,
    })
}

/// POST /scan/stop
#[instrument(skip(app_state))]
pub async fn stop_scheduler_handler(State(app_state): State<AppState>) -> Json<SchedulerControlResponse> {
    let changed = app_state.scheduler.stop().await;
    Json(SchedulerControlResponse {
        changed,
        status: app_state.scheduler.status().await,
    })
}
