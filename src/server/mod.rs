pub mod api;

use crate::error::Result;
use crate::services::SharedRegimeStore;
use crate::worker::SharedScanScheduler;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedRegimeStore,
    pub scheduler: SharedScanScheduler,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: SharedRegimeStore, scheduler: SharedScanScheduler) -> Self {
        Self {
            store,
            scheduler,
            started_at: Instant::now(),
        }
    }
}

// FromRef implementations to extract specific state components
impl FromRef<AppState> for SharedRegimeStore {
    fn from_ref(app_state: &AppState) -> SharedRegimeStore {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for SharedScanScheduler {
    fn from_ref(app_state: &AppState) -> SharedScanScheduler {
        app_state.scheduler.clone()
    }
}

/// Build the router with all routes
pub fn router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health_handler))
        .route("/regimes", get(api::get_regimes_handler))
        .route("/scan", post(api::trigger_scan_handler))
        .route("/scan/status", get(api::scan_status_handler))
        .route("/scan/start", post(api::start_scheduler_handler))
        .route("/scan/stop", post(api::stop_scheduler_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the axum server
pub async fn serve(app_state: AppState, port: u16) -> Result<()> {
    tracing::info!("Registering routes:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /regimes?symbol=BTC&symbol=AAPL&market=trending&limit=10&order=desc&date=2024-06-15");
    tracing::info!("  GET  /scan/status");
    tracing::info!("  POST /scan");
    tracing::info!("  POST /scan/start");
    tracing::info!("  POST /scan/stop");

    let app = router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::{
        CryptoSet, IndicatorBatch, Market, RawIndicatorRecord, RegimeClassification, TickerGroups, Timeframe,
    };
    use crate::services::{
        FixedClock, IndicatorProvider, RateLimitedFetcher, RateLimiter, RequestBatcher, SQLiteRegimeStore,
        ScanOrchestrator, UniverseSource,
    };
    use crate::worker::ScanScheduler;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    /// Returns ranging-flat values; blocks on `release` when `gated` is set
    #[derive(Default)]
    struct FakeProvider {
        gated: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl IndicatorProvider for FakeProvider {
        async fn fetch_batch(&self, batch: &IndicatorBatch) -> Result<Vec<RawIndicatorRecord>> {
            if self.gated.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(batch
                .sets
                .iter()
                .flat_map(|set| set.indicators.iter())
                .map(|req| {
                    let value = match req.indicator.as_str() {
                        "adx" => 10.0,
                        "volatility" => 0.01,
                        _ => 100.0,
                    };
                    RawIndicatorRecord::new(req.id.clone(), req.indicator.clone(), value)
                })
                .collect())
        }
    }

    struct NoDelay;

    #[async_trait]
    impl RateLimiter for NoDelay {
        async fn wait(&self) {}
    }

    async fn app(provider: Arc<FakeProvider>) -> (Router, SharedRegimeStore, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store: SharedRegimeStore = Arc::new(
            SQLiteRegimeStore::new(temp_dir.path().join("regimes.db"))
                .await
                .unwrap(),
        );

        let mut groups = HashMap::new();
        groups.insert("MAJORS".to_string(), vec!["BTC".to_string(), "ETH".to_string()]);

        let orchestrator = ScanOrchestrator::new(
            UniverseSource::Static(TickerGroups::new(groups)),
            RequestBatcher::new(CryptoSet::default()),
            RateLimitedFetcher::new(provider, Arc::new(NoDelay)),
            store.clone(),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())),
        );
        let scheduler = Arc::new(ScanScheduler::new(Arc::new(orchestrator), Duration::from_secs(3600)).unwrap());

        (router(AppState::new(store.clone(), scheduler)), store, temp_dir)
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn row(ticker: &str, confidence: f64, day: u32) -> RegimeClassification {
        RegimeClassification {
            ticker: ticker.to_string(),
            timeframe: Timeframe::Day1,
            market: Market::Trending,
            confidence,
            timestamp: Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _store, _dir) = app(Arc::default()).await;
        let (status, body) = send(&app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"]["total_rows"], 0);
        assert_eq!(body["scanning"], false);
    }

    #[tokio::test]
    async fn test_regimes_query() {
        let (app, store, _dir) = app(Arc::default()).await;
        store
            .append(&[row("BTC", 0.6, 1), row("ETH", 0.9, 1), row("SOL", 1.0, 1), row("BTC", 0.7, 20)])
            .await
            .unwrap();

        let (status, body) = send(&app, "GET", "/regimes?symbol=BTC&symbol=ETH&market=trending").await;
        assert_eq!(status, StatusCode::OK);
        let confidences: Vec<f64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["confidence"].as_f64().unwrap())
            .collect();
        assert_eq!(confidences, vec![0.9, 0.7, 0.6]);
        assert_eq!(body[0]["symbol"], "ETH");
        assert_eq!(body[0]["timeframe"], "1d");
        assert_eq!(body[0]["market"], "trending");

        // end of June 10 hides the June 20 row
        let (_, body) = send(
            &app,
            "GET",
            "/regimes?symbol=BTC&market=trending&order=asc&date=2024-06-10",
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["confidence"], 0.6);

        let (_, body) = send(&app, "GET", "/regimes?symbol=BTC,ETH&market=trending&limit=1").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["symbol"], "ETH");
    }

    #[tokio::test]
    async fn test_regimes_rejects_bad_parameters() {
        let (app, _store, _dir) = app(Arc::default()).await;

        for uri in [
            "/regimes?market=trending",
            "/regimes?symbol=BTC",
            "/regimes?symbol=BTC&market=sideways",
            "/regimes?symbol=BTC&market=trending&order=up",
            "/regimes?symbol=BTC&market=trending&date=June",
        ] {
            let (status, body) = send(&app, "GET", uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_manual_scan_and_conflict() {
        let provider = Arc::new(FakeProvider::default());
        let (app, store, _dir) = app(provider.clone()).await;

        let (status, report) = send(&app, "POST", "/scan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["trigger"], "manual");
        assert_eq!(report["rows_saved"], 6);
        assert_eq!(store.stats().await.unwrap().total_rows, 6);

        provider.gated.store(true, Ordering::SeqCst);
        let background = app.clone();
        let first = tokio::spawn(async move { send(&background, "POST", "/scan").await });
        provider.entered.notified().await;

        let (status, body) = send(&app, "POST", "/scan").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Scan already in progress");

        let (_, status_body) = send(&app, "GET", "/scan/status").await;
        assert_eq!(status_body["scanning"], true);

        provider.release.notify_one();
        let (status, _) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.stats().await.unwrap().total_rows, 12);

        let (_, body) = send(&app, "GET", "/regimes?symbol=BTC&market=ranging").await;
        assert_eq!(body.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_scheduler_controls() {
        let (app, _store, _dir) = app(Arc::default()).await;

        let (_, body) = send(&app, "POST", "/scan/start").await;
        assert_eq!(body["changed"], true);
        assert_eq!(body["status"]["active"], true);

        let (_, body) = send(&app, "POST", "/scan/start").await;
        assert_eq!(body["changed"], false);

        let (_, body) = send(&app, "POST", "/scan/stop").await;
        assert_eq!(body["changed"], true);
        assert_eq!(body["status"]["active"], false);

        let (_, body) = send(&app, "POST", "/scan/stop").await;
        assert_eq!(body["changed"], false);
    }
}
