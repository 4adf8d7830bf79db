use crate::error::{AppError, Result};
use crate::models::{RegimeClassification, RegimeQuery, ScanResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, QueryBuilder, Row, Sqlite, SqlitePool};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Append-only store of classification rows
#[async_trait]
pub trait RegimeStore: Send + Sync {
    /// Append one row per classification; never updates existing rows
    async fn append(&self, classifications: &[RegimeClassification]) -> Result<usize>;

    /// Rows matching `query`, ordered by confidence
    async fn query(&self, query: &RegimeQuery) -> Result<Vec<ScanResult>>;

    async fn stats(&self) -> Result<StoreStats>;
}

pub type SharedRegimeStore = Arc<dyn RegimeStore>;

/// Row counts for health reporting
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct StoreStats {
    pub total_rows: i64,
    /// Distinct scan timestamps, one per completed cycle
    pub scans: i64,
    pub latest_scan_at: Option<DateTime<Utc>>,
}

/// Database schema version for migrations
const DB_SCHEMA_VERSION: &str = "1";

/// SQLite-backed scan result store
#[derive(Debug)]
pub struct SQLiteRegimeStore {
    pool: SqlitePool,
    database_path: PathBuf,
}

impl SQLiteRegimeStore {
    /// Open (or create) the database file and ensure the schema exists
    pub async fn new(database_path: PathBuf) -> Result<Self> {
        info!("Initializing SQLite database at: {:?}", database_path);

        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(&database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePool::connect_with(connect_options).await?;

        let store = Self { pool, database_path };
        store.initialize_database().await?;

        info!("SQLite database initialized successfully");
        Ok(store)
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    async fn initialize_database(&self) -> Result<()> {
        // created_at is epoch milliseconds (UTC) so the as-of bound compares exactly
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scan_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                timeframe TEXT NOT NULL,
                market TEXT NOT NULL CHECK (market IN ('trending', 'ranging')),
                confidence REAL NOT NULL CHECK (confidence >= 0.0 AND confidence <= 1.0),
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let indexes = vec![
            // Primary query pattern: tickers + market, bounded by time
            "CREATE INDEX IF NOT EXISTS idx_scan_results_ticker_market_time ON scan_results(ticker, market, created_at)",
            // Confidence ordering
            "CREATE INDEX IF NOT EXISTS idx_scan_results_market_confidence ON scan_results(market, confidence DESC)",
            // Scan history
            "CREATE INDEX IF NOT EXISTS idx_scan_results_time ON scan_results(created_at DESC)",
        ];

        for index in indexes {
            sqlx::query(index).execute(&self.pool).await?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)")
            .bind(DB_SCHEMA_VERSION)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite database connection pool closed");
    }

    fn row_to_scan_result(row: sqlx::sqlite::SqliteRow) -> Result<ScanResult> {
        let timeframe: String = row.try_get("timeframe")?;
        let market: String = row.try_get("market")?;
        let created_at_ms: i64 = row.try_get("created_at")?;

        Ok(ScanResult {
            id: row.try_get("id")?,
            ticker: row.try_get("ticker")?,
            timeframe: timeframe.parse().map_err(AppError::Database)?,
            market: market.parse().map_err(AppError::Database)?,
            confidence: row.try_get("confidence")?,
            created_at: DateTime::<Utc>::from_timestamp_millis(created_at_ms).ok_or_else(|| {
                AppError::Database(format!("Invalid created_at value: {}", created_at_ms))
            })?,
        })
    }
}

#[async_trait]
impl RegimeStore for SQLiteRegimeStore {
    async fn append(&self, classifications: &[RegimeClassification]) -> Result<usize> {
        if classifications.is_empty() {
            return Ok(0);
        }

        if let Some(bad) = classifications
            .iter()
            .find(|c| !(0.0..=1.0).contains(&c.confidence))
        {
            return Err(AppError::InvalidInput(format!(
                "Confidence {} for {} {} is outside [0, 1]",
                bad.confidence, bad.ticker, bad.timeframe
            )));
        }

        let mut transaction = self.pool.begin().await?;
        let mut inserted = 0;

        for classification in classifications {
            let result = sqlx::query(
                r#"
                INSERT INTO scan_results (ticker, timeframe, market, confidence, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&classification.ticker)
            .bind(classification.timeframe.as_str())
            .bind(classification.market.as_str())
            .bind(classification.confidence)
            .bind(classification.timestamp.timestamp_millis())
            .execute(&mut *transaction)
            .await?;

            inserted += result.rows_affected() as usize;
        }

        transaction.commit().await?;
        debug!(rows = inserted, "Appended scan results");
        Ok(inserted)
    }

    async fn query(&self, query: &RegimeQuery) -> Result<Vec<ScanResult>> {
        if query.tickers.is_empty() || query.limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, ticker, timeframe, market, confidence, created_at FROM scan_results WHERE market = ",
        );
        builder.push_bind(query.market.as_str());

        builder.push(" AND ticker IN (");
        let mut tickers = builder.separated(", ");
        for ticker in &query.tickers {
            tickers.push_bind(ticker.clone());
        }
        tickers.push_unseparated(")");

        if let Some(as_of) = query.as_of {
            builder.push(" AND created_at <= ");
            builder.push_bind(as_of.timestamp_millis());
        }

        builder.push(format!(
            " ORDER BY confidence {}, created_at DESC, id DESC",
            query.order.as_sql()
        ));

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit as i64);
        }

        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.into_iter().map(Self::row_to_scan_result).collect()
    }

    async fn stats(&self) -> Result<StoreStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total_rows, COUNT(DISTINCT created_at) AS scans, MAX(created_at) AS latest FROM scan_results",
        )
        .fetch_one(&self.pool)
        .await?;

        let latest: Option<i64> = row.try_get("latest")?;

        Ok(StoreStats {
            total_rows: row.try_get("total_rows")?,
            scans: row.try_get("scans")?,
            latest_scan_at: latest.and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Market, SortOrder, Timeframe};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn row(ticker: &str, market: Market, confidence: f64, timestamp: DateTime<Utc>) -> RegimeClassification {
        RegimeClassification {
            ticker: ticker.to_string(),
            timeframe: Timeframe::Day1,
            market,
            confidence,
            timestamp,
        }
    }

    async fn store(dir: &tempfile::TempDir) -> SQLiteRegimeStore {
        SQLiteRegimeStore::new(dir.path().join("nested").join("regimes.db"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_database_creation() {
        let temp_dir = tempdir().unwrap();
        let db = store(&temp_dir).await;
        assert!(db.database_path().exists());
        assert_eq!(db.stats().await.unwrap(), StoreStats::default());
        db.close().await;
    }

    #[tokio::test]
    async fn test_append_never_overwrites() {
        let temp_dir = tempdir().unwrap();
        let db = store(&temp_dir).await;

        db.append(&[row("BTC", Market::Trending, 0.7, at(1))]).await.unwrap();
        db.append(&[row("BTC", Market::Trending, 0.9, at(2))]).await.unwrap();

        let rows = db
            .query(&RegimeQuery::new(vec!["BTC".to_string()], Market::Trending))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.scans, 2);
        assert_eq!(stats.latest_scan_at, Some(at(2)));
    }

    #[tokio::test]
    async fn test_point_in_time_bound_is_inclusive() {
        let temp_dir = tempdir().unwrap();
        let db = store(&temp_dir).await;

        db.append(&[
            row("ETH", Market::Ranging, 0.6, at(1)),
            row("ETH", Market::Ranging, 0.7, at(2)),
            row("ETH", Market::Ranging, 0.8, at(4)),
        ])
        .await
        .unwrap();

        let cutoff = at(3);
        let rows = db
            .query(&RegimeQuery::new(vec!["ETH".to_string()], Market::Ranging).as_of(cutoff))
            .await
            .unwrap();
        let times: Vec<DateTime<Utc>> = rows.iter().map(|r| r.created_at).collect();
        assert_eq!(times, vec![at(2), at(1)]);

        // a row created exactly at the bound is visible
        let rows = db
            .query(&RegimeQuery::new(vec!["ETH".to_string()], Market::Ranging).as_of(at(4)))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_filters_order_and_limit() {
        let temp_dir = tempdir().unwrap();
        let db = store(&temp_dir).await;

        db.append(&[
            row("BTC", Market::Trending, 0.5, at(1)),
            row("ETH", Market::Trending, 0.9, at(1)),
            row("SOL", Market::Trending, 0.7, at(1)),
            row("AAPL", Market::Trending, 1.0, at(1)),
            row("BTC", Market::Ranging, 1.0, at(1)),
        ])
        .await
        .unwrap();

        let tickers = vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()];

        let rows = db
            .query(&RegimeQuery::new(tickers.clone(), Market::Trending))
            .await
            .unwrap();
        let confidences: Vec<f64> = rows.iter().map(|r| r.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.7, 0.5]);
        assert!(rows.iter().all(|r| r.market == Market::Trending));

        let rows = db
            .query(
                &RegimeQuery::new(tickers.clone(), Market::Trending)
                    .order(SortOrder::Asc)
                    .limit(2),
            )
            .await
            .unwrap();
        let symbols: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "SOL"]);
    }

    #[tokio::test]
    async fn test_empty_tickers_returns_nothing() {
        let temp_dir = tempdir().unwrap();
        let db = store(&temp_dir).await;
        db.append(&[row("BTC", Market::Trending, 0.5, at(1))]).await.unwrap();

        let rows = db.query(&RegimeQuery::new(vec![], Market::Trending)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_confidence() {
        let temp_dir = tempdir().unwrap();
        let db = store(&temp_dir).await;

        let err = db
            .append(&[row("BTC", Market::Trending, 1.2, at(1))])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(db.stats().await.unwrap().total_rows, 0);
    }
}
