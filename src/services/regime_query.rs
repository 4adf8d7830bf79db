use crate::error::{Error, Result};
use crate::models::{Market, RegimeQuery, SortOrder, Timeframe};
use crate::services::RegimeStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Limit and ordering for [`get_assets_by_market`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct QueryOptions {
    pub limit: Option<usize>,
    #[serde(default)]
    pub order: SortOrder,
}

/// One row of the exposed market query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRegime {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub market: Market,
    pub confidence: f64,
}

/// Assets currently (or as of `date`) classified as `market`, ordered by confidence
///
/// Rows created after `date` are never returned, so historical views stay stable while new
/// scans keep appending.
pub async fn get_assets_by_market(
    store: &dyn RegimeStore,
    tickers: &[String],
    market: Market,
    options: QueryOptions,
    date: Option<DateTime<Utc>>,
) -> Result<Vec<AssetRegime>> {
    let mut query = RegimeQuery::new(tickers.to_vec(), market).order(options.order);
    if let Some(limit) = options.limit {
        query = query.limit(limit);
    }
    if let Some(date) = date {
        query = query.as_of(date);
    }

    let rows = store.query(&query).await?;

    debug!(
        tickers = tickers.len(),
        market = %market,
        rows = rows.len(),
        as_of = ?date,
        "Market query completed"
    );

    Ok(rows
        .into_iter()
        .map(|row| AssetRegime {
            symbol: row.ticker,
            timeframe: row.timeframe,
            market: row.market,
            confidence: row.confidence,
        })
        .collect())
}

/// Parse a query date: RFC 3339, or `YYYY-MM-DD` meaning the last millisecond of that UTC day
pub fn parse_as_of(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        Error::InvalidInput(format!(
            "Invalid date '{}'. Expected RFC 3339 or YYYY-MM-DD",
            value
        ))
    })?;

    date.and_hms_milli_opt(23, 59, 59, 999)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::InvalidInput(format!("Invalid date '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegimeClassification;
    use crate::services::SQLiteRegimeStore;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_parse_as_of() {
        assert_eq!(
            parse_as_of("2024-03-01T12:00:00Z").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            parse_as_of("2024-03-01T12:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
        );

        let end_of_day = parse_as_of("2024-03-01").unwrap();
        assert_eq!(
            end_of_day,
            Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999)
        );

        assert!(matches!(parse_as_of("yesterday"), Err(Error::InvalidInput(_))));
        assert!(parse_as_of("2024-13-01").is_err());
    }

    #[tokio::test]
    async fn test_point_in_time_market_query() {
        let temp_dir = tempdir().unwrap();
        let store = SQLiteRegimeStore::new(temp_dir.path().join("regimes.db")).await.unwrap();

        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let cutoff = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        let t3 = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();

        for (ts, confidence) in [(t1, 0.6), (t2, 0.7), (t3, 0.9)] {
            store
                .append(&[RegimeClassification {
                    ticker: "NVDA".to_string(),
                    timeframe: Timeframe::Hour4,
                    market: Market::Trending,
                    confidence,
                    timestamp: ts,
                }])
                .await
                .unwrap();
        }

        let tickers = vec!["NVDA".to_string()];
        let assets = get_assets_by_market(
            &store,
            &tickers,
            Market::Trending,
            QueryOptions::default(),
            Some(cutoff),
        )
        .await
        .unwrap();

        let confidences: Vec<f64> = assets.iter().map(|a| a.confidence).collect();
        assert_eq!(confidences, vec![0.7, 0.6]);
        assert_eq!(assets[0].symbol, "NVDA");
        assert_eq!(assets[0].timeframe, Timeframe::Hour4);

        // without a date every row is visible
        let assets = get_assets_by_market(
            &store,
            &tickers,
            Market::Trending,
            QueryOptions { limit: Some(1), order: SortOrder::Desc },
            None,
        )
        .await
        .unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].confidence, 0.9);

        // wrong market filters everything out
        let assets = get_assets_by_market(&store, &tickers, Market::Ranging, QueryOptions::default(), None)
            .await
            .unwrap();
        assert!(assets.is_empty());
    }
}
