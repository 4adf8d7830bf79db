use crate::models::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market regime label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    Trending,
    Ranging,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Trending => "trending",
            Market::Ranging => "ranging",
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trending" => Ok(Market::Trending),
            "ranging" => Ok(Market::Ranging),
            _ => Err(format!("Invalid market: {}. Valid options: trending, ranging", s)),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence ordering for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid order: {}. Valid options: asc, desc", s)),
        }
    }
}

/// Classifier output for one (ticker, timeframe)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeClassification {
    pub ticker: String,
    pub timeframe: Timeframe,
    pub market: Market,
    /// Always within [0, 1]
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Persisted classification row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: i64,
    pub ticker: String,
    pub timeframe: Timeframe,
    pub market: Market,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Filter for confidence-ordered, point-in-time reads
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeQuery {
    pub tickers: Vec<String>,
    pub market: Market,
    /// Inclusive upper bound on `created_at`
    pub as_of: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub order: SortOrder,
}

impl RegimeQuery {
    pub fn new(tickers: Vec<String>, market: Market) -> Self {
        Self {
            tickers,
            market,
            as_of: None,
            limit: None,
            order: SortOrder::default(),
        }
    }

    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_round_trip_through_str() {
        assert_eq!("Trending".parse::<Market>().unwrap(), Market::Trending);
        assert_eq!(Market::Ranging.to_string(), "ranging");
        assert!("sideways".parse::<Market>().is_err());
    }

    #[test]
    fn test_sort_order_default_is_desc() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!("asc".parse::<SortOrder>().unwrap().as_sql(), "ASC");
    }
}
