//! Indicator request and response shapes
//!
//! Outbound: [`IndicatorRequest`] (one indicator with its lookback) grouped into a
//! [`DescriptorSet`] per (symbol, timeframe), chunked into [`IndicatorBatch`]es.
//!
//! Inbound: flat [`RawIndicatorRecord`]s regrouped into one [`IndicatorBundle`] per
//! (ticker, timeframe).

use crate::models::{AssetClass, Timeframe};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Indicator families requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Ema,
    Adx,
    Sma,
    Volatility,
    Price,
}

impl IndicatorKind {
    /// Name understood by the provider
    pub fn provider_name(&self) -> &'static str {
        match self {
            IndicatorKind::Ema => "ema",
            IndicatorKind::Adx => "adx",
            IndicatorKind::Sma => "sma",
            IndicatorKind::Volatility => "volatility",
            IndicatorKind::Price => "price",
        }
    }
}

/// Indicator with its lookback period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    pub period: u32,
}

/// The six indicators requested for every (symbol, timeframe)
pub const INDICATOR_SET: [IndicatorSpec; 6] = [
    IndicatorSpec { kind: IndicatorKind::Ema, period: 20 },
    IndicatorSpec { kind: IndicatorKind::Ema, period: 100 },
    IndicatorSpec { kind: IndicatorKind::Adx, period: 14 },
    IndicatorSpec { kind: IndicatorKind::Sma, period: 50 },
    IndicatorSpec { kind: IndicatorKind::Volatility, period: 14 },
    IndicatorSpec { kind: IndicatorKind::Price, period: 1 },
];

/// One indicator inside a descriptor-set, serialized as the provider expects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRequest {
    pub id: String,
    pub indicator: String,
    pub period: u32,
}

/// All indicators for one (symbol, timeframe), sent as one provider "construct"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptorSet {
    /// Universe ticker this set was built for
    #[serde(skip)]
    pub ticker: String,
    #[serde(skip)]
    pub asset_class: AssetClass,
    /// Provider market type, only sent for equities
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub market_type: Option<String>,
    /// Exchange, only sent for crypto
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// Provider-formatted symbol (`BTC/USDT`, `AAPL`)
    pub symbol: String,
    pub interval: Timeframe,
    pub indicators: Vec<IndicatorRequest>,
}

/// Ordered group of descriptor-sets sent in one provider call
#[derive(Debug, Clone)]
pub struct IndicatorBatch {
    /// Zero-based position in the cycle
    pub index: usize,
    pub sets: Vec<DescriptorSet>,
}

impl IndicatorBatch {
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Distinct tickers carried by this batch
    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.sets.iter().map(|s| s.ticker.as_str()).collect();
        tickers.dedup();
        tickers
    }
}

/// Value payload of a provider record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    #[serde(default)]
    pub value: Option<f64>,
}

/// Flat record as returned by the provider bulk endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIndicatorRecord {
    pub id: String,
    pub indicator: String,
    #[serde(default)]
    pub result: RecordResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,
}

impl RawIndicatorRecord {
    pub fn new(id: impl Into<String>, indicator: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            indicator: indicator.into(),
            result: RecordResult { value: Some(value) },
            errors: Vec::new(),
        }
    }
}

/// Semantic indicator name inside a bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorKey {
    EmaFast,
    EmaSlow,
    Adx,
    Sma,
    Volatility,
    Price,
    /// Provider name with no scoring role, kept as-is
    Other(String),
}

impl IndicatorKey {
    /// Keys the classifier reads
    pub const SCORED: [IndicatorKey; 6] = [
        IndicatorKey::EmaFast,
        IndicatorKey::EmaSlow,
        IndicatorKey::Adx,
        IndicatorKey::Sma,
        IndicatorKey::Volatility,
        IndicatorKey::Price,
    ];

    /// Map a non-EMA provider name to its key
    pub fn from_provider_name(name: &str) -> Self {
        match name {
            "adx" => IndicatorKey::Adx,
            "sma" => IndicatorKey::Sma,
            "volatility" => IndicatorKey::Volatility,
            "price" => IndicatorKey::Price,
            other => IndicatorKey::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IndicatorKey::EmaFast => "emaFast",
            IndicatorKey::EmaSlow => "emaSlow",
            IndicatorKey::Adx => "adx",
            IndicatorKey::Sma => "sma",
            IndicatorKey::Volatility => "volatility",
            IndicatorKey::Price => "price",
            IndicatorKey::Other(name) => name,
        }
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named indicator values collected for one (ticker, timeframe) in one cycle
///
/// Bundles are allowed to be incomplete; absent values read as zero in the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorBundle {
    pub ticker: String,
    pub timeframe: Timeframe,
    values: HashMap<IndicatorKey, f64>,
}

impl IndicatorBundle {
    pub fn new(ticker: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            ticker: ticker.into(),
            timeframe,
            values: HashMap::new(),
        }
    }

    /// Builder-style insert, handy for fixtures
    pub fn with(mut self, key: IndicatorKey, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: IndicatorKey, value: f64) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &IndicatorKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn value_or_zero(&self, key: &IndicatorKey) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    /// Scored keys that have no value in this bundle
    pub fn missing(&self) -> Vec<IndicatorKey> {
        IndicatorKey::SCORED
            .iter()
            .filter(|key| !self.values.contains_key(key))
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_deserialize() {
        let json = r#"{"id": "crypto_binance_BTC_1h_ema_20", "indicator": "ema", "result": {"value": 42150.5}, "errors": []}"#;
        let record: RawIndicatorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.indicator, "ema");
        assert_eq!(record.result.value, Some(42150.5));
        assert!(record.errors.is_empty());
    }

    #[test]
    fn test_raw_record_with_provider_error() {
        let json = r#"{"id": "stocks_us_AAPL_1d_adx_14", "indicator": "adx", "result": {}, "errors": ["Not enough candles"]}"#;
        let record: RawIndicatorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.result.value, None);
        assert_eq!(record.errors.len(), 1);
    }

    #[test]
    fn test_descriptor_set_wire_shape() {
        let set = DescriptorSet {
            ticker: "BTC".to_string(),
            asset_class: AssetClass::Crypto,
            market_type: None,
            exchange: Some("binance".to_string()),
            symbol: "BTC/USDT".to_string(),
            interval: Timeframe::Hour1,
            indicators: vec![IndicatorRequest {
                id: "crypto_binance_BTC_1h_ema_20".to_string(),
                indicator: "ema".to_string(),
                period: 20,
            }],
        };

        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value["exchange"], "binance");
        assert_eq!(value["symbol"], "BTC/USDT");
        assert_eq!(value["interval"], "1h");
        assert!(value.get("ticker").is_none());
        assert!(value.get("type").is_none());
    }

    #[test]
    fn test_bundle_missing_keys() {
        let bundle = IndicatorBundle::new("ETH", Timeframe::Day1)
            .with(IndicatorKey::EmaFast, 1.0)
            .with(IndicatorKey::Adx, 30.0)
            .with(IndicatorKey::Other("rsi".to_string()), 55.0);

        let missing = bundle.missing();
        assert_eq!(missing.len(), 4);
        assert!(missing.contains(&IndicatorKey::EmaSlow));
        assert!(!bundle.is_complete());
        assert_eq!(bundle.value_or_zero(&IndicatorKey::Sma), 0.0);
        assert_eq!(bundle.len(), 3);
    }
}
