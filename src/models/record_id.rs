//! Composite record id
//!
//! The indicator provider echoes back the `id` attached to every indicator request. The id is an
//! underscore-delimited string whose fields are read **by position**:
//!
//! | Index | Field     | Example   |
//! |-------|-----------|-----------|
//! | 0     | asset     | `crypto`  |
//! | 1     | venue     | `binance` |
//! | 2     | ticker    | `BTC`     |
//! | 3     | timeframe | `4h`      |
//! | 4     | indicator | `ema`     |
//! | 5     | period    | `100`     |
//!
//! Any change to this layout on either side is a breaking change to the provider contract.
//! Tickers containing the separator cannot be encoded and are rejected at composition.

use crate::constants::record_id;
use crate::error::{Error, Result};
use crate::models::{AssetClass, Timeframe};

/// Fields recovered from a composite record id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId {
    pub ticker: String,
    pub timeframe: Timeframe,
    pub indicator: String,
    pub period: u32,
}

impl RecordId {
    /// Build the id sent with an indicator request
    pub fn compose(
        asset: AssetClass,
        venue: &str,
        ticker: &str,
        timeframe: Timeframe,
        indicator: &str,
        period: u32,
    ) -> Result<String> {
        if ticker.is_empty() || ticker.contains(record_id::SEPARATOR) {
            return Err(Error::InvalidInput(format!(
                "Ticker '{}' cannot be encoded in a record id",
                ticker
            )));
        }

        Ok(format!(
            "{asset}{sep}{venue}{sep}{ticker}{sep}{timeframe}{sep}{indicator}{sep}{period}",
            asset = asset.as_str(),
            sep = record_id::SEPARATOR,
            venue = venue,
            ticker = ticker,
            timeframe = timeframe.as_str(),
            indicator = indicator,
            period = period,
        ))
    }

    /// Parse a composite id returned by the provider
    pub fn parse(id: &str) -> Result<Self> {
        let fields: Vec<&str> = id.split(record_id::SEPARATOR).collect();

        if fields.len() < record_id::FIELD_COUNT {
            return Err(Error::Parse(format!(
                "Record id '{}' has {} fields, expected at least {}",
                id,
                fields.len(),
                record_id::FIELD_COUNT
            )));
        }

        let ticker = fields[record_id::TICKER];
        if ticker.is_empty() {
            return Err(Error::Parse(format!("Record id '{}' has an empty ticker", id)));
        }

        let timeframe = fields[record_id::TIMEFRAME]
            .parse::<Timeframe>()
            .map_err(|e| Error::Parse(format!("Record id '{}': {}", id, e)))?;

        let period = fields[record_id::PERIOD].parse::<u32>().map_err(|e| {
            Error::Parse(format!(
                "Record id '{}': invalid period '{}': {}",
                id,
                fields[record_id::PERIOD],
                e
            ))
        })?;

        Ok(Self {
            ticker: ticker.to_string(),
            timeframe,
            indicator: fields[record_id::INDICATOR].to_string(),
            period,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_layout() {
        let id = RecordId::compose(AssetClass::Crypto, "binance", "BTC", Timeframe::Hour4, "ema", 100)
            .unwrap();
        assert_eq!(id, "crypto_binance_BTC_4h_ema_100");
    }

    #[test]
    fn test_parse_positional_fields() {
        let parsed = RecordId::parse("stocks_us_AAPL_1d_sma_50").unwrap();
        assert_eq!(parsed.ticker, "AAPL");
        assert_eq!(parsed.timeframe, Timeframe::Day1);
        assert_eq!(parsed.indicator, "sma");
        assert_eq!(parsed.period, 50);
    }

    #[test]
    fn test_parse_ignores_trailing_fields() {
        // the provider may append its own suffix after the period
        let parsed = RecordId::parse("crypto_binance_ETH_1h_adx_14_0").unwrap();
        assert_eq!(parsed.ticker, "ETH");
        assert_eq!(parsed.period, 14);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(RecordId::parse("crypto_binance_BTC_1h").is_err());
        assert!(RecordId::parse("crypto_binance_BTC_2h_ema_20").is_err());
        assert!(RecordId::parse("crypto_binance_BTC_1h_ema_x").is_err());
        assert!(RecordId::parse("crypto_binance__1h_ema_20").is_err());
    }

    #[test]
    fn test_compose_rejects_separator_in_ticker() {
        let err = RecordId::compose(AssetClass::Equity, "us", "BRK_B", Timeframe::Day1, "ema", 20);
        assert!(err.is_err());
    }
}
