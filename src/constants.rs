//! Scanner Constants
//!
//! Fixed parameters of the indicator provider contract and the regime scoring rule.
//!
//! ## Provider Limits
//!
//! The bulk endpoint accepts at most [`MAX_CONSTRUCTS_PER_BATCH`] descriptor-sets per call, and
//! calls must be spaced by [`DEFAULT_BATCH_DELAY_MS`] to stay under the provider's rate limit.
//!
//! ## Composite Record Id
//!
//! Every indicator request carries an id that the provider echoes back unchanged:
//!
//! ```text
//! {asset}_{venue}_{ticker}_{timeframe}_{indicator}_{period}
//!    0       1       2         3           4          5
//! ```
//!
//! The organizer reads the fields by position, so this layout is a wire contract.

/// Maximum number of descriptor-sets sent in one provider call
pub const MAX_CONSTRUCTS_PER_BATCH: usize = 3;

/// Delay inserted before every batch except the first
pub const DEFAULT_BATCH_DELAY_MS: u64 = 2000;

/// Default period between scheduled scans
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 3600;

/// HTTP timeout for a single provider call
pub const PROVIDER_TIMEOUT_SECS: u64 = 60;

/// Quote currency appended to crypto symbols (`BTC` -> `BTC/USDT`)
pub const CRYPTO_QUOTE_CURRENCY: &str = "USDT";

/// Venue used for crypto descriptor-sets
pub const CRYPTO_EXCHANGE: &str = "binance";

/// Field positions inside the composite record id
pub mod record_id {
    pub const SEPARATOR: char = '_';
    pub const ASSET: usize = 0;
    pub const VENUE: usize = 1;
    pub const TICKER: usize = 2;
    pub const TIMEFRAME: usize = 3;
    pub const INDICATOR: usize = 4;
    pub const PERIOD: usize = 5;
    /// Minimum number of fields a well-formed id has
    pub const FIELD_COUNT: usize = 6;
}

/// EMA period that marks the slow moving average; any other EMA period is the fast one
pub const EMA_SLOW_PERIOD: u32 = 100;

/// Regime scoring thresholds
pub mod thresholds {
    /// ADX above this is a trending signal
    pub const ADX_TRENDING: f64 = 25.0;
    /// ADX below this is a ranging signal
    pub const ADX_LOW: f64 = 20.0;
    /// Percent spread between fast and slow EMA that counts as a strong trend
    pub const TREND_STRENGTH_PCT: f64 = 2.0;
    /// Volatility above this adds to the trending score
    pub const HIGH_VOLATILITY: f64 = 0.03;
    /// Volatility below this adds to the ranging score
    pub const LOW_VOLATILITY: f64 = 0.02;
    /// Relative distance between fast EMA and SMA that counts as "tight"
    pub const TIGHT_MA_RATIO: f64 = 0.03;
}

/// Regime scoring weights, in tenths of a point
///
/// Scores are summed as integers and converted once, so equal scores compare equal and a tie
/// always resolves to ranging.
pub mod weights {
    pub const ADX_TRENDING: u32 = 4;
    pub const TREND_STRENGTH: u32 = 3;
    pub const MA_ALIGNMENT: u32 = 2;
    pub const HIGH_VOLATILITY: u32 = 1;

    pub const LOW_ADX: u32 = 4;
    pub const LOW_VOLATILITY: u32 = 3;
    pub const TIGHT_MAS: u32 = 3;

    /// Points that make a score of 1.0
    pub const SCALE: u32 = 10;
}

/// Crypto symbols recognised when no crypto list file is configured
pub const DEFAULT_CRYPTO_SYMBOLS: &[&str] = &[
    "BTC", "ETH", "BNB", "SOL", "XRP", "ADA", "DOGE", "AVAX", "DOT", "LINK",
    "TRX", "TON", "MATIC", "LTC", "BCH", "SHIB", "UNI", "ATOM", "XLM", "NEAR",
    "APT", "ARB", "OP", "SUI", "INJ", "FIL", "ETC", "HBAR", "ICP", "AAVE",
    "PEPE", "RNDR", "TIA", "SEI", "WIF",
];
