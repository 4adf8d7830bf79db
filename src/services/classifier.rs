//! Regime Classifier
//!
//! Pure scoring rule mapping one indicator bundle to a market label and confidence.
//!
//! ## Derived signals
//!
//! | Signal          | Definition                                   |
//! |-----------------|----------------------------------------------|
//! | trend strength  | \|emaFast - emaSlow\| / emaSlow x 100        |
//! | adx trending    | adx > 25                                     |
//! | low adx         | adx < 20                                     |
//! | ma crossover    | emaFast > emaSlow                            |
//! | price above MAs | price > emaFast and price > sma              |
//! | low volatility  | volatility < 0.02                            |
//! | tight MAs       | \|emaFast - sma\| / sma < 0.03               |
//!
//! A zero divisor makes the ratio 0. Missing indicators read as 0.
//!
//! ## Scores
//!
//! | Trending                          | pts | Ranging         | pts |
//! |-----------------------------------|-----|-----------------|-----|
//! | adx trending                      | 4   | low adx         | 4   |
//! | trend strength > 2                | 3   | low volatility  | 3   |
//! | crossover and price above MAs     | 2   | tight MAs       | 3   |
//! | volatility > 0.03                 | 1   |                 |     |
//!
//! Trending wins only with a strictly higher score; a tie is ranging.

use crate::constants::{thresholds, weights};
use crate::models::{IndicatorBundle, IndicatorKey, Market, RegimeClassification};
use chrono::{DateTime, Utc};

/// Trending and ranging scores in tenths of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegimeScores {
    pub trending: u32,
    pub ranging: u32,
}

impl RegimeScores {
    pub fn trending_score(&self) -> f64 {
        to_confidence(self.trending)
    }

    pub fn ranging_score(&self) -> f64 {
        to_confidence(self.ranging)
    }

    /// Label and confidence; ties resolve to ranging
    pub fn decide(&self) -> (Market, f64) {
        if self.trending > self.ranging {
            (Market::Trending, self.trending_score())
        } else {
            (Market::Ranging, self.ranging_score())
        }
    }
}

fn to_confidence(points: u32) -> f64 {
    (points as f64 / weights::SCALE as f64).clamp(0.0, 1.0)
}

/// `numerator / divisor`, or 0 when the divisor is zero or the result is not finite
fn guarded_ratio(numerator: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        return 0.0;
    }
    let ratio = numerator / divisor;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

pub fn score(bundle: &IndicatorBundle) -> RegimeScores {
    let ema_fast = bundle.value_or_zero(&IndicatorKey::EmaFast);
    let ema_slow = bundle.value_or_zero(&IndicatorKey::EmaSlow);
    let adx = bundle.value_or_zero(&IndicatorKey::Adx);
    let sma = bundle.value_or_zero(&IndicatorKey::Sma);
    let volatility = bundle.value_or_zero(&IndicatorKey::Volatility);
    let price = bundle.value_or_zero(&IndicatorKey::Price);

    let trend_strength = guarded_ratio((ema_fast - ema_slow).abs(), ema_slow) * 100.0;
    let adx_trending = adx > thresholds::ADX_TRENDING;
    let low_adx = adx < thresholds::ADX_LOW;
    let ma_crossover = ema_fast > ema_slow;
    let price_above_mas = price > ema_fast && price > sma;
    let low_volatility = volatility < thresholds::LOW_VOLATILITY;
    let tight_mas = guarded_ratio((ema_fast - sma).abs(), sma) < thresholds::TIGHT_MA_RATIO;

    let mut trending = 0;
    if adx_trending {
        trending += weights::ADX_TRENDING;
    }
    if trend_strength > thresholds::TREND_STRENGTH_PCT {
        trending += weights::TREND_STRENGTH;
    }
    if ma_crossover && price_above_mas {
        trending += weights::MA_ALIGNMENT;
    }
    if volatility > thresholds::HIGH_VOLATILITY {
        trending += weights::HIGH_VOLATILITY;
    }

    let mut ranging = 0;
    if low_adx {
        ranging += weights::LOW_ADX;
    }
    if low_volatility {
        ranging += weights::LOW_VOLATILITY;
    }
    if tight_mas {
        ranging += weights::TIGHT_MAS;
    }

    RegimeScores { trending, ranging }
}

/// Classify one bundle, stamping the result with `timestamp`
pub fn classify(bundle: &IndicatorBundle, timestamp: DateTime<Utc>) -> RegimeClassification {
    let (market, confidence) = score(bundle).decide();

    RegimeClassification {
        ticker: bundle.ticker.clone(),
        timeframe: bundle.timeframe,
        market,
        confidence,
        timestamp,
    }
}
