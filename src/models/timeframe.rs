use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle timeframe a regime is classified on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1-hour candles
    #[serde(rename = "1h")]
    Hour1,
    /// 4-hour candles
    #[serde(rename = "4h")]
    Hour4,
    /// Daily candles
    #[serde(rename = "1d")]
    Day1,
}

impl Timeframe {
    /// Every timeframe scanned in a cycle, in request order
    pub const ALL: [Timeframe; 3] = [Timeframe::Hour1, Timeframe::Hour4, Timeframe::Day1];

    /// Provider interval string ("1h", "4h", "1d")
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Day1 => "1d",
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    /// Parse from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" => Ok(Timeframe::Hour1),
            "4h" => Ok(Timeframe::Hour4),
            "1d" => Ok(Timeframe::Day1),
            _ => Err(format!("Invalid timeframe: {}. Valid options: 1h, 4h, 1d", s)),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
