//! Cryptocurrency List Model
//!
//! Asset class is never stored per symbol. A ticker is crypto when it belongs to the known
//! crypto set, equity otherwise. The set comes from the built-in list or from a
//! crypto_top_100.json style listing.

use crate::constants::{CRYPTO_QUOTE_CURRENCY, DEFAULT_CRYPTO_SYMBOLS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Asset class derived from set membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equity,
    Crypto,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "stocks",
            AssetClass::Crypto => "crypto",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single entry of a crypto listing file
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoMetadata {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    pub symbol: String,
}

/// Cryptocurrency list container
#[derive(Debug, Deserialize)]
pub struct CryptoList {
    #[serde(default)]
    pub fetched_at: Option<String>,
    pub data: Vec<CryptoMetadata>,
}

/// Known crypto symbols used to tag asset class
#[derive(Debug, Clone)]
pub struct CryptoSet {
    symbols: HashSet<String>,
}

impl Default for CryptoSet {
    fn default() -> Self {
        Self::new(DEFAULT_CRYPTO_SYMBOLS.iter().map(|s| s.to_string()))
    }
}

impl CryptoSet {
    pub fn new<I: IntoIterator<Item = String>>(symbols: I) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
        }
    }

    /// Load the crypto set from a listing file
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path to a JSON listing with a `data[].symbol` array
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let path = file_path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read crypto list {}: {}", path.display(), e))
        })?;
        let list: CryptoList = serde_json::from_str(&contents)?;

        Ok(Self::new(list.data.into_iter().map(|c| c.symbol)))
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.symbols.contains(ticker)
    }

    pub fn asset_class(&self, ticker: &str) -> AssetClass {
        if self.contains(ticker) {
            AssetClass::Crypto
        } else {
            AssetClass::Equity
        }
    }

    /// Provider-facing symbol: crypto gets the quote currency, equities pass through
    pub fn provider_symbol(&self, ticker: &str) -> String {
        match self.asset_class(ticker) {
            AssetClass::Crypto => format!("{}/{}", ticker, CRYPTO_QUOTE_CURRENCY),
            AssetClass::Equity => ticker.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
