use crate::constants::{DEFAULT_BATCH_DELAY_MS, DEFAULT_SCAN_INTERVAL_SECS, MAX_CONSTRUCTS_PER_BATCH};
use crate::error::{Error, Result};
use crate::utils;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a scan cycle and its scheduler
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Base URL of the indicator provider
    pub provider_url: String,

    /// Provider credential, sent with every bulk call
    pub provider_secret: String,

    /// SQLite file holding scan results
    pub database_path: PathBuf,

    /// JSON file with category -> tickers
    pub ticker_groups_path: PathBuf,

    /// Optional crypto listing overriding the built-in crypto set
    pub crypto_list_path: Option<PathBuf>,

    /// Period between scheduled scans
    pub scan_interval: Duration,

    /// Delay before every provider call except the first
    pub batch_delay: Duration,

    /// Descriptor-sets per provider call
    pub batch_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            provider_url: utils::DEFAULT_PROVIDER_URL.to_string(),
            provider_secret: String::new(),
            database_path: PathBuf::from(utils::DEFAULT_DATABASE_PATH),
            ticker_groups_path: PathBuf::from(utils::DEFAULT_TICKER_GROUPS_PATH),
            crypto_list_path: None,
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            batch_size: MAX_CONSTRUCTS_PER_BATCH,
        }
    }
}

impl ScanConfig {
    /// Assemble config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            provider_url: utils::get_provider_url(),
            provider_secret: utils::get_provider_secret().unwrap_or_default(),
            database_path: utils::get_database_path(),
            ticker_groups_path: utils::get_ticker_groups_path(),
            crypto_list_path: utils::get_crypto_list_path(),
            scan_interval: Duration::from_secs(utils::get_scan_interval_secs()),
            batch_delay: Duration::from_millis(utils::get_batch_delay_ms()),
            batch_size: MAX_CONSTRUCTS_PER_BATCH,
        }
    }

    /// Checks required before a scan can talk to the provider
    pub fn validate(&self) -> Result<()> {
        if self.provider_secret.trim().is_empty() {
            return Err(Error::Config(
                "PROVIDER_SECRET is not set; the indicator provider requires a credential".to_string(),
            ));
        }
        if self.batch_size == 0 || self.batch_size > MAX_CONSTRUCTS_PER_BATCH {
            return Err(Error::Config(format!(
                "batch_size must be between 1 and {}, got {}",
                MAX_CONSTRUCTS_PER_BATCH, self.batch_size
            )));
        }
        if self.scan_interval.is_zero() {
            return Err(Error::Config("scan interval must be greater than zero".to_string()));
        }
        Ok(())
    }
}
