use std::path::PathBuf;

use crate::constants::{DEFAULT_BATCH_DELAY_MS, DEFAULT_SCAN_INTERVAL_SECS};

pub const DEFAULT_PROVIDER_URL: &str = "https://api.taapi.io";
pub const DEFAULT_DATABASE_PATH: &str = "data/regimes.db";
pub const DEFAULT_TICKER_GROUPS_PATH: &str = "ticker_group.json";
pub const DEFAULT_PORT: u16 = 8787;

/// Get indicator provider base URL from environment variable or use default
pub fn get_provider_url() -> String {
    std::env::var("PROVIDER_URL").unwrap_or_else(|_| DEFAULT_PROVIDER_URL.to_string())
}

/// Provider credential, if configured
pub fn get_provider_secret() -> Option<String> {
    std::env::var("PROVIDER_SECRET").ok().filter(|s| !s.trim().is_empty())
}

/// Get SQLite database path from environment variable or use default
pub fn get_database_path() -> PathBuf {
    std::env::var("DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATABASE_PATH))
}

/// Get ticker groups file from environment variable or use default
pub fn get_ticker_groups_path() -> PathBuf {
    std::env::var("TICKER_GROUPS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_TICKER_GROUPS_PATH))
}

/// Optional crypto listing overriding the built-in crypto set
pub fn get_crypto_list_path() -> Option<PathBuf> {
    std::env::var("CRYPTO_LIST_PATH").ok().map(PathBuf::from)
}

pub fn get_scan_interval_secs() -> u64 {
    parse_env_or("SCAN_INTERVAL_SECS", DEFAULT_SCAN_INTERVAL_SECS)
}

pub fn get_batch_delay_ms() -> u64 {
    parse_env_or("BATCH_DELAY_MS", DEFAULT_BATCH_DELAY_MS)
}

pub fn get_port() -> u16 {
    parse_env_or("PORT", DEFAULT_PORT)
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
