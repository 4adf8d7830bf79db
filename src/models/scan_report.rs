use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// What started a scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanTrigger {
    Scheduled,
    Manual,
}

/// Non-fatal error collected during a cycle
///
/// `batch_index` is set for per-batch fetch failures and empty for the single cycle-fatal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanError {
    pub batch_index: Option<usize>,
    pub message: String,
}

impl ScanError {
    pub fn batch(batch_index: usize, message: impl Into<String>) -> Self {
        Self {
            batch_index: Some(batch_index),
            message: message.into(),
        }
    }

    pub fn cycle(message: impl Into<String>) -> Self {
        Self {
            batch_index: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.batch_index {
            Some(idx) => write!(f, "batch {}: {}", idx, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Outcome of one scan cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub trigger: ScanTrigger,
    pub started_at: DateTime<Utc>,
    pub tickers_scanned: usize,
    pub batches: usize,
    pub records_fetched: usize,
    pub bundles: usize,
    /// Bundles classified with at least one scored indicator missing
    pub incomplete_bundles: usize,
    pub rows_saved: usize,
    pub errors: Vec<ScanError>,
    /// True when the cycle hit a cycle-fatal error
    pub failed: bool,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl ScanReport {
    pub fn new(trigger: ScanTrigger, started_at: DateTime<Utc>) -> Self {
        Self {
            trigger,
            started_at,
            tickers_scanned: 0,
            batches: 0,
            records_fetched: 0,
            bundles: 0,
            incomplete_bundles: 0,
            rows_saved: 0,
            errors: Vec::new(),
            failed: false,
            duration: Duration::ZERO,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
