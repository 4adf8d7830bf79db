use crate::models::{IndicatorBatch, RawIndicatorRecord, ScanError};
use crate::services::{IndicatorProvider, RateLimiter};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Records and per-batch failures from one pass over all batches
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Concatenation of every successful batch, in batch order
    pub records: Vec<RawIndicatorRecord>,
    /// One entry per failed batch
    pub errors: Vec<ScanError>,
    pub batches_attempted: usize,
}

impl FetchOutcome {
    pub fn failed_batches(&self) -> usize {
        self.errors.len()
    }
}

/// Issues batches one at a time with a pause before every batch but the first
///
/// A failed batch is recorded and skipped; it is never retried within the same pass.
pub struct RateLimitedFetcher {
    provider: Arc<dyn IndicatorProvider>,
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitedFetcher {
    pub fn new(provider: Arc<dyn IndicatorProvider>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { provider, limiter }
    }

    pub async fn fetch_all(&self, batches: &[IndicatorBatch]) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        let total_batches = batches.len();

        for (position, batch) in batches.iter().enumerate() {
            if position > 0 {
                self.limiter.wait().await;
            }

            let api_start = Instant::now();
            let result = self.provider.fetch_batch(batch).await;
            let api_elapsed = api_start.elapsed();
            outcome.batches_attempted += 1;

            // Only show first and last batch at info level
            let should_print = position == 0 || position + 1 == total_batches;

            match result {
                Ok(records) => {
                    if should_print {
                        info!(
                            batch_num = batch.index + 1,
                            total_batches = total_batches,
                            records = records.len(),
                            duration_s = api_elapsed.as_secs_f64(),
                            "Batch completed"
                        );
                    } else {
                        debug!(
                            batch_num = batch.index + 1,
                            total_batches = total_batches,
                            records = records.len(),
                            "Batch completed"
                        );
                    }
                    outcome.records.extend(records);
                }
                Err(e) => {
                    warn!(
                        batch = batch.index,
                        tickers = ?batch.tickers(),
                        error = %e,
                        "Batch failed, continuing with next batch"
                    );
                    outcome.errors.push(ScanError::batch(batch.index, e.to_string()));
                }
            }
        }

        outcome
    }
}
