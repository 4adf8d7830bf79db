use crate::error::Result;
use crate::models::{
    CryptoSet, RegimeClassification, ScanConfig, ScanError, ScanReport, ScanTrigger, TickerGroups,
};
use crate::services::{
    classify, organize, resolve_universe, BulkIndicatorClient, Clock, FixedDelayLimiter, RateLimitedFetcher,
    RequestBatcher, SharedRegimeStore, SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Where the ticker universe comes from on each cycle
#[derive(Debug, Clone)]
pub enum UniverseSource {
    /// Groups fixed at construction
    Static(TickerGroups),
    /// Groups re-read from disk at the start of every cycle
    File(PathBuf),
}

impl UniverseSource {
    fn load(&self) -> Result<TickerGroups> {
        match self {
            UniverseSource::Static(groups) => Ok(groups.clone()),
            UniverseSource::File(path) => TickerGroups::from_file(path),
        }
    }
}

/// Runs one complete scan cycle: resolve, batch, fetch, organize, classify, persist
pub struct ScanOrchestrator {
    universe: UniverseSource,
    batcher: RequestBatcher,
    fetcher: RateLimitedFetcher,
    store: SharedRegimeStore,
    clock: Arc<dyn Clock>,
}

impl ScanOrchestrator {
    pub fn new(
        universe: UniverseSource,
        batcher: RequestBatcher,
        fetcher: RateLimitedFetcher,
        store: SharedRegimeStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            universe,
            batcher,
            fetcher,
            store,
            clock,
        }
    }

    /// Production wiring: HTTP provider, fixed delay, wall clock, groups file re-read per cycle
    pub fn from_config(config: &ScanConfig, store: SharedRegimeStore) -> Result<Self> {
        config.validate()?;

        let crypto = match &config.crypto_list_path {
            Some(path) => CryptoSet::from_file(path)?,
            None => CryptoSet::default(),
        };
        let client = BulkIndicatorClient::new(&config.provider_url, config.provider_secret.clone())?;
        let limiter = FixedDelayLimiter::new(config.batch_delay);

        info!(
            provider = %config.provider_url,
            groups = %config.ticker_groups_path.display(),
            crypto_symbols = crypto.len(),
            batch_delay_ms = config.batch_delay.as_millis() as u64,
            "Scan pipeline configured"
        );

        Ok(Self::new(
            UniverseSource::File(config.ticker_groups_path.clone()),
            RequestBatcher::new(crypto).with_batch_size(config.batch_size),
            RateLimitedFetcher::new(Arc::new(client), Arc::new(limiter)),
            store,
            Arc::new(SystemClock),
        ))
    }

    pub fn store(&self) -> &SharedRegimeStore {
        &self.store
    }

    /// Run one cycle and report what happened
    ///
    /// Never returns an error: a cycle-fatal failure becomes a single unindexed entry in
    /// `errors` and sets `failed`. Batch failures are listed individually and do not fail the
    /// cycle.
    pub async fn run_cycle(&self, trigger: ScanTrigger) -> ScanReport {
        let cycle_start = Instant::now();
        let mut report = ScanReport::new(trigger, self.clock.now());

        info!(trigger = ?trigger, "Starting scan cycle");

        if let Err(e) = self.execute(&mut report).await {
            error!(
                trigger = ?trigger,
                error = %e,
                "Scan cycle failed"
            );
            report.errors.push(ScanError::cycle(e.to_string()));
            report.failed = true;
        }

        report.duration = cycle_start.elapsed();

        info!(
            trigger = ?trigger,
            tickers = report.tickers_scanned,
            batches = report.batches,
            records = report.records_fetched,
            bundles = report.bundles,
            incomplete = report.incomplete_bundles,
            rows_saved = report.rows_saved,
            errors = report.errors.len(),
            failed = report.failed,
            duration_secs = report.duration.as_secs_f64(),
            "Scan cycle finished"
        );

        report
    }

    async fn execute(&self, report: &mut ScanReport) -> Result<()> {
        let groups = self.universe.load()?;
        let tickers = resolve_universe(&groups);
        report.tickers_scanned = tickers.len();

        let batches = self.batcher.build_batches(&tickers);
        report.batches = batches.len();

        let outcome = self.fetcher.fetch_all(&batches).await;
        report.records_fetched = outcome.records.len();
        report.errors.extend(outcome.errors);

        let organized = organize(&outcome.records)?;
        report.bundles = organized.bundles.len();

        let timestamp = self.clock.now();
        let mut classifications: Vec<RegimeClassification> = Vec::with_capacity(organized.bundles.len());

        for bundle in &organized.bundles {
            if !bundle.is_complete() {
                report.incomplete_bundles += 1;
                debug!(
                    ticker = %bundle.ticker,
                    timeframe = %bundle.timeframe,
                    missing = ?bundle.missing(),
                    "Classifying incomplete bundle, missing indicators read as 0"
                );
            }
            classifications.push(classify(bundle, timestamp));
        }

        report.rows_saved = self.store.append(&classifications).await?;

        Ok(())
    }
}
