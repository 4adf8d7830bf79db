use crate::error::{AppError, Result};
use crate::models::{ScanReport, ScanTrigger};
use crate::services::ScanOrchestrator;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, warn};

/// Single-flight flag held for the lifetime of one scan
///
/// Dropping the guard clears the flag, so it is released on success, on a caught failure and
/// on unwind alike.
struct ScanGuard {
    flag: Arc<AtomicBool>,
}

impl ScanGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// State shared between the tick loop, spawned scans and callers
struct ScanRunner {
    orchestrator: Arc<ScanOrchestrator>,
    in_flight: Arc<AtomicBool>,
    last_report: RwLock<Option<ScanReport>>,
}

impl ScanRunner {
    async fn run_guarded(&self, guard: ScanGuard, trigger: ScanTrigger) -> ScanReport {
        let report = self.orchestrator.run_cycle(trigger).await;
        *self.last_report.write().await = Some(report.clone());
        drop(guard);
        report
    }
}

/// Snapshot returned by [`ScanScheduler::status`]
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    /// Periodic ticks are running
    pub active: bool,
    /// A scan is in flight right now
    pub scanning: bool,
    pub interval_secs: u64,
    pub last_scan: Option<ScanReport>,
}

/// Periodic scan driver with a single-flight guard
///
/// At most one scan runs at a time across scheduled ticks and manual triggers. A tick that
/// finds a scan running is skipped; a manual trigger in the same situation gets
/// [`AppError::ScanInProgress`]. Stopping ends future ticks only: a scan already running
/// finishes normally.
pub struct ScanScheduler {
    runner: Arc<ScanRunner>,
    interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

pub type SharedScanScheduler = Arc<ScanScheduler>;

impl ScanScheduler {
    pub fn new(orchestrator: Arc<ScanOrchestrator>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(AppError::Config("scan interval must be greater than zero".to_string()));
        }

        Ok(Self {
            runner: Arc::new(ScanRunner {
                orchestrator,
                in_flight: Arc::new(AtomicBool::new(false)),
                last_report: RwLock::new(None),
            }),
            interval,
            handle: Mutex::new(None),
        })
    }

    /// Start periodic scans; the first tick fires immediately
    ///
    /// Returns `false` when the scheduler was already running.
    pub async fn start(&self) -> bool {
        let mut handle = self.handle.lock().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            info!("Scan scheduler already running");
            return false;
        }

        let runner = self.runner.clone();
        let period = self.interval;

        *handle = Some(tokio::spawn(async move {
            run_tick_loop(runner, period).await;
        }));

        info!(interval_secs = self.interval.as_secs(), "Scan scheduler started");
        true
    }

    /// Stop periodic scans
    ///
    /// Returns `false` when the scheduler was not running. Safe to call repeatedly.
    pub async fn stop(&self) -> bool {
        match self.handle.lock().await.take() {
            Some(handle) => {
                handle.abort();
                info!("Scan scheduler stopped");
                true
            }
            None => false,
        }
    }

    /// Run a scan now and wait for its report
    ///
    /// The scan runs on its own task, so it completes even if the caller goes away.
    #[instrument(skip(self))]
    pub async fn trigger_manual(&self) -> Result<ScanReport> {
        let guard = ScanGuard::try_acquire(&self.runner.in_flight).ok_or_else(|| {
            warn!("Manual scan rejected, another scan is in progress");
            AppError::ScanInProgress
        })?;

        let runner = self.runner.clone();
        tokio::spawn(async move { runner.run_guarded(guard, ScanTrigger::Manual).await })
            .await
            .map_err(|e| AppError::Other(format!("Scan task failed: {}", e)))
    }

    pub fn is_scanning(&self) -> bool {
        self.runner.in_flight.load(Ordering::Acquire)
    }

    pub async fn is_active(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub async fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            active: self.is_active().await,
            scanning: self.is_scanning(),
            interval_secs: self.interval.as_secs(),
            last_scan: self.runner.last_report.read().await.clone(),
        }
    }
}

#[instrument(skip(runner))]
async fn run_tick_loop(runner: Arc<ScanRunner>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut iteration_count = 0u64;

    loop {
        ticker.tick().await;
        iteration_count += 1;

        match ScanGuard::try_acquire(&runner.in_flight) {
            Some(guard) => {
                info!(
                    worker = "Scan",
                    iteration = iteration_count,
                    "Starting scheduled scan"
                );
                let runner = runner.clone();
                tokio::spawn(async move {
                    runner.run_guarded(guard, ScanTrigger::Scheduled).await;
                });
            }
            None => {
                info!(
                    worker = "Scan",
                    iteration = iteration_count,
                    "Previous scan still running, skipping tick"
                );
            }
        }
    }
}
