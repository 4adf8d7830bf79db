use crate::error::Result;
use crate::models::ScanConfig;
use crate::server::{self, AppState};
use crate::services::{SQLiteRegimeStore, ScanOrchestrator, SharedRegimeStore};
use crate::utils::get_port;
use crate::worker::ScanScheduler;
use std::sync::Arc;

pub async fn run(port: Option<u16>) {
    let port = port.unwrap_or_else(get_port);
    println!("🚀 Starting regime scanner on port {}", port);

    if let Err(e) = start(port).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn start(port: u16) -> Result<()> {
    let config = ScanConfig::from_env();

    println!("📁 Database:      {}", config.database_path.display());
    println!("📁 Ticker groups: {}", config.ticker_groups_path.display());
    println!("⏰ Scan interval: {}s", config.scan_interval.as_secs());

    let store: SharedRegimeStore = Arc::new(SQLiteRegimeStore::new(config.database_path.clone()).await?);
    let orchestrator = ScanOrchestrator::from_config(&config, store.clone())?;
    let scheduler = Arc::new(ScanScheduler::new(Arc::new(orchestrator), config.scan_interval)?);

    println!("🔄 Starting scan scheduler (first scan runs now)...");
    scheduler.start().await;

    server::serve(AppState::new(store, scheduler), port).await
}
