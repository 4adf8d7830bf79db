use crate::error::Result;
use crate::models::{ScanConfig, ScanReport, ScanTrigger};
use crate::services::{SQLiteRegimeStore, ScanOrchestrator};
use std::sync::Arc;

pub async fn run(json: bool) {
    match scan_once().await {
        Ok(report) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(out) => println!("{}", out),
                    Err(e) => eprintln!("❌ Failed to serialize report: {}", e),
                }
            } else {
                print_report(&report);
            }
            if report.failed {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn scan_once() -> Result<ScanReport> {
    let config = ScanConfig::from_env();
    let store = Arc::new(SQLiteRegimeStore::new(config.database_path.clone()).await?);
    let orchestrator = ScanOrchestrator::from_config(&config, store.clone())?;

    let report = orchestrator.run_cycle(ScanTrigger::Manual).await;
    store.close().await;
    Ok(report)
}

fn print_report(report: &ScanReport) {
    let icon = if report.failed { "❌" } else { "✅" };
    println!("{} Scan finished in {:.1}s", icon, report.duration.as_secs_f64());
    println!("   📈 Tickers:    {}", report.tickers_scanned);
    println!("   📦 Batches:    {}", report.batches);
    println!("   📄 Records:    {}", report.records_fetched);
    println!("   🧮 Bundles:    {} ({} incomplete)", report.bundles, report.incomplete_bundles);
    println!("   💾 Rows saved: {}", report.rows_saved);

    if !report.errors.is_empty() {
        println!("   ⚠️  Errors:     {}", report.errors.len());
        for error in &report.errors {
            println!("      - {}", error);
        }
    }
}
