use crate::error::Result;
use crate::models::{AssetClass, CryptoSet, TickerGroups};
use crate::services::{resolve_universe, RequestBatcher};
use crate::utils::{get_crypto_list_path, get_ticker_groups_path};

pub fn run() {
    if let Err(e) = show_groups() {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn show_groups() -> Result<()> {
    let path = get_ticker_groups_path();
    let groups = TickerGroups::from_file(&path)?;
    let crypto = match get_crypto_list_path() {
        Some(crypto_path) => CryptoSet::from_file(crypto_path)?,
        None => CryptoSet::default(),
    };

    println!("📁 {}\n", path.display());
    for name in groups.group_names() {
        let count = groups.get_group(&name).map_or(0, Vec::len);
        println!("   {:<24} {:>5}", name, count);
    }

    let universe = resolve_universe(&groups);
    let crypto_count = universe
        .iter()
        .filter(|t| crypto.asset_class(t) == AssetClass::Crypto)
        .count();
    let batches = RequestBatcher::new(crypto).build_batches(&universe);

    println!();
    println!("📊 Groups:          {}", groups.group_count());
    println!("   Entries:         {}", groups.entry_count());
    println!("   Unique tickers:  {}", universe.len());
    println!("   Crypto / equity: {} / {}", crypto_count, universe.len() - crypto_count);
    println!("   Batches per scan: {}", batches.len());

    Ok(())
}
