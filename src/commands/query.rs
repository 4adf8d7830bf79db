use crate::error::Result;
use crate::models::{Market, SortOrder};
use crate::services::{get_assets_by_market, parse_as_of, AssetRegime, QueryOptions, SQLiteRegimeStore};
use crate::utils::get_database_path;

pub async fn run(symbols: Vec<String>, market: Market, limit: Option<usize>, order: SortOrder, date: Option<String>) {
    match query(symbols, market, limit, order, date).await {
        Ok(assets) => print_assets(market, &assets),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn query(
    symbols: Vec<String>,
    market: Market,
    limit: Option<usize>,
    order: SortOrder,
    date: Option<String>,
) -> Result<Vec<AssetRegime>> {
    let as_of = date.as_deref().map(parse_as_of).transpose()?;
    let store = SQLiteRegimeStore::new(get_database_path()).await?;

    let assets = get_assets_by_market(&store, &symbols, market, QueryOptions { limit, order }, as_of).await?;
    store.close().await;
    Ok(assets)
}

fn print_assets(market: Market, assets: &[AssetRegime]) {
    if assets.is_empty() {
        println!("⚠️  No {} assets found", market);
        return;
    }

    println!("{:<12} {:<6} {:<10} {:>10}", "SYMBOL", "TF", "MARKET", "CONFIDENCE");
    for asset in assets {
        println!(
            "{:<12} {:<6} {:<10} {:>10.2}",
            asset.symbol,
            asset.timeframe.as_str(),
            asset.market.as_str(),
            asset.confidence
        );
    }
}
