use clap::{Parser, Subcommand};

use crate::commands;
use crate::models::{Market, SortOrder};

#[derive(Parser)]
#[command(name = "regime-scanner")]
#[command(about = "Market regime scanner: classifies tickers as trending or ranging", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the scan scheduler and the HTTP API
    Serve {
        /// Port to listen on (defaults to PORT or 8787)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one scan cycle now and print its report
    Scan {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query stored classifications
    Query {
        /// Ticker symbol (repeatable)
        #[arg(short, long = "symbol", required = true)]
        symbols: Vec<String>,
        /// trending or ranging
        #[arg(short, long)]
        market: Market,
        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<usize>,
        /// Confidence order: asc or desc
        #[arg(short, long, default_value = "desc")]
        order: SortOrder,
        /// Point-in-time bound: RFC 3339 or YYYY-MM-DD (end of that UTC day)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show ticker groups and the resolved universe
    Groups,
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port).await;
        }
        Commands::Scan { json } => {
            commands::scan::run(json).await;
        }
        Commands::Query {
            symbols,
            market,
            limit,
            order,
            date,
        } => {
            commands::query::run(symbols, market, limit, order, date).await;
        }
        Commands::Groups => {
            commands::groups::run();
        }
    }
}
