pub mod classifier;
pub mod clock;
pub mod database;
pub mod indicator_client;
pub mod indicator_fetcher;
pub mod organizer;
pub mod rate_limiter;
pub mod regime_query;
pub mod request_batcher;
pub mod scan_orchestrator;
pub mod universe;

pub use classifier::{classify, score, RegimeScores};
pub use clock::{Clock, FixedClock, SystemClock};
pub use database::{RegimeStore, SQLiteRegimeStore, SharedRegimeStore, StoreStats};
pub use indicator_client::{BulkIndicatorClient, IndicatorProvider};
pub use indicator_fetcher::{FetchOutcome, RateLimitedFetcher};
pub use organizer::{organize, semantic_key, OrganizedBundles};
pub use rate_limiter::{FixedDelayLimiter, RateLimiter};
pub use regime_query::{get_assets_by_market, parse_as_of, AssetRegime, QueryOptions};
pub use request_batcher::RequestBatcher;
pub use scan_orchestrator::{ScanOrchestrator, UniverseSource};
pub use universe::resolve_universe;
