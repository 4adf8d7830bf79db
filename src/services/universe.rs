use crate::models::TickerGroups;
use tracing::debug;

/// Flatten every ticker group into one deduplicated universe
///
/// Deduplication is by exact, case-sensitive string match. The result is sorted so batch
/// composition is stable across cycles; callers must not rely on any other ordering.
pub fn resolve_universe(groups: &TickerGroups) -> Vec<String> {
    let mut tickers: Vec<String> = groups
        .groups
        .values()
        .flat_map(|v| v.iter().cloned())
        .collect();
    let entries = tickers.len();

    tickers.sort();
    tickers.dedup();

    debug!(
        groups = groups.group_count(),
        entries = entries,
        unique = tickers.len(),
        "Resolved ticker universe"
    );

    tickers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn groups(entries: &[(&str, &[&str])]) -> TickerGroups {
        let map: HashMap<String, Vec<String>> = entries
            .iter()
            .map(|(name, tickers)| {
                (name.to_string(), tickers.iter().map(|t| t.to_string()).collect())
            })
            .collect();
        TickerGroups::new(map)
    }

    #[test]
    fn test_ticker_in_three_groups_appears_once() {
        let groups = groups(&[
            ("L1", &["BTC", "ETH"]),
            ("HIGH_BETA", &["BTC", "SOL"]),
            ("MACRO", &["BTC", "SPY"]),
        ]);

        let universe = resolve_universe(&groups);
        assert_eq!(universe.iter().filter(|t| *t == "BTC").count(), 1);
        assert_eq!(universe.len(), 4);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let groups = groups(&[("A", &["btc"]), ("B", &["BTC"])]);
        assert_eq!(resolve_universe(&groups).len(), 2);
    }

    #[test]
    fn test_no_asset_filtering() {
        let groups = groups(&[("MIXED", &["AAPL", "ETH", "GLD"])]);
        assert_eq!(resolve_universe(&groups), vec!["AAPL", "ETH", "GLD"]);
    }

    #[test]
    fn test_empty_groups() {
        assert!(resolve_universe(&TickerGroups::default()).is_empty());
    }
}
