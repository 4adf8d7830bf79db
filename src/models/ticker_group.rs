use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Ticker groups organized by sector/category
///
/// The same symbol may sit in several groups (e.g. a crypto asset under both its sector bucket
/// and a "high beta" bucket); see [`crate::services::resolve_universe`] for the flattened view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerGroups {
    #[serde(flatten)]
    pub groups: HashMap<String, Vec<String>>,
}

impl TickerGroups {
    pub fn new(groups: HashMap<String, Vec<String>>) -> Self {
        Self { groups }
    }

    /// Load ticker groups from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read ticker groups {}: {}", path.display(), e))
        })?;
        let groups: HashMap<String, Vec<String>> = serde_json::from_str(&content)?;
        Ok(Self { groups })
    }

    /// Get tickers for a specific group
    pub fn get_group(&self, group_name: &str) -> Option<&Vec<String>> {
        self.groups.get(group_name)
    }

    /// Get all group names
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total ticker entries including repeats across groups
    pub fn entry_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ticker_groups_structure() {
        let mut groups = HashMap::new();
        groups.insert("TECH".to_string(), vec!["AAPL".to_string(), "MSFT".to_string()]);
        groups.insert("CRYPTO".to_string(), vec!["BTC".to_string(), "AAPL".to_string()]);

        let ticker_groups = TickerGroups::new(groups);

        assert_eq!(ticker_groups.group_count(), 2);
        assert_eq!(ticker_groups.entry_count(), 4);
        assert_eq!(ticker_groups.group_names(), vec!["CRYPTO", "TECH"]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticker_group.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"L1": ["BTC", "ETH"], "HIGH_BETA": ["SOL"]}}"#).unwrap();

        let groups = TickerGroups::from_file(&path).unwrap();
        assert_eq!(groups.get_group("L1").unwrap(), &vec!["BTC".to_string(), "ETH".to_string()]);
        assert_eq!(groups.group_count(), 2);
    }

    #[test]
    fn test_from_missing_file() {
        let err = TickerGroups::from_file("/nonexistent/ticker_group.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
