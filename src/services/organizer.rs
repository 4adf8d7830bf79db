use crate::constants::EMA_SLOW_PERIOD;
use crate::error::Result;
use crate::models::{IndicatorBundle, IndicatorKey, RawIndicatorRecord, RecordId, Timeframe};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Bundles regrouped from a flat record stream
#[derive(Debug, Default)]
pub struct OrganizedBundles {
    /// One bundle per (ticker, timeframe), ordered by ticker then timeframe
    pub bundles: Vec<IndicatorBundle>,
    /// Records dropped because the provider reported an error or no value
    pub skipped_records: usize,
}

/// Semantic bundle key for a provider indicator name and its period marker
///
/// The EMA is requested twice; the period tells the two apart.
pub fn semantic_key(indicator: &str, period: u32) -> IndicatorKey {
    if indicator == "ema" {
        if period == EMA_SLOW_PERIOD {
            IndicatorKey::EmaSlow
        } else {
            IndicatorKey::EmaFast
        }
    } else {
        IndicatorKey::from_provider_name(indicator)
    }
}

/// Group raw records into per-(ticker, timeframe) bundles
///
/// A record whose id breaks the positional contract fails the whole call: a malformed
/// response must not be classified. Completeness is not checked here.
pub fn organize(records: &[RawIndicatorRecord]) -> Result<OrganizedBundles> {
    let mut grouped: BTreeMap<(String, Timeframe), IndicatorBundle> = BTreeMap::new();
    let mut skipped_records = 0;

    for record in records {
        let id = RecordId::parse(&record.id)?;

        let value = match record.result.value {
            Some(value) if record.errors.is_empty() => value,
            _ => {
                warn!(
                    id = %record.id,
                    errors = ?record.errors,
                    "Provider returned no value, indicator left out of bundle"
                );
                skipped_records += 1;
                continue;
            }
        };

        let key = semantic_key(&record.indicator, id.period);
        grouped
            .entry((id.ticker.clone(), id.timeframe))
            .or_insert_with(|| IndicatorBundle::new(id.ticker, id.timeframe))
            .insert(key, value);
    }

    let bundles: Vec<IndicatorBundle> = grouped.into_values().collect();

    debug!(
        records = records.len(),
        bundles = bundles.len(),
        skipped = skipped_records,
        "Organized indicator records"
    );

    Ok(OrganizedBundles {
        bundles,
        skipped_records,
    })
}
