mod crypto_list;
mod record_id;
mod regime;
mod scan_config;
mod scan_report;
mod ticker_group;
mod timeframe;
pub mod indicators;

pub use crypto_list::{AssetClass, CryptoList, CryptoMetadata, CryptoSet};
pub use indicators::{
    DescriptorSet, IndicatorBatch, IndicatorBundle, IndicatorKey, IndicatorKind, IndicatorRequest,
    IndicatorSpec, RawIndicatorRecord, RecordResult, INDICATOR_SET,
};
pub use record_id::RecordId;
pub use regime::{Market, RegimeClassification, RegimeQuery, ScanResult, SortOrder};
pub use scan_config::ScanConfig;
pub use scan_report::{ScanError, ScanReport, ScanTrigger};
pub use ticker_group::TickerGroups;
pub use timeframe::Timeframe;
