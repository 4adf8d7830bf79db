use crate::constants::{CRYPTO_EXCHANGE, MAX_CONSTRUCTS_PER_BATCH};
use crate::models::{
    AssetClass, CryptoSet, DescriptorSet, IndicatorBatch, IndicatorRequest, RecordId, Timeframe,
    INDICATOR_SET,
};
use tracing::{debug, warn};

/// Venue field written into equity record ids
const EQUITY_VENUE: &str = "us";

/// Expands a ticker universe into provider descriptor-sets and bounded batches
#[derive(Debug, Clone)]
pub struct RequestBatcher {
    crypto: CryptoSet,
    batch_size: usize,
}

impl RequestBatcher {
    pub fn new(crypto: CryptoSet) -> Self {
        Self {
            crypto,
            batch_size: MAX_CONSTRUCTS_PER_BATCH,
        }
    }

    /// Override the batch size; clamped to `1..=MAX_CONSTRUCTS_PER_BATCH`
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_CONSTRUCTS_PER_BATCH);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// One descriptor-set per (ticker, timeframe), ticker-major order
    pub fn build_descriptor_sets(&self, tickers: &[String]) -> Vec<DescriptorSet> {
        let mut sets = Vec::with_capacity(tickers.len() * Timeframe::ALL.len());

        for ticker in tickers {
            let asset_class = self.crypto.asset_class(ticker);
            let venue = match asset_class {
                AssetClass::Crypto => CRYPTO_EXCHANGE,
                AssetClass::Equity => EQUITY_VENUE,
            };

            for timeframe in Timeframe::ALL {
                match self.build_indicators(asset_class, venue, ticker, timeframe) {
                    Ok(indicators) => sets.push(DescriptorSet {
                        ticker: ticker.clone(),
                        asset_class,
                        market_type: match asset_class {
                            AssetClass::Equity => Some(asset_class.as_str().to_string()),
                            AssetClass::Crypto => None,
                        },
                        exchange: match asset_class {
                            AssetClass::Crypto => Some(CRYPTO_EXCHANGE.to_string()),
                            AssetClass::Equity => None,
                        },
                        symbol: self.crypto.provider_symbol(ticker),
                        interval: timeframe,
                        indicators,
                    }),
                    Err(e) => {
                        warn!(ticker = %ticker, error = %e, "Skipping ticker");
                        break;
                    }
                }
            }
        }

        sets
    }

    fn build_indicators(
        &self,
        asset_class: AssetClass,
        venue: &str,
        ticker: &str,
        timeframe: Timeframe,
    ) -> crate::error::Result<Vec<IndicatorRequest>> {
        INDICATOR_SET
            .iter()
            .map(|spec| {
                let name = spec.kind.provider_name();
                Ok(IndicatorRequest {
                    id: RecordId::compose(asset_class, venue, ticker, timeframe, name, spec.period)?,
                    indicator: name.to_string(),
                    period: spec.period,
                })
            })
            .collect()
    }

    /// Chunk descriptor-sets into ordered batches
    pub fn into_batches(&self, sets: Vec<DescriptorSet>) -> Vec<IndicatorBatch> {
        sets.chunks(self.batch_size)
            .enumerate()
            .map(|(index, chunk)| IndicatorBatch {
                index,
                sets: chunk.to_vec(),
            })
            .collect()
    }

    /// Universe -> descriptor-sets -> batches
    pub fn build_batches(&self, tickers: &[String]) -> Vec<IndicatorBatch> {
        let sets = self.build_descriptor_sets(tickers);
        let set_count = sets.len();
        let batches = self.into_batches(sets);

        debug!(
            tickers = tickers.len(),
            descriptor_sets = set_count,
            batches = batches.len(),
            batch_size = self.batch_size,
            "Built indicator batches"
        );

        batches
    }
}
