use crate::constants::PROVIDER_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::models::{DescriptorSet, IndicatorBatch, RawIndicatorRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Source of indicator values for one batch of descriptor-sets
#[async_trait]
pub trait IndicatorProvider: Send + Sync {
    /// Issue one provider call for the whole batch
    async fn fetch_batch(&self, batch: &IndicatorBatch) -> Result<Vec<RawIndicatorRecord>>;
}

/// Body of a bulk request
#[derive(Debug, Serialize)]
struct BulkRequest<'a> {
    secret: &'a str,
    construct: &'a [DescriptorSet],
}

/// Bulk responses are a flat record array, optionally wrapped in `{ "data": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BulkResponse {
    Envelope { data: Vec<RawIndicatorRecord> },
    Flat(Vec<RawIndicatorRecord>),
}

impl BulkResponse {
    fn into_records(self) -> Vec<RawIndicatorRecord> {
        match self {
            BulkResponse::Envelope { data } => data,
            BulkResponse::Flat(records) => records,
        }
    }
}

/// HTTP client for the indicator provider's bulk endpoint
pub struct BulkIndicatorClient {
    base_url: String,
    secret: String,
    client: reqwest::Client,
}

impl BulkIndicatorClient {
    /// Create a new provider client
    ///
    /// # Arguments
    /// * `base_url` - Provider base URL (e.g., "https://api.taapi.io")
    /// * `secret` - Provider credential sent with every call
    pub fn new(base_url: &str, secret: impl Into<String>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid provider url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, "Created indicator provider client");

        Ok(Self {
            base_url,
            secret: secret.into(),
            client,
        })
    }

    fn bulk_url(&self) -> String {
        format!("{}/bulk", self.base_url)
    }
}

#[async_trait]
impl IndicatorProvider for BulkIndicatorClient {
    async fn fetch_batch(&self, batch: &IndicatorBatch) -> Result<Vec<RawIndicatorRecord>> {
        let url = self.bulk_url();
        let body = BulkRequest {
            secret: &self.secret,
            construct: &batch.sets,
        };

        debug!(batch = batch.index, constructs = batch.len(), url = %url, "Sending bulk request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Bulk request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(Error::Network(format!(
                "Provider returned error status {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;

        let parsed: BulkResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("Failed to parse bulk response: {}", e)))?;

        Ok(parsed.into_records())
    }
}
