use crate::domain::{ScannerApiResponse, ScannerFilter};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ScannerApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

pub type Result<T> = std::result::Result<T, ScannerApiError>;

/// Anything that can serve scanner result pages
#[async_trait]
pub trait ScannerSource: Send + Sync {
    /// Fetch the page named by `filter.page` (page 1 when unset)
    async fn fetch_page(&self, filter: &ScannerFilter) -> Result<ScannerApiResponse>;
}

/// Scanner REST API client
#[derive(Clone)]
pub struct ScannerApiClient {
    base_url: String,
    client: Client,
}

impl ScannerApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn scanner_url(&self) -> String {
        format!("{}/scanner", self.base_url)
    }

    /// `GET /scanner` with the filter encoded as query parameters
    pub async fn get_scanner_results(&self, filter: &ScannerFilter) -> Result<ScannerApiResponse> {
        let url = self.scanner_url();
        let params = filter.to_query_params();

        debug!("GET {} with {} params", url, params.len());

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();

        if status == 429 {
            warn!("Rate limit exceeded");
            return Err(ScannerApiError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ScannerApiError::ApiError(format!(
                "Failed to fetch scanner results ({}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        let results: ScannerApiResponse = serde_json::from_str(&body)
            .map_err(|e| ScannerApiError::DeserializeFailed(e.to_string()))?;

        debug!(
            "Fetched {} pairs (total rows {})",
            results.pairs.len(),
            results.total_rows
        );

        Ok(results)
    }
}

#[async_trait]
impl ScannerSource for ScannerApiClient {
    async fn fetch_page(&self, filter: &ScannerFilter) -> Result<ScannerApiResponse> {
        self.get_scanner_results(filter).await
    }
}
