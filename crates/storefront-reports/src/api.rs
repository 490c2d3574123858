//! Store backend API client
//!
//! Every call is a single fresh round trip: no retries and no response
//! caching. Callers decide how to degrade when a call fails.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::constants;
use crate::error::FetchError;
use crate::expenses::ExpensePayload;
use crate::models::{
    Ack, ChartData, CustomerRecord, DashboardStats, ExpenseRecord, ProductRecord, ProfitRow,
    PurchaseRecord, RecordId, SupplierRecord,
};
use crate::purchases::PurchasePayload;

/// Backend API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client with reqwest's default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client honoring the configured base URL and timeout
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::with_timeout(&config.base_url, config.timeout)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Send a request and return the raw body of a 2xx response
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(String, Vec<u8>), FetchError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "api request");

        let mut request = self
            .client
            .request(method, &url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let bytes = response.bytes().await.map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;

        Ok((url, bytes.to_vec()))
    }

    async fn request_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (url, bytes) = self.send(method, path, body).await?;
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode { url, source })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.request_json::<T, ()>(Method::GET, path, None).await
    }

    /// Send a mutation and require `{"success": true}` back
    async fn mutate<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), FetchError> {
        let ack: Ack = self.request_json(method, path, body).await?;
        if ack.success {
            Ok(())
        } else {
            Err(FetchError::Rejected { url: self.url(path) })
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub async fn fetch_suppliers(&self) -> Result<Vec<SupplierRecord>, FetchError> {
        self.get_json(constants::SUPPLIERS_PATH).await
    }

    pub async fn fetch_customers(&self) -> Result<Vec<CustomerRecord>, FetchError> {
        self.get_json(constants::CUSTOMERS_PATH).await
    }

    pub async fn fetch_products(&self) -> Result<Vec<ProductRecord>, FetchError> {
        self.get_json(constants::PRODUCTS_PATH).await
    }

    // =========================================================================
    // Report Feeds
    // =========================================================================

    pub async fn fetch_purchases(&self) -> Result<Vec<PurchaseRecord>, FetchError> {
        self.get_json(constants::PURCHASES_PATH).await
    }

    pub async fn fetch_expenses(&self) -> Result<Vec<ExpenseRecord>, FetchError> {
        self.get_json(constants::EXPENSES_PATH).await
    }

    pub async fn fetch_profit_summary(&self) -> Result<Vec<ProfitRow>, FetchError> {
        self.get_json(constants::PROFIT_PATH).await
    }

    pub async fn fetch_chart_data(&self) -> Result<ChartData, FetchError> {
        self.get_json(constants::CHART_DATA_PATH).await
    }

    pub async fn fetch_dashboard_stats(&self) -> Result<DashboardStats, FetchError> {
        self.get_json(constants::DASHBOARD_STATS_PATH).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn add_purchase(&self, payload: &PurchasePayload) -> Result<(), FetchError> {
        self.mutate(Method::POST, constants::ADD_PURCHASE_PATH, Some(payload))
            .await
    }

    pub async fn update_purchase(
        &self,
        id: &RecordId,
        payload: &PurchasePayload,
    ) -> Result<(), FetchError> {
        let path = format!("{}{}", constants::UPDATE_PURCHASE_PREFIX, id);
        self.mutate(Method::POST, &path, Some(payload)).await
    }

    pub async fn delete_purchase(&self, id: &RecordId) -> Result<(), FetchError> {
        let path = format!("{}{}", constants::DELETE_PURCHASE_PREFIX, id);
        self.mutate::<()>(Method::DELETE, &path, None).await
    }

    /// Create an expense; the backend answers with any 2xx body
    pub async fn add_expense(&self, payload: &ExpensePayload) -> Result<(), FetchError> {
        self.send(Method::POST, constants::EXPENSES_PATH, Some(payload))
            .await
            .map(|_| ())
    }

    /// Download the backend's purchase CSV export to `path`, returning its size
    pub async fn export_csv(&self, path: &Path) -> Result<u64, FetchError> {
        let (_, bytes) = self
            .send::<()>(Method::GET, constants::EXPORT_CSV_PATH, None)
            .await?;

        tokio::fs::write(path, &bytes)
            .await
            .map_err(|source| FetchError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(bytes.len() as u64)
    }
}
