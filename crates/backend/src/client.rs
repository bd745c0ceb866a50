//! reqwest-backed client for the hosted backend.

use async_trait::async_trait;

use towdesk_charges::{InvoiceId, PersistedItem, PriceSuggestion, RowDraft};
use towdesk_vehicles::{Vin, VinDetails};

use crate::api::{ChargeStore, PriceService, VinService};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("client is offline")]
    Offline,
    #[error("network error: {0}")]
    Network(String),
    #[error("API error {0}: {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Client for the hosted backend's REST surface.
pub struct RemoteBackend {
    api_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl RemoteBackend {
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            token: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_token(api_url: String, token: String) -> Self {
        Self {
            api_url,
            token: Some(token),
            http: reqwest::Client::new(),
        }
    }

    /// Check connectivity by hitting the health endpoint.
    pub async fn check_connectivity(&self) -> bool {
        let url = format!("{}/health", self.api_url);
        self.http.get(&url).send().await.is_ok()
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(url))
    }

    fn put(&self, url: String) -> reqwest::RequestBuilder {
        self.authorize(self.http.put(url))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Api(status, body))
}

#[async_trait]
impl ChargeStore for RemoteBackend {
    async fn fetch_items(&self, invoice_id: InvoiceId) -> Result<Vec<PersistedItem>, ClientError> {
        let url = format!("{}/invoices/{}/charges", self.api_url, invoice_id);
        let resp = self
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn push_items(
        &self,
        invoice_id: InvoiceId,
        items: &[RowDraft],
    ) -> Result<(), ClientError> {
        let url = format!("{}/invoices/{}/charges", self.api_url, invoice_id);
        let resp = self
            .put(url)
            .json(items)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_status(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl PriceService for RemoteBackend {
    async fn lookup_price(
        &self,
        description: &str,
        item_group: &str,
    ) -> Result<PriceSuggestion, ClientError> {
        let url = format!("{}/prices", self.api_url);
        let resp = self
            .get(url)
            .query(&[("description", description), ("group", item_group)])
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

#[async_trait]
impl VinService for RemoteBackend {
    async fn decode_vin(&self, vin: &Vin) -> Result<Option<VinDetails>, ClientError> {
        let url = format!("{}/vin/{}", self.api_url, vin);
        let resp = self
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        // The decode provider answers unknown VINs with 404.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}
