use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::ContentApi;
use super::error::ApiError;
use super::types::{
    EngineStartResponse, EngineStatus, EngineStatusResponse, PendingCount, PendingItem,
    ProcessOutcome, RemoteBatchSummary,
};

const DEFAULT_BASE_URL: &str = "http://localhost:8700";

/// HTTP client for the content-studio API.
pub struct StudioClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl StudioClient {
    pub fn new(api_token: Option<String>) -> Self {
        Self::with_base_url(api_token, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(api_token: Option<String>, base_url: String) -> Self {
        Self::with_timeout(api_token, base_url, Duration::from_secs(120))
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(
        api_token: Option<String>,
        base_url: String,
        request_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.api_token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .header("content-type", "application/json")
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ContentApi for StudioClient {
    async fn list_pending(&self) -> Result<Vec<PendingItem>, ApiError> {
        self.get_json("/api/articles/pending").await
    }

    async fn pending_count(&self) -> Result<usize, ApiError> {
        let body: PendingCount = self.get_json("/api/articles/pending/count").await?;
        Ok(body.count)
    }

    async fn engine_status(&self) -> Result<EngineStatus, ApiError> {
        let body: EngineStatusResponse = self.get_json("/api/engine/status").await?;
        Ok(body.status)
    }

    async fn engine_start(&self) -> Result<EngineStartResponse, ApiError> {
        self.post_json("/api/engine/start").await
    }

    async fn process_item(&self, id: &str) -> Result<ProcessOutcome, ApiError> {
        self.post_json(&format!("/api/articles/{id}/process")).await
    }

    async fn run_batch_remote(&self) -> Result<RemoteBatchSummary, ApiError> {
        self.post_json("/api/articles/process-batch").await
    }
}
