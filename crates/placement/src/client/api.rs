use std::time::Duration;

use reqwest::{Response, StatusCode};

use crate::allocation::RosterSnapshot;
use crate::roster::{SaveRequest, SaveResponse};

/// HTTP client for the roster endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_data(&self) -> Result<RosterSnapshot, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/data", self.base_url))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn save(&self, request: &SaveRequest) -> Result<SaveResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/save", self.base_url))
            .json(request)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<SaveResponse>(&body)
        .ok()
        .and_then(|payload| payload.error)
        .unwrap_or(body);
    Err(ClientError::Rejected { status, message })
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}
