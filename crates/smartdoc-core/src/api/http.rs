use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{ChatRequest, ChatResponse, ChatTransport};
use crate::error::TransportError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        // reqwest's .json() sets Content-Type: application/json
        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn health(&self, endpoint: &str) -> Result<(), TransportError> {
        let response = self.client.get(endpoint).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
