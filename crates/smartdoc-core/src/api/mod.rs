pub mod http;

pub use http::{HttpTransport, DEFAULT_TIMEOUT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub agent_used: Option<String>,
}

/// One round trip to the assistant backend.
///
/// `endpoint` is the full URL, already joined from the configured base.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<ChatResponse, TransportError>;

    /// Probe `endpoint` for liveness. Only the status code matters.
    async fn health(&self, endpoint: &str) -> Result<(), TransportError>;
}
