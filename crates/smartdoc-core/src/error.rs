//! Error types shared by the SmartDoc client components.

use thiserror::Error;

/// Rejected configuration input. Nothing is persisted when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("L'URL de l'API est requise")]
    MissingApiUrl,
    #[error("L'ID utilisateur est requis")]
    MissingUserId,
    #[error("L'URL de l'API n'est pas valide: {0}")]
    InvalidApiUrl(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("config store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not determine config directory")]
    NoConfigDir,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Any failure of a round trip to the assistant backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Erreur HTTP: {0}")]
    Status(u16),
    #[error("Erreur réseau: {0}")]
    Network(String),
    #[error("Délai d'attente dépassé")]
    Timeout,
    #[error("Réponse invalide: {0}")]
    Decode(String),
    #[error("URL de l'API non configurée")]
    NotConfigured,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Best-effort device feedback (vibration, alert tone) could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),
}
