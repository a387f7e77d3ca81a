use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoClientError {
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TodoClientError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TodoClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

pub type Result<T, E = TodoClientError> = std::result::Result<T, E>;
