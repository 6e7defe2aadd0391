use thiserror::Error;

/// Failures below the HTTP layer. Always considered transient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl TransportError {
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            TransportError::Timeout { url }
        } else if err.is_connect() {
            TransportError::Connect {
                url,
                message: err.to_string(),
            }
        } else {
            TransportError::Request {
                url,
                message: err.to_string(),
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TransportError::Timeout { url }
            | TransportError::Connect { url, .. }
            | TransportError::Request { url, .. } => url,
        }
    }
}
