use thiserror::Error;

pub mod ocs;
pub mod transport;

pub use ocs::OcsResponseError;
pub use transport::TransportError;

/// How the retry policy should treat a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Connectivity problems, timeouts and throttling
    Transient,
    /// The server rejected the credentials; retried on a fixed schedule
    Unauthorized,
    /// Retrying will not change the outcome
    Fatal,
}

/// Every error a client operation can surface
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP {status} from server: {body}")]
    Http { status: u16, body: String },

    #[error("Could not parse {context}: {message}")]
    Parse {
        context: String,
        message: String,
        body: String,
    },

    #[error(transparent)]
    Ocs(#[from] OcsResponseError),

    #[error("Invalid argument: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

impl ClientError {
    pub fn http<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Http { status, body: body.into() }
    }

    pub fn parse<C: Into<String>, M: ToString, B: Into<String>>(context: C, message: M, body: B) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
            body: body.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Classification consumed by [`crate::services::retry::RetryPolicy`].
    pub fn retry_class(&self) -> RetryClass {
        match self {
            ClientError::Transport(_) => RetryClass::Transient,
            ClientError::Http { status, .. } => match status {
                401 => RetryClass::Unauthorized,
                408 | 429 | 502 | 503 | 504 => RetryClass::Transient,
                _ => RetryClass::Fatal,
            },
            ClientError::Ocs(err) if err.is_unauthorized() => RetryClass::Unauthorized,
            ClientError::Ocs(_)
            | ClientError::Parse { .. }
            | ClientError::Validation { .. }
            | ClientError::Config { .. } => RetryClass::Fatal,
        }
    }

    /// The OCS status code, if the server answered with a failure envelope
    pub fn ocs_status_code(&self) -> Option<i64> {
        match self {
            ClientError::Ocs(err) => Some(err.status_code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(TransportError::Timeout { .. }))
    }
}
