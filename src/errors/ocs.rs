use thiserror::Error;

/// OCS status code signalling success
pub const OCS_OK: i64 = 100;
/// Returned by the sub-admin listing when the user administers no group
pub const OCS_EMPTY_RESULT: i64 = 102;
/// Legacy "unauthorised" status code
pub const OCS_UNAUTHORISED: i64 = 997;

/// The server answered, but the envelope carries a failure status.
///
/// Message and status code are kept exactly as the server sent them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("OCS request failed with status {status_code}: {message}")]
pub struct OcsResponseError {
    pub message: String,
    pub status_code: i64,
}

impl OcsResponseError {
    pub fn new<S: Into<String>>(message: S, status_code: i64) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    /// Status code rendered the way the server transmits it, e.g. `"102"`
    pub fn status_code_str(&self) -> String {
        self.status_code.to_string()
    }

    pub fn is_empty_result(&self) -> bool {
        self.status_code == OCS_EMPTY_RESULT
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == OCS_UNAUTHORISED
    }
}
