use serde::{Deserialize, Serialize};

use super::{AppAttribute, AppInfo, Config, RemoteShare, Share, User};
use crate::errors::{ocs::OCS_OK, OcsResponseError};

/// The `meta` block every OCS response carries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OcsMeta {
    pub status: String,
    pub status_code: i64,
    pub message: String,
}

impl OcsMeta {
    pub fn is_success(&self) -> bool {
        self.status_code == OCS_OK
    }

    pub fn to_error(&self) -> OcsResponseError {
        OcsResponseError::new(self.message.clone(), self.status_code)
    }
}

/// A decoded OCS response. `data` is only meaningful when `meta` reports success.
#[derive(Debug, Clone, PartialEq)]
pub struct OcsEnvelope<T> {
    pub meta: OcsMeta,
    pub data: T,
}

impl<T> OcsEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.meta.is_success()
    }

    /// Returns `data` on success, otherwise the server's failure verbatim
    pub fn into_result(self) -> Result<T, OcsResponseError> {
        if self.meta.is_success() {
            Ok(self.data)
        } else {
            Err(self.meta.to_error())
        }
    }
}

/// Typed `data` payload, selected by the operation that issued the request
#[derive(Debug, Clone, PartialEq)]
pub enum OcsData {
    Empty,
    Share(Share),
    Shares(Vec<Share>),
    RemoteShares(Vec<RemoteShare>),
    User(User),
    Strings(Vec<String>),
    App(AppInfo),
    Config(Config),
    Attributes(Vec<AppAttribute>),
}
