use url::Url;

use crate::config::ClientConfig;
use crate::errors::{ClientError, Result};

/// Legacy endpoint serving a directory as a zip archive
const ZIP_DOWNLOAD_PATH: &str = "index.php/apps/files/ajax/download.php";

/// Builds every URL the client talks to.
///
/// The server URL may carry a path prefix (`https://host/owncloud`); the DAV
/// and OCS roots are resolved below it.
#[derive(Debug, Clone)]
pub struct UrlManager {
    base: Url,
    dav_root: String,
    ocs_root: String,
}

impl UrlManager {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut base = Url::parse(&config.server_url)
            .map_err(|e| ClientError::config(format!("Invalid server URL '{}': {}", config.server_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            base,
            dav_root: config.dav_root.trim_matches('/').to_string(),
            ocs_root: config.ocs_root.trim_matches('/').to_string(),
        })
    }

    /// Absolute path of the DAV root on the server, e.g. `/remote.php/webdav`.
    /// Hrefs in PROPFIND responses start with this prefix.
    pub fn dav_root_path(&self) -> String {
        format!("{}{}", self.base.path(), self.dav_root)
    }

    /// URL of a resource below the DAV root. Each path segment is
    /// percent-encoded; a trailing `/` is preserved.
    pub fn dav_url(&self, path: &str) -> String {
        let mut url = format!("{}{}", self.base.as_str(), self.dav_root);
        let encoded = encode_path(path);
        if !encoded.starts_with('/') {
            url.push('/');
        }
        url.push_str(&encoded);
        url
    }

    /// `<base>/<ocs_root>/<service>/<action>` with the given query parameters.
    /// An empty service addresses endpoints directly below the OCS root.
    pub fn ocs_url(&self, service: &str, action: &str, query: &[(&str, String)]) -> Result<String> {
        let mut path = self.ocs_root.clone();
        for part in [service, action] {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                path.push('/');
                path.push_str(part);
            }
        }

        let mut url = self
            .base
            .join(&path)
            .map_err(|e| ClientError::config(format!("Invalid OCS path '{}': {}", path, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.to_string())
    }

    pub fn zip_download_url(&self, dir: &str) -> Result<String> {
        let mut url = self
            .base
            .join(ZIP_DOWNLOAD_PATH)
            .map_err(|e| ClientError::config(format!("Invalid download path: {}", e)))?;
        url.query_pairs_mut().append_pair("dir", dir);
        Ok(url.to_string())
    }
}

/// Percent-encodes each segment of a `/`-separated path
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encodes a single path segment carrying user input (user ids, group names)
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
