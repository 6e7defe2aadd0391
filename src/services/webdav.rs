use reqwest::header::{HeaderName, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::connection::Connection;
use super::transport::{extension_method, RawResponse, TransportRequest};
use crate::errors::{ClientError, Result};
use crate::models::ResourceInfo;
use crate::webdav_xml_parser::{parse_directory_listing, parse_self_descriptor};

/// The archive endpoint zips the whole tree server-side before answering
const ZIP_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
    <d:prop>
        <d:displayname/>
        <d:getcontentlength/>
        <d:creationdate/>
        <d:getlastmodified/>
        <d:resourcetype/>
        <d:getcontenttype/>
        <d:getetag/>
        <d:quota-used-bytes/>
        <d:quota-available-bytes/>
    </d:prop>
</d:propfind>"#;

fn is_multistatus(status: u16) -> bool {
    status == 207
}

fn is_ok(status: u16) -> bool {
    status == 200
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn is_created(status: u16) -> bool {
    status == 201
}

fn is_created_or_no_content(status: u16) -> bool {
    status == 201 || status == 204
}

fn is_deleted(status: u16) -> bool {
    status == 204 || status == 200
}

/// File and directory operations against the DAV root
#[derive(Clone)]
pub struct WebDavService {
    connection: Arc<Connection>,
}

impl WebDavService {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    fn propfind_request(&self, path: &str) -> Result<TransportRequest> {
        TransportRequest::new(extension_method("PROPFIND")?, self.connection.urls().dav_url(path))
            .header(HeaderName::from_static("depth"), "1")?
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .map(|request| request.body(PROPFIND_BODY))
    }

    /// Entries directly below `path`, without the entry for `path` itself
    pub async fn list(&self, path: &str) -> Result<Vec<ResourceInfo>> {
        debug!("📂 Listing {}", path);
        let root = self.connection.urls().dav_root_path();
        let resources = self
            .connection
            .send_and_parse("list", self.propfind_request(path)?, is_multistatus, |response| {
                parse_directory_listing(&response.text(), &root)
            })
            .await?;
        debug!("Found {} entries in {}", resources.len(), path);
        Ok(resources)
    }

    /// Metadata for `path`, taken from the self-descriptor of a `Depth: 1` listing
    pub async fn get_resource_info(&self, path: &str) -> Result<Option<ResourceInfo>> {
        let root = self.connection.urls().dav_root_path();
        self.connection
            .send_and_parse("get_resource_info", self.propfind_request(path)?, is_multistatus, |response| {
                parse_self_descriptor(&response.text(), &root)
            })
            .await
    }

    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        debug!("⬇️ Downloading {}", path);
        let request = TransportRequest::new(Method::GET, self.connection.urls().dav_url(path));
        let response = self.connection.send("download", request, is_success).await?;
        debug!("✅ Downloaded {} bytes from {}", response.body.len(), path);
        Ok(response.body)
    }

    pub async fn upload(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<bool> {
        debug!("⬆️ Uploading {} bytes to {}", data.len(), path);
        let request = TransportRequest::new(Method::PUT, self.connection.urls().dav_url(path))
            .header(CONTENT_TYPE, content_type)?
            .body(data);
        let result = self.connection.send("upload", request, is_success).await;
        self.boolean_outcome("upload", path, result)
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        let request = TransportRequest::new(Method::HEAD, self.connection.urls().dav_url(path));
        let result = self.connection.send("exists", request, is_ok).await;
        match result {
            Err(ClientError::Http { status: 404, .. }) => Ok(false),
            other => self.boolean_outcome("exists", path, other),
        }
    }

    pub async fn create_directory(&self, path: &str) -> Result<bool> {
        let request = TransportRequest::new(extension_method("MKCOL")?, self.connection.urls().dav_url(path));
        let result = self.connection.send("create_directory", request, is_created).await;
        self.boolean_outcome("create_directory", path, result)
    }

    pub async fn delete(&self, path: &str) -> Result<bool> {
        let request = TransportRequest::new(Method::DELETE, self.connection.urls().dav_url(path));
        let result = self.connection.send("delete", request, is_deleted).await;
        self.boolean_outcome("delete", path, result)
    }

    pub async fn copy(&self, source: &str, destination: &str) -> Result<bool> {
        let request = self.transfer_request("COPY", source, destination)?;
        let result = self.connection.send("copy", request, is_created_or_no_content).await;
        self.boolean_outcome("copy", source, result)
    }

    pub async fn move_resource(&self, source: &str, destination: &str) -> Result<bool> {
        let request = self.transfer_request("MOVE", source, destination)?;
        let result = self.connection.send("move", request, is_created_or_no_content).await;
        self.boolean_outcome("move", source, result)
    }

    /// Fetches a directory as a zip archive through the web UI endpoint
    pub async fn download_directory_as_zip(&self, path: &str) -> Result<Vec<u8>> {
        info!("📦 Downloading {} as zip archive", path);
        let request = TransportRequest::new(Method::GET, self.connection.urls().zip_download_url(path)?)
            .timeout(ZIP_DOWNLOAD_TIMEOUT);
        let response = self.connection.send("download_directory_as_zip", request, is_success).await?;
        Ok(response.body)
    }

    fn transfer_request(&self, verb: &str, source: &str, destination: &str) -> Result<TransportRequest> {
        let urls = self.connection.urls();
        TransportRequest::new(extension_method(verb)?, urls.dav_url(source))
            .header(HeaderName::from_static("destination"), &urls.dav_url(destination))
    }

    /// Transport failures and unexpected statuses read as `false`; anything
    /// else (bad arguments, parse failures) still propagates.
    fn boolean_outcome(&self, operation: &str, path: &str, result: Result<RawResponse>) -> Result<bool> {
        match result {
            Ok(_) => Ok(true),
            Err(e @ (ClientError::Transport(_) | ClientError::Http { .. })) => {
                warn!(parent: self.connection.span(), "{} {} returned false: {}", operation, path, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
