use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;

use crate::config::{AuthScheme, ClientConfig, Credentials};
use crate::errors::{ClientError, Result, TransportError};

/// A fully built request, independent of the HTTP stack that sends it
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Overrides the client-wide timeout for this request
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn new<S: Into<String>>(method: Method, url: S) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::validation(format!("Invalid value for header {}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The single capability the rest of the crate needs from an HTTP stack.
///
/// Implementations report connection failures and timeouts as
/// [`TransportError`] values rather than panicking or retrying themselves.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> std::result::Result<RawResponse, TransportError>;
}

/// Builds a WebDAV extension method such as `PROPFIND` or `MKCOL`
pub fn extension_method(name: &str) -> Result<Method> {
    Method::from_bytes(name.as_bytes())
        .map_err(|e| ClientError::validation(format!("Invalid HTTP method {}: {}", name, e)))
}

/// `HttpTransport` backed by a shared `reqwest::Client`
pub struct ReqwestTransport {
    client: Client,
    credentials: Credentials,
    default_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ClientError::config(format!("Invalid proxy '{}': {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials: config.credentials.clone(),
            default_timeout: config.timeout(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> std::result::Result<RawResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
            timeout,
        } = request;

        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let has_authorization = headers.contains_key(AUTHORIZATION);

        let timeout = timeout
            .filter(|t| t.as_secs() >= 1)
            .unwrap_or(self.default_timeout);

        debug!("{} {} (timeout {}s)", method, url, timeout.as_secs());

        let mut builder = self
            .client
            .request(method, &url)
            .headers(headers)
            .timeout(timeout);

        if !has_authorization {
            builder = match self.credentials.scheme {
                AuthScheme::Basic => builder.basic_auth(&self.credentials.username, Some(&self.credentials.password)),
                AuthScheme::Bearer => builder.bearer_auth(&self.credentials.password),
            };
        }

        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&url, &e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(&url, &e))?;

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_sends_pragma_and_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .and(header("pragma", "no-cache"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let config = ClientConfig::new(server.uri(), "admin", "secret");
        let transport = ReqwestTransport::new(&config).unwrap();
        let response = transport
            .execute(TransportRequest::new(Method::GET, format!("{}/probe", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let mut config = ClientConfig::new(server.uri(), "admin", "secret");
        config.timeout_seconds = 1;
        let transport = ReqwestTransport::new(&config).unwrap();
        let err = transport
            .execute(TransportRequest::new(Method::GET, server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_connect_error() {
        let config = ClientConfig::new("http://127.0.0.1:9", "admin", "secret");
        let transport = ReqwestTransport::new(&config).unwrap();
        let err = transport
            .execute(TransportRequest::new(Method::GET, "http://127.0.0.1:9/"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Connect { .. } | TransportError::Request { .. }));
    }

    #[test]
    fn test_extension_methods() {
        assert_eq!(extension_method("PROPFIND").unwrap().as_str(), "PROPFIND");
        assert!(extension_method("BAD METHOD").is_err());
    }
}
