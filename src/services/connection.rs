use reqwest::header::{HeaderName, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, warn, Instrument, Span};

use super::retry::RetryPolicy;
use super::transport::{HttpTransport, RawResponse, TransportRequest};
use super::url_management::UrlManager;
use crate::config::ResponseFormat;
use crate::errors::{ClientError, Result};
use crate::models::OcsData;
use crate::ocs_codec::{self, OcsShape};

const OCS_API_REQUEST: HeaderName = HeaderName::from_static("ocs-apirequest");
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The request pipeline shared by every service: transport call, status
/// check and parse step, wrapped in the retry policy and the client span.
pub struct Connection {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
    urls: UrlManager,
    format: ResponseFormat,
    span: Span,
}

impl Connection {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        retry: RetryPolicy,
        urls: UrlManager,
        format: ResponseFormat,
        span: Span,
    ) -> Self {
        Self {
            transport,
            retry,
            urls,
            format,
            span,
        }
    }

    pub fn urls(&self) -> &UrlManager {
        &self.urls
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Sends `request` with retries. Responses whose status fails `accept`
    /// become [`ClientError::Http`] so the policy can classify them.
    pub async fn send(&self, operation: &str, request: TransportRequest, accept: fn(u16) -> bool) -> Result<RawResponse> {
        let transport = &self.transport;
        self.retry
            .execute(operation, || {
                let request = request.clone();
                async move {
                    let response = transport.execute(request).await?;
                    if accept(response.status) {
                        Ok(response)
                    } else {
                        debug!("Unexpected status {} for {}", response.status, operation);
                        Err(ClientError::http(response.status, response.text()))
                    }
                }
            })
            .instrument(self.span.clone())
            .await
    }

    /// Same as [`Connection::send`] but runs `parse` on the body inside the
    /// retried closure.
    pub async fn send_and_parse<T, P>(
        &self,
        operation: &str,
        request: TransportRequest,
        accept: fn(u16) -> bool,
        parse: P,
    ) -> Result<T>
    where
        P: Fn(&RawResponse) -> Result<T>,
    {
        let transport = &self.transport;
        let parse = &parse;
        self.retry
            .execute(operation, || {
                let request = request.clone();
                async move {
                    let response = transport.execute(request).await?;
                    if !accept(response.status) {
                        return Err(ClientError::http(response.status, response.text()));
                    }
                    parse(&response).inspect_err(|e| warn!("{}: {}", operation, e))
                }
            })
            .instrument(self.span.clone())
            .await
    }

    /// Issues an OCS call and returns the typed `data` block.
    ///
    /// GET and DELETE parameters travel in the query string, POST and PUT
    /// parameters in a form body. A failure envelope becomes
    /// [`ClientError::Ocs`] carrying the server's code and message.
    pub async fn ocs(
        &self,
        operation: &str,
        method: Method,
        service: &str,
        action: &str,
        params: &[(&str, String)],
        shape: OcsShape,
    ) -> Result<OcsData> {
        let mut query = vec![("format", self.format.as_str().to_string())];
        let in_query = method == Method::GET || method == Method::DELETE;
        if in_query {
            query.extend(params.iter().cloned());
        }

        let url = self.urls.ocs_url(service, action, &query)?;
        let mut request = TransportRequest::new(method, url).header(OCS_API_REQUEST, "true")?;
        if !in_query && !params.is_empty() {
            let body = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter())
                .finish();
            request = request.header(CONTENT_TYPE, FORM_CONTENT_TYPE)?.body(body);
        }

        let transport = &self.transport;
        self.retry
            .execute(operation, || {
                let request = request.clone();
                async move {
                    let response = transport.execute(request).await?;
                    if response.status == 401 {
                        return Err(ClientError::http(401, response.text()));
                    }

                    let body = response.text();
                    let envelope = match ocs_codec::decode(&body, response.content_type(), shape) {
                        Ok(envelope) => envelope,
                        Err(_) if !response.is_success() => {
                            return Err(ClientError::http(response.status, body));
                        }
                        Err(e) => {
                            warn!("{}: {}", operation, e);
                            return Err(e);
                        }
                    };

                    envelope.into_result().map_err(ClientError::from)
                }
            })
            .instrument(self.span.clone())
            .await
    }
}
