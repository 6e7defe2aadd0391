use std::sync::Arc;
use tracing::{info, info_span, Span};

use crate::config::{ClientConfig, RetryConfig};
use crate::errors::Result;
use crate::services::{
    AppService, AttributeService, Connection, GroupService, HttpTransport, ReqwestTransport, RetryPolicy,
    ShareService, Sleeper, TokioSleeper, UrlManager, UserService, WebDavService,
};

/// Entry point to one ownCloud instance.
///
/// Cheap to clone and safe to share between tasks: all configuration is
/// fixed at construction and no per-call state is shared.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    webdav: WebDavService,
    shares: ShareService,
    users: UserService,
    groups: GroupService,
    apps: AppService,
    attributes: AttributeService,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        ClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Files and directories
    pub fn webdav(&self) -> &WebDavService {
        &self.webdav
    }

    pub fn shares(&self) -> &ShareService {
        &self.shares
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn groups(&self) -> &GroupService {
        &self.groups
    }

    /// Apps and server config
    pub fn apps(&self) -> &AppService {
        &self.apps
    }

    pub fn attributes(&self) -> &AttributeService {
        &self.attributes
    }
}

pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    retry_config: RetryConfig,
    span: Option<Span>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            sleeper: None,
            retry_config: RetryConfig::default(),
            span: None,
        }
    }

    /// Replaces the reqwest-backed transport
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Span every request is recorded under
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> Result<Client> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };
        let sleeper = self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper));
        let span = self.span.unwrap_or_else(|| {
            info_span!(
                "owncloud_client",
                server = %self.config.server_url,
                user = %self.config.credentials.username
            )
        });

        let urls = UrlManager::new(&self.config)?;
        let connection = Arc::new(Connection::new(
            transport,
            RetryPolicy::new(self.retry_config, sleeper),
            urls,
            self.config.response_format,
            span,
        ));

        info!(parent: connection.span(), "Client ready for {}", self.config.server_url);

        Ok(Client {
            config: Arc::new(self.config),
            webdav: WebDavService::new(connection.clone()),
            shares: ShareService::new(connection.clone()),
            users: UserService::new(connection.clone()),
            groups: GroupService::new(connection.clone()),
            apps: AppService::new(connection.clone()),
            attributes: AttributeService::new(connection),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;

    #[test]
    fn test_build_rejects_invalid_config() {
        assert!(Client::new(ClientConfig::new("not-a-url", "admin", "pw")).is_err());
        assert!(Client::new(ClientConfig::new("https://cloud.example.com", "", "pw")).is_err());
    }

    #[test]
    fn test_invalid_input_fails_before_any_request() {
        let client = Client::new(ClientConfig::new("http://127.0.0.1:9", "admin", "pw")).unwrap();
        let result = tokio_test::block_on(client.users().create_user(" ", "pw"));
        assert!(matches!(result, Err(ClientError::Validation { .. })));
    }

    #[test]
    fn test_client_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<Client>();
    }
}
