use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::errors::ClientError;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_DAV_ROOT: &str = "remote.php/webdav";
pub const DEFAULT_OCS_ROOT: &str = "ocs/v1.php";

/// Authentication scheme attached to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    #[default]
    Basic,
    /// Sends the password as an OAuth2 bearer token
    Bearer,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub scheme: AuthScheme,
}

impl Credentials {
    pub fn basic<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            scheme: AuthScheme::Basic,
        }
    }
}

// Keeps passwords out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Encoding requested from OCS endpoints through the `format` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

impl std::str::FromStr for ResponseFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            other => Err(ClientError::config(format!("Unknown OCS format '{}'", other))),
        }
    }
}

/// Connection settings for one ownCloud instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub credentials: Credentials,
    pub timeout_seconds: u64,
    pub proxy_url: Option<String>,
    pub response_format: ResponseFormat,
    pub dav_root: String,
    pub ocs_root: String,
}

impl ClientConfig {
    pub fn new<U: Into<String>, N: Into<String>, P: Into<String>>(server_url: U, username: N, password: P) -> Self {
        let server_url: String = server_url.into();
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            credentials: Credentials::basic(username, password),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            proxy_url: None,
            response_format: ResponseFormat::default(),
            dav_root: DEFAULT_DAV_ROOT.to_string(),
            ocs_root: DEFAULT_OCS_ROOT.to_string(),
        }
    }

    /// Reads `OWNCLOUD_*` variables, loading a `.env` file first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server_url = env::var("OWNCLOUD_URL")
            .map_err(|_| anyhow::anyhow!("OWNCLOUD_URL must be set"))?;
        let username = env::var("OWNCLOUD_USER")
            .map_err(|_| anyhow::anyhow!("OWNCLOUD_USER must be set"))?;
        let password = env::var("OWNCLOUD_PASSWORD").unwrap_or_default();

        let mut config = ClientConfig::new(server_url, username, password);
        config.timeout_seconds = env::var("OWNCLOUD_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        config.proxy_url = env::var("OWNCLOUD_PROXY").ok().filter(|s| !s.trim().is_empty());
        if let Ok(format) = env::var("OWNCLOUD_FORMAT") {
            config.response_format = format.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.server_url.is_empty() {
            return Err(ClientError::config("Server URL cannot be empty"));
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(ClientError::config("Server URL must start with http:// or https://"));
        }

        url::Url::parse(&self.server_url)
            .map_err(|e| ClientError::config(format!("Invalid server URL '{}': {}", self.server_url, e)))?;

        if self.credentials.username.is_empty() {
            return Err(ClientError::config("Username cannot be empty"));
        }

        if let Some(proxy) = &self.proxy_url {
            url::Url::parse(proxy)
                .map_err(|e| ClientError::config(format!("Invalid proxy URL '{}': {}", proxy, e)))?;
        }

        Ok(())
    }

    /// Request timeout; anything under one second falls back to the default
    pub fn timeout(&self) -> Duration {
        if self.timeout_seconds < 1 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
        } else {
            Duration::from_secs(self.timeout_seconds)
        }
    }
}

/// Retry budget and backoff schedule
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Multiplied by the retry number for transient failures
    pub transient_delay_ms: u64,
    /// Pause before the second attempt after an authorization failure
    pub unauthorized_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            transient_delay_ms: 1000, // 1 second, then 2
            unauthorized_delay_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ClientConfig::new("https://cloud.example.com/", "admin", "secret");
        assert_eq!(config.server_url, "https://cloud.example.com");
        assert_eq!(config.credentials.scheme, AuthScheme::Basic);
        assert_eq!(config.dav_root, "remote.php/webdav");
        assert_eq!(config.ocs_root, "ocs/v1.php");
    }

    #[test]
    fn test_timeout_falls_back_to_default() {
        let mut config = ClientConfig::new("https://cloud.example.com", "admin", "secret");
        config.timeout_seconds = 0;
        assert_eq!(config.timeout(), Duration::from_secs(30));

        config.timeout_seconds = 5;
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(ClientConfig::new("", "admin", "pw").validate().is_err());
        assert!(ClientConfig::new("ftp://cloud.example.com", "admin", "pw").validate().is_err());
        assert!(ClientConfig::new("https://cloud.example.com", "", "pw").validate().is_err());

        let mut with_proxy = ClientConfig::new("https://cloud.example.com", "admin", "pw");
        with_proxy.proxy_url = Some("not a url".to_string());
        assert!(with_proxy.validate().is_err());

        with_proxy.proxy_url = Some("http://proxy.local:3128".to_string());
        assert!(with_proxy.validate().is_ok());
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let creds = Credentials::basic("admin", "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_response_format_parsing() {
        assert_eq!("JSON".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!("xml".parse::<ResponseFormat>().unwrap(), ResponseFormat::Xml);
        assert!("yaml".parse::<ResponseFormat>().is_err());
    }
}
