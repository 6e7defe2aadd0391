//! Client for ownCloud servers: WebDAV file operations and the OCS sharing
//! and provisioning API, with typed results and bounded retries.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod ocs_codec;
pub mod services;
pub mod webdav_xml_parser;

pub use client::{Client, ClientBuilder};
pub use config::{AuthScheme, ClientConfig, Credentials, ResponseFormat, RetryConfig};
pub use errors::{ClientError, OcsResponseError, Result, RetryClass, TransportError};
