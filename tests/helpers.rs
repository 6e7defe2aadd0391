#![allow(dead_code)]

use async_trait::async_trait;
use owncloud_client::services::Sleeper;
use owncloud_client::{Client, ClientConfig, ResponseFormat};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::MockServer;

pub const USER: &str = "admin";
pub const PASSWORD: &str = "secret";

/// Records requested pauses without waiting
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn test_config(server_url: &str, format: ResponseFormat) -> ClientConfig {
    let mut config = ClientConfig::new(server_url, USER, PASSWORD);
    config.timeout_seconds = 5;
    config.response_format = format;
    config
}

/// Client against the mock server; retries do not sleep
pub fn test_client(server: &MockServer) -> Client {
    test_client_with_format(server, ResponseFormat::Json)
}

pub fn test_client_with_format(server: &MockServer, format: ResponseFormat) -> Client {
    init_tracing();
    Client::builder(test_config(&server.uri(), format))
        .sleeper(Arc::new(RecordingSleeper::default()))
        .build()
        .expect("Failed to build client")
}

pub fn ocs_json(status_code: i64, message: &str, data: Value) -> String {
    let status = if status_code == 100 { "ok" } else { "failure" };
    serde_json::json!({
        "ocs": {
            "meta": {
                "status": status,
                "statuscode": status_code,
                "message": message,
            },
            "data": data,
        }
    })
    .to_string()
}

pub fn ocs_xml(status_code: i64, message: &str, data: &str) -> String {
    let status = if status_code == 100 { "ok" } else { "failure" };
    format!(
        r#"<?xml version="1.0"?>
<ocs>
 <meta>
  <status>{}</status>
  <statuscode>{}</statuscode>
  <message>{}</message>
 </meta>
 <data>{}</data>
</ocs>"#,
        status, status_code, message, data
    )
}

pub fn propfind_entry(href: &str, props: &str) -> String {
    format!(
        r#"<d:response>
  <d:href>{}</d:href>
  <d:propstat>
   <d:prop>{}</d:prop>
   <d:status>HTTP/1.1 200 OK</d:status>
  </d:propstat>
 </d:response>"#,
        href, props
    )
}

pub fn multistatus(entries: &[String]) -> String {
    format!(
        r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:s="http://sabredav.org/ns" xmlns:oc="http://owncloud.org/ns">
{}
</d:multistatus>"#,
        entries.join("\n")
    )
}
