//! Read-only checks against a real server configured through `OWNCLOUD_URL`,
//! `OWNCLOUD_USER` and `OWNCLOUD_PASSWORD`. Run with `--ignored`.

use owncloud_client::{Client, ClientConfig};

fn live_client() -> Client {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let config = ClientConfig::from_env().expect("OWNCLOUD_* environment must be set");
    Client::new(config).expect("Failed to build client")
}

#[tokio::test]
#[ignore = "requires a running ownCloud server"]
async fn test_live_root_listing() {
    let client = live_client();
    let entries = client.webdav().list("/").await.unwrap();
    for entry in &entries {
        assert!(!entry.name.is_empty());
        assert!(entry.full_path().starts_with('/'));
    }
    assert!(client.webdav().exists("/").await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running ownCloud server"]
async fn test_live_server_config_and_shares() {
    let client = live_client();
    let config = client.apps().get_config().await.unwrap();
    assert!(!config.version.is_empty());

    // Any account may list its own shares
    client.shares().get_shares(None, None, None).await.unwrap();
}
