use reqwest::Method;
use std::sync::Arc;
use tracing::info;

use super::{into_strings, require_non_empty, unexpected_payload, CLOUD_SERVICE, ROOT_SERVICE};
use crate::errors::Result;
use crate::models::{AppInfo, Config, OcsData};
use crate::ocs_codec::OcsShape;
use crate::services::connection::Connection;
use crate::services::url_management::encode_segment;

/// App management plus the server `config` endpoint
#[derive(Clone)]
pub struct AppService {
    connection: Arc<Connection>,
}

impl AppService {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    pub async fn get_config(&self) -> Result<Config> {
        match self
            .connection
            .ocs("get_config", Method::GET, ROOT_SERVICE, "config", &[], OcsShape::Config)
            .await?
        {
            OcsData::Config(config) => Ok(config),
            other => Err(unexpected_payload("get_config", &other)),
        }
    }

    pub async fn get_apps(&self) -> Result<Vec<String>> {
        let data = self
            .connection
            .ocs(
                "get_apps",
                Method::GET,
                CLOUD_SERVICE,
                "apps",
                &[],
                OcsShape::StringList { key: Some("apps") },
            )
            .await?;
        into_strings("get_apps", data)
    }

    pub async fn get_app(&self, app_id: &str) -> Result<AppInfo> {
        require_non_empty(app_id, "App id")?;
        let action = format!("apps/{}", encode_segment(app_id));
        match self
            .connection
            .ocs("get_app", Method::GET, CLOUD_SERVICE, &action, &[], OcsShape::AppInfo)
            .await?
        {
            OcsData::App(app) => Ok(app),
            other => Err(unexpected_payload("get_app", &other)),
        }
    }

    pub async fn enable_app(&self, app_id: &str) -> Result<bool> {
        require_non_empty(app_id, "App id")?;
        info!("Enabling app {}", app_id);
        let action = format!("apps/{}", encode_segment(app_id));
        self.connection
            .ocs("enable_app", Method::POST, CLOUD_SERVICE, &action, &[], OcsShape::Empty)
            .await?;
        Ok(true)
    }

    pub async fn disable_app(&self, app_id: &str) -> Result<bool> {
        require_non_empty(app_id, "App id")?;
        info!("Disabling app {}", app_id);
        let action = format!("apps/{}", encode_segment(app_id));
        self.connection
            .ocs("disable_app", Method::DELETE, CLOUD_SERVICE, &action, &[], OcsShape::Empty)
            .await?;
        Ok(true)
    }
}
