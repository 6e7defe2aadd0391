use reqwest::Method;
use std::sync::Arc;

use super::{require_non_empty, unexpected_payload, PRIVATEDATA_SERVICE};
use crate::errors::{ClientError, Result};
use crate::models::{AppAttribute, OcsData};
use crate::ocs_codec::OcsShape;
use crate::services::connection::Connection;
use crate::services::url_management::encode_segment;

/// Per-app key/value storage (`privatedata`)
#[derive(Clone)]
pub struct AttributeService {
    connection: Arc<Connection>,
}

impl AttributeService {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// Every attribute of the account when `app` is `None`, otherwise those of
    /// `app`, narrowed to `key` when given
    pub async fn get_attribute(&self, app: Option<&str>, key: Option<&str>) -> Result<Vec<AppAttribute>> {
        let mut action = String::from("getattribute");
        if let Some(app) = app.filter(|a| !a.trim().is_empty()) {
            action.push('/');
            action.push_str(&encode_segment(app));
            if let Some(key) = key.filter(|k| !k.is_empty()) {
                action.push('/');
                action.push_str(&encode_segment(key));
            }
        } else if key.is_some_and(|k| !k.is_empty()) {
            return Err(ClientError::validation("An attribute key requires an app name"));
        }

        match self
            .connection
            .ocs("get_attribute", Method::GET, PRIVATEDATA_SERVICE, &action, &[], OcsShape::AttributeList)
            .await?
        {
            OcsData::Attributes(attributes) => Ok(attributes),
            other => Err(unexpected_payload("get_attribute", &other)),
        }
    }

    pub async fn set_attribute(&self, app: &str, key: &str, value: &str) -> Result<bool> {
        require_non_empty(app, "App name")?;
        require_non_empty(key, "Attribute key")?;
        let action = format!("setattribute/{}/{}", encode_segment(app), encode_segment(key));
        self.connection
            .ocs(
                "set_attribute",
                Method::POST,
                PRIVATEDATA_SERVICE,
                &action,
                &[("value", value.to_string())],
                OcsShape::Empty,
            )
            .await?;
        Ok(true)
    }

    pub async fn delete_attribute(&self, app: &str, key: &str) -> Result<bool> {
        require_non_empty(app, "App name")?;
        require_non_empty(key, "Attribute key")?;
        let action = format!("deleteattribute/{}/{}", encode_segment(app), encode_segment(key));
        self.connection
            .ocs("delete_attribute", Method::POST, PRIVATEDATA_SERVICE, &action, &[], OcsShape::Empty)
            .await?;
        Ok(true)
    }
}
