use reqwest::Method;
use std::sync::Arc;

use super::{into_strings, require_non_empty, CLOUD_SERVICE};
use crate::errors::Result;
use crate::ocs_codec::OcsShape;
use crate::services::connection::Connection;
use crate::services::url_management::encode_segment;

#[derive(Clone)]
pub struct GroupService {
    connection: Arc<Connection>,
}

impl GroupService {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    pub async fn create_group(&self, group: &str) -> Result<bool> {
        require_non_empty(group, "Group name")?;
        self.connection
            .ocs(
                "create_group",
                Method::POST,
                CLOUD_SERVICE,
                "groups",
                &[("groupid", group.to_string())],
                OcsShape::Empty,
            )
            .await?;
        Ok(true)
    }

    pub async fn delete_group(&self, group: &str) -> Result<bool> {
        require_non_empty(group, "Group name")?;
        let action = format!("groups/{}", encode_segment(group));
        self.connection
            .ocs("delete_group", Method::DELETE, CLOUD_SERVICE, &action, &[], OcsShape::Empty)
            .await?;
        Ok(true)
    }

    pub async fn group_exists(&self, group: &str) -> Result<bool> {
        require_non_empty(group, "Group name")?;
        Ok(self.search_groups(group).await?.iter().any(|g| g == group))
    }

    pub async fn search_groups(&self, search: &str) -> Result<Vec<String>> {
        let data = self
            .connection
            .ocs(
                "search_groups",
                Method::GET,
                CLOUD_SERVICE,
                "groups",
                &[("search", search.to_string())],
                OcsShape::StringList { key: Some("groups") },
            )
            .await?;
        into_strings("search_groups", data)
    }

    pub async fn get_group_members(&self, group: &str) -> Result<Vec<String>> {
        require_non_empty(group, "Group name")?;
        let action = format!("groups/{}", encode_segment(group));
        let data = self
            .connection
            .ocs(
                "get_group_members",
                Method::GET,
                CLOUD_SERVICE,
                &action,
                &[],
                OcsShape::StringList { key: Some("users") },
            )
            .await?;
        into_strings("get_group_members", data)
    }
}
