use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info};

use super::{into_strings, require_non_empty, unexpected_payload, CLOUD_SERVICE};
use crate::errors::{ClientError, Result};
use crate::models::{OcsData, User, UserAttributeKey};
use crate::ocs_codec::OcsShape;
use crate::services::connection::Connection;
use crate::services::url_management::encode_segment;

/// User provisioning, group membership and sub-admin rights
#[derive(Clone)]
pub struct UserService {
    connection: Arc<Connection>,
}

impl UserService {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    async fn call(&self, operation: &str, method: Method, action: &str, params: &[(&str, String)]) -> Result<bool> {
        self.connection
            .ocs(operation, method, CLOUD_SERVICE, action, params, OcsShape::Empty)
            .await?;
        Ok(true)
    }

    async fn strings(&self, operation: &str, action: &str, params: &[(&str, String)], key: Option<&'static str>) -> Result<Vec<String>> {
        let data = self
            .connection
            .ocs(operation, Method::GET, CLOUD_SERVICE, action, params, OcsShape::StringList { key })
            .await?;
        into_strings(operation, data)
    }

    /// Fails with the server's status code when the user cannot be created,
    /// e.g. `102` when it already exists.
    pub async fn create_user(&self, username: &str, initial_password: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        info!("👤 Creating user {}", username);
        self.call(
            "create_user",
            Method::POST,
            "users",
            &[("userid", username.to_string()), ("password", initial_password.to_string())],
        )
        .await
    }

    pub async fn delete_user(&self, username: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        let action = format!("users/{}", encode_segment(username));
        self.call("delete_user", Method::DELETE, &action, &[]).await
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        Ok(self.search_users(username).await?.iter().any(|u| u == username))
    }

    pub async fn search_users(&self, search: &str) -> Result<Vec<String>> {
        self.strings("search_users", "users", &[("search", search.to_string())], Some("users"))
            .await
    }

    pub async fn get_user_attributes(&self, username: &str) -> Result<User> {
        require_non_empty(username, "Username")?;
        let action = format!("users/{}", encode_segment(username));
        match self
            .connection
            .ocs("get_user_attributes", Method::GET, CLOUD_SERVICE, &action, &[], OcsShape::User)
            .await?
        {
            OcsData::User(user) => Ok(user),
            other => Err(unexpected_payload("get_user_attributes", &other)),
        }
    }

    pub async fn set_user_attribute(&self, username: &str, key: UserAttributeKey, value: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        let action = format!("users/{}", encode_segment(username));
        self.call(
            "set_user_attribute",
            Method::PUT,
            &action,
            &[("key", key.as_str().to_string()), ("value", value.to_string())],
        )
        .await
    }

    pub async fn enable_user(&self, username: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        let action = format!("users/{}/enable", encode_segment(username));
        self.call("enable_user", Method::PUT, &action, &[]).await
    }

    pub async fn disable_user(&self, username: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        let action = format!("users/{}/disable", encode_segment(username));
        self.call("disable_user", Method::PUT, &action, &[]).await
    }

    pub async fn add_user_to_group(&self, username: &str, group: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        require_non_empty(group, "Group name")?;
        let action = format!("users/{}/groups", encode_segment(username));
        self.call("add_user_to_group", Method::POST, &action, &[("groupid", group.to_string())])
            .await
    }

    pub async fn get_user_groups(&self, username: &str) -> Result<Vec<String>> {
        require_non_empty(username, "Username")?;
        let action = format!("users/{}/groups", encode_segment(username));
        self.strings("get_user_groups", &action, &[], Some("groups")).await
    }

    pub async fn is_user_in_group(&self, username: &str, group: &str) -> Result<bool> {
        require_non_empty(group, "Group name")?;
        Ok(self.get_user_groups(username).await?.iter().any(|g| g == group))
    }

    pub async fn remove_user_from_group(&self, username: &str, group: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        require_non_empty(group, "Group name")?;
        let action = format!("users/{}/groups", encode_segment(username));
        self.call("remove_user_from_group", Method::DELETE, &action, &[("groupid", group.to_string())])
            .await
    }

    pub async fn add_user_to_sub_admin_group(&self, username: &str, group: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        require_non_empty(group, "Group name")?;
        let action = format!("users/{}/subadmins", encode_segment(username));
        self.call("add_user_to_sub_admin_group", Method::POST, &action, &[("groupid", group.to_string())])
            .await
    }

    /// Groups the user administers. The server reports "none" as status 102,
    /// which is returned here as an empty list.
    pub async fn get_user_sub_admin_groups(&self, username: &str) -> Result<Vec<String>> {
        require_non_empty(username, "Username")?;
        let action = format!("users/{}/subadmins", encode_segment(username));
        match self.strings("get_user_sub_admin_groups", &action, &[], None).await {
            Err(ClientError::Ocs(e)) if e.is_empty_result() => {
                debug!("{} administers no groups", username);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    pub async fn is_user_in_sub_admin_group(&self, username: &str, group: &str) -> Result<bool> {
        require_non_empty(group, "Group name")?;
        Ok(self
            .get_user_sub_admin_groups(username)
            .await?
            .iter()
            .any(|g| g == group))
    }

    pub async fn remove_user_from_sub_admin_group(&self, username: &str, group: &str) -> Result<bool> {
        require_non_empty(username, "Username")?;
        require_non_empty(group, "Group name")?;
        let action = format!("users/{}/subadmins", encode_segment(username));
        self.call(
            "remove_user_from_sub_admin_group",
            Method::DELETE,
            &action,
            &[("groupid", group.to_string())],
        )
        .await
    }
}
