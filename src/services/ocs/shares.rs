use reqwest::Method;
use std::sync::Arc;
use tracing::info;

use super::{bool_param, require_non_empty, unexpected_payload, SHARE_SERVICE};
use crate::errors::Result;
use crate::models::{OcsData, Permissions, RemoteShare, Share, ShareKind, ShareType, ShareUpdate};
use crate::ocs_codec::OcsShape;
use crate::services::connection::Connection;
use crate::services::url_management::encode_segment;

/// Link, user, group and federated shares
#[derive(Clone)]
pub struct ShareService {
    connection: Arc<Connection>,
}

impl ShareService {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// Creates a public link. `Permissions::NONE` leaves the server default in place.
    pub async fn share_with_link(
        &self,
        path: &str,
        permissions: Permissions,
        password: Option<&str>,
        public_upload: Option<bool>,
    ) -> Result<Share> {
        require_non_empty(path, "Share path")?;
        permissions.validate()?;

        let mut params = vec![
            ("shareType", ShareType::Link.code().to_string()),
            ("path", path.to_string()),
        ];
        if !permissions.is_unspecified() {
            params.push(("permissions", permissions.to_string()));
        }
        if let Some(password) = password {
            params.push(("password", password.to_string()));
        }
        if let Some(public_upload) = public_upload {
            params.push(("publicUpload", bool_param(public_upload)));
        }

        let share = self.create("share_with_link", &params).await?;
        info!("🔗 Created link share {} for {}", share.id, path);
        Ok(complete_share(share, path, permissions, ShareType::Link, ""))
    }

    /// Shares with a local user, or with a federated cloud id when `remote_user` is set
    pub async fn share_with_user(
        &self,
        path: &str,
        username: &str,
        permissions: Permissions,
        remote_user: bool,
    ) -> Result<Share> {
        require_non_empty(path, "Share path")?;
        require_non_empty(username, "Username")?;
        permissions.validate()?;

        let share_type = if remote_user { ShareType::Remote } else { ShareType::User };
        let params = share_params(path, username, permissions, share_type);
        let share = self.create("share_with_user", &params).await?;
        Ok(complete_share(share, path, permissions, share_type, username))
    }

    pub async fn share_with_group(&self, path: &str, group: &str, permissions: Permissions) -> Result<Share> {
        require_non_empty(path, "Share path")?;
        require_non_empty(group, "Group name")?;
        permissions.validate()?;

        let params = share_params(path, group, permissions, ShareType::Group);
        let share = self.create("share_with_group", &params).await?;
        Ok(complete_share(share, path, permissions, ShareType::Group, group))
    }

    /// Returns `Ok(false)` without contacting the server when `update` is empty
    pub async fn update_share(&self, share_id: &str, update: &ShareUpdate) -> Result<bool> {
        require_non_empty(share_id, "Share id")?;
        if update.is_empty() {
            return Ok(false);
        }

        let mut params = Vec::new();
        if let Some(permissions) = update.permissions.filter(|p| !p.is_unspecified()) {
            permissions.validate()?;
            params.push(("permissions", permissions.to_string()));
        }
        if let Some(password) = &update.password {
            params.push(("password", password.clone()));
        }
        if let Some(public_upload) = update.public_upload {
            params.push(("publicUpload", bool_param(public_upload)));
        }
        if let Some(expire_date) = &update.expire_date {
            params.push(("expireDate", expire_date.clone()));
        }

        let action = format!("shares/{}", encode_segment(share_id));
        self.connection
            .ocs("update_share", Method::PUT, SHARE_SERVICE, &action, &params, OcsShape::Empty)
            .await?;
        Ok(true)
    }

    pub async fn delete_share(&self, share_id: &str) -> Result<bool> {
        require_non_empty(share_id, "Share id")?;
        let action = format!("shares/{}", encode_segment(share_id));
        self.connection
            .ocs("delete_share", Method::DELETE, SHARE_SERVICE, &action, &[], OcsShape::Empty)
            .await?;
        Ok(true)
    }

    /// All shares of the current user, or those on `path` when given
    pub async fn get_shares(&self, path: Option<&str>, reshares: Option<bool>, subfiles: Option<bool>) -> Result<Vec<Share>> {
        let mut params = Vec::new();
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            params.push(("path", path.to_string()));
        }
        if let Some(reshares) = reshares {
            params.push(("reshares", bool_param(reshares)));
        }
        if let Some(subfiles) = subfiles {
            params.push(("subfiles", bool_param(subfiles)));
        }

        match self
            .connection
            .ocs("get_shares", Method::GET, SHARE_SERVICE, "shares", &params, OcsShape::ShareList)
            .await?
        {
            OcsData::Shares(shares) => Ok(shares),
            other => Err(unexpected_payload("get_shares", &other)),
        }
    }

    pub async fn get_share(&self, share_id: &str) -> Result<Option<Share>> {
        require_non_empty(share_id, "Share id")?;
        let action = format!("shares/{}", encode_segment(share_id));
        match self
            .connection
            .ocs("get_share", Method::GET, SHARE_SERVICE, &action, &[], OcsShape::ShareList)
            .await?
        {
            OcsData::Shares(shares) => Ok(shares.into_iter().next()),
            other => Err(unexpected_payload("get_share", &other)),
        }
    }

    pub async fn is_shared(&self, path: &str) -> Result<bool> {
        require_non_empty(path, "Share path")?;
        Ok(!self.get_shares(Some(path), None, None).await?.is_empty())
    }

    /// Federated shares offered to the current user and not yet accepted
    pub async fn list_open_remote_shares(&self) -> Result<Vec<RemoteShare>> {
        match self
            .connection
            .ocs(
                "list_open_remote_shares",
                Method::GET,
                SHARE_SERVICE,
                "remote_shares/pending",
                &[],
                OcsShape::RemoteShareList,
            )
            .await?
        {
            OcsData::RemoteShares(shares) => Ok(shares),
            other => Err(unexpected_payload("list_open_remote_shares", &other)),
        }
    }

    pub async fn accept_remote_share(&self, share_id: &str) -> Result<bool> {
        require_non_empty(share_id, "Share id")?;
        let action = format!("remote_shares/pending/{}", encode_segment(share_id));
        self.connection
            .ocs("accept_remote_share", Method::POST, SHARE_SERVICE, &action, &[], OcsShape::Empty)
            .await?;
        Ok(true)
    }

    pub async fn decline_remote_share(&self, share_id: &str) -> Result<bool> {
        require_non_empty(share_id, "Share id")?;
        let action = format!("remote_shares/pending/{}", encode_segment(share_id));
        self.connection
            .ocs("decline_remote_share", Method::DELETE, SHARE_SERVICE, &action, &[], OcsShape::Empty)
            .await?;
        Ok(true)
    }

    async fn create(&self, operation: &str, params: &[(&str, String)]) -> Result<Share> {
        match self
            .connection
            .ocs(operation, Method::POST, SHARE_SERVICE, "shares", params, OcsShape::Share)
            .await?
        {
            OcsData::Share(share) => Ok(share),
            other => Err(unexpected_payload(operation, &other)),
        }
    }
}

fn share_params(path: &str, share_with: &str, permissions: Permissions, share_type: ShareType) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("shareType", share_type.code().to_string()),
        ("path", path.to_string()),
        ("shareWith", share_with.to_string()),
    ];
    if !permissions.is_unspecified() {
        params.push(("permissions", permissions.to_string()));
    }
    params
}

/// Creation responses usually carry little more than the id; fill in what
/// the request already established.
fn complete_share(mut share: Share, path: &str, permissions: Permissions, share_type: ShareType, share_with: &str) -> Share {
    if share.target_path.is_empty() {
        share.target_path = path.to_string();
    }
    if share.permissions.is_unspecified() {
        share.permissions = permissions;
    }

    let missing_kind = matches!(share.kind, ShareKind::Unknown { .. }) || share.share_type() != share_type;
    if missing_kind {
        share.kind = match (share_type, share.kind) {
            (ShareType::Link, ShareKind::Link { url, token }) => ShareKind::Link { url, token },
            (ShareType::Link, _) => ShareKind::Link {
                url: String::new(),
                token: String::new(),
            },
            (ShareType::User, _) => ShareKind::User {
                shared_with: share_with.to_string(),
            },
            (ShareType::Group, _) => ShareKind::Group {
                shared_with: share_with.to_string(),
            },
            (ShareType::Remote, _) => ShareKind::Remote {
                shared_with: share_with.to_string(),
            },
            (ShareType::None, kind) => kind,
        };
    } else if let ShareKind::User { shared_with } | ShareKind::Group { shared_with } | ShareKind::Remote { shared_with } =
        &mut share.kind
    {
        if shared_with.is_empty() {
            *shared_with = share_with.to_string();
        }
    }
    share
}
