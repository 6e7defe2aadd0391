use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ClientError, Result};

/// Share permission bitmask
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Permissions(i32);

impl Permissions {
    pub const READ: Permissions = Permissions(1);
    pub const UPDATE: Permissions = Permissions(2);
    pub const CREATE: Permissions = Permissions(4);
    pub const DELETE: Permissions = Permissions(8);
    pub const SHARE: Permissions = Permissions(16);
    pub const ALL: Permissions = Permissions(31);
    /// Not specified; the endpoint applies its default
    pub const NONE: Permissions = Permissions(-1);

    pub const fn from_bits(bits: i32) -> Self {
        Permissions(bits)
    }

    pub const fn bits(&self) -> i32 {
        self.0
    }

    pub fn is_unspecified(&self) -> bool {
        self.0 == -1
    }

    pub fn contains(&self, other: Permissions) -> bool {
        other.0 > 0 && self.0 > 0 && self.0 & other.0 == other.0
    }

    /// A concrete mask within `READ..=ALL`
    pub fn is_valid_mask(&self) -> bool {
        (1..=Self::ALL.0).contains(&self.0)
    }

    /// Rejects anything that is neither a valid mask nor the unspecified sentinel
    pub fn validate(&self) -> Result<()> {
        if self.is_unspecified() || self.is_valid_mask() {
            Ok(())
        } else {
            Err(ClientError::validation(format!(
                "Share permissions must be between 1 and 31, got {}",
                self.0
            )))
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::NONE
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Self) -> Self::Output {
        Permissions(self.0.max(0) | rhs.0.max(0))
    }
}

impl std::fmt::Display for Permissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareType {
    User,
    Group,
    Link,
    Remote,
    None,
}

impl ShareType {
    pub fn code(&self) -> i32 {
        match self {
            ShareType::User => 0,
            ShareType::Group => 1,
            ShareType::Link => 3,
            ShareType::Remote => 6,
            ShareType::None => -1,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ShareType::User,
            1 => ShareType::Group,
            3 => ShareType::Link,
            6 => ShareType::Remote,
            _ => ShareType::None,
        }
    }
}

/// Variant-specific share fields, selected by the share-type discriminant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShareKind {
    Link { url: String, token: String },
    User { shared_with: String },
    Group { shared_with: String },
    Remote { shared_with: String },
    Unknown { share_type: i64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdvancedShareProperties {
    pub item_type: Option<String>,
    pub item_source: Option<String>,
    pub parent: Option<String>,
    pub file_source: Option<String>,
    pub file_parent: Option<String>,
    pub share_time: Option<DateTime<Utc>>,
    pub expiration: Option<DateTime<Utc>>,
    pub mail_sent: Option<bool>,
    pub owner: Option<String>,
    pub owner_display_name: Option<String>,
    pub share_with_display_name: Option<String>,
    pub storage_id: Option<String>,
    pub storage: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Share {
    pub id: String,
    pub target_path: String,
    pub permissions: Permissions,
    pub advanced: AdvancedShareProperties,
    pub kind: ShareKind,
}

impl Share {
    pub fn share_type(&self) -> ShareType {
        match &self.kind {
            ShareKind::Link { .. } => ShareType::Link,
            ShareKind::User { .. } => ShareType::User,
            ShareKind::Group { .. } => ShareType::Group,
            ShareKind::Remote { .. } => ShareType::Remote,
            ShareKind::Unknown { .. } => ShareType::None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            ShareKind::Link { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.kind {
            ShareKind::Link { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn shared_with(&self) -> Option<&str> {
        match &self.kind {
            ShareKind::User { shared_with }
            | ShareKind::Group { shared_with }
            | ShareKind::Remote { shared_with } => Some(shared_with),
            _ => None,
        }
    }
}

/// Fields accepted by `update_share`; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareUpdate {
    pub permissions: Option<Permissions>,
    pub password: Option<String>,
    pub public_upload: Option<bool>,
    /// Expiration date as `YYYY-MM-DD`
    pub expire_date: Option<String>,
}

impl ShareUpdate {
    pub fn is_empty(&self) -> bool {
        self.permissions.map_or(true, |p| p.is_unspecified())
            && self.password.is_none()
            && self.public_upload.is_none()
            && self.expire_date.is_none()
    }
}

/// A federated share waiting to be accepted or declined
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteShare {
    pub id: String,
    pub remote: String,
    pub remote_id: Option<String>,
    pub share_token: Option<String>,
    pub name: String,
    pub owner: String,
    pub user: Option<String>,
    pub mountpoint: Option<String>,
    pub accepted: bool,
}
