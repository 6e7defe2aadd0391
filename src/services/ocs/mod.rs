//! OCS control-plane operations, one service per capability.

pub mod apps;
pub mod attributes;
pub mod groups;
pub mod shares;
pub mod users;

pub use apps::AppService;
pub use attributes::AttributeService;
pub use groups::GroupService;
pub use shares::ShareService;
pub use users::UserService;

use crate::errors::{ClientError, Result};
use crate::models::OcsData;

pub(crate) const SHARE_SERVICE: &str = "apps/files_sharing/api/v1";
pub(crate) const CLOUD_SERVICE: &str = "cloud";
pub(crate) const PRIVATEDATA_SERVICE: &str = "privatedata";
/// `config` lives directly below the OCS root
pub(crate) const ROOT_SERVICE: &str = "";

pub(crate) fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::validation(format!("{} must not be empty", what)));
    }
    Ok(())
}

pub(crate) fn bool_param(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

pub(crate) fn unexpected_payload(operation: &str, data: &OcsData) -> ClientError {
    ClientError::parse(
        format!("{} response", operation),
        format!("unexpected payload {:?}", data),
        "",
    )
}

pub(crate) fn into_strings(operation: &str, data: OcsData) -> Result<Vec<String>> {
    match data {
        OcsData::Strings(items) => Ok(items),
        other => Err(unexpected_payload(operation, &other)),
    }
}
