use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::lenient;
use crate::models::{
    AdvancedShareProperties, AppAttribute, AppInfo, Config, OcsMeta, Permissions, Quota, RemoteShare, Share,
    ShareKind, ShareType, User,
};

// Wire forms of the `data` payloads. Both encodings reach these through the
// same `serde_json::Value` tree; conversion into the public models happens
// after deserialization so field naming stays local to this module.

type ShapeResult<T> = std::result::Result<T, String>;

#[derive(Debug, Deserialize)]
struct MetaPayload {
    #[serde(default, deserialize_with = "lenient::string")]
    status: String,
    #[serde(deserialize_with = "lenient::integer")]
    statuscode: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SharePayload {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    share_type: Option<i64>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    share_with: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    token: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    file_target: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    path: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    permissions: Option<i64>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    item_source: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    parent: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    file_source: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    file_parent: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    stime: Option<i64>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    expiration: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_boolean")]
    mail_send: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    uid_owner: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    displayname_owner: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    share_with_displayname: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    storage_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    storage: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RemoteSharePayload {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    remote: String,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    remote_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    share_token: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    owner: String,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    user: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    mountpoint: Option<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    accepted: bool,
}

#[derive(Debug, Default, Deserialize)]
struct QuotaPayload {
    #[serde(default, deserialize_with = "lenient::float")]
    free: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    used: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    total: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    relative: f64,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    #[serde(default, alias = "display-name", deserialize_with = "lenient::string")]
    displayname: String,
    #[serde(default, deserialize_with = "lenient::string")]
    email: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    enabled: bool,
    #[serde(default, deserialize_with = "lenient::object_or_blank")]
    quota: QuotaPayload,
}

#[derive(Debug, Deserialize)]
struct AppInfoPayload {
    #[serde(default, deserialize_with = "lenient::string")]
    id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    licence: String,
    #[serde(default, deserialize_with = "lenient::string")]
    author: String,
    #[serde(default, deserialize_with = "lenient::string")]
    requiremin: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    shipped: bool,
    #[serde(default, deserialize_with = "lenient::boolean")]
    standalone: bool,
    #[serde(default, deserialize_with = "lenient::presence_flag")]
    default_enable: bool,
    #[serde(default, deserialize_with = "lenient::names")]
    types: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_map")]
    remote: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::string_map")]
    documentation: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::string_map")]
    info: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::string_map")]
    public: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ConfigPayload {
    #[serde(default, deserialize_with = "lenient::string")]
    contact: String,
    #[serde(default, deserialize_with = "lenient::string")]
    host: String,
    #[serde(default, deserialize_with = "lenient::string")]
    ssl: String,
    #[serde(default, deserialize_with = "lenient::string")]
    version: String,
    #[serde(default, deserialize_with = "lenient::string")]
    website: String,
}

#[derive(Debug, Deserialize)]
struct AttributePayload {
    #[serde(default, deserialize_with = "lenient::string")]
    app: String,
    #[serde(default, deserialize_with = "lenient::string")]
    key: String,
    #[serde(default, deserialize_with = "lenient::string")]
    value: String,
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(map) if map.is_empty() => "an empty object",
        Value::Object(_) => "an object",
    }
}

/// Deserializes a record that must be a non-empty object
fn record<T: DeserializeOwned>(value: &Value, what: &str) -> ShapeResult<T> {
    match value {
        Value::Object(map) if !map.is_empty() => {
            serde_json::from_value(value.clone()).map_err(|e| format!("invalid {}: {}", what, e))
        }
        other => Err(format!("expected {} object, got {}", what, describe(other))),
    }
}

/// Items of a list payload. XML wraps entries in `<element>` which may appear
/// once (a single item) or repeatedly (an array); an empty element is an
/// empty list.
pub(crate) fn list_items(value: &Value) -> ShapeResult<Vec<&Value>> {
    match value {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(map) => match map.get("element") {
            Some(Value::Array(items)) if map.len() == 1 => Ok(items.iter().collect()),
            Some(item) if map.len() == 1 => Ok(vec![item]),
            None if map.is_empty() => Ok(Vec::new()),
            _ => Err(format!(
                "expected a list, got an object with keys {:?}",
                map.keys().collect::<Vec<_>>()
            )),
        },
        other if lenient::is_blank(other) => Ok(Vec::new()),
        other => Err(format!("expected a list, got {}", describe(other))),
    }
}

pub(crate) fn string_list(value: &Value) -> ShapeResult<Vec<String>> {
    list_items(value)?
        .into_iter()
        .map(|item| lenient::scalar_text(item).ok_or_else(|| format!("expected a string item, got {}", describe(item))))
        .collect()
}

pub(crate) fn meta(value: &Value) -> ShapeResult<OcsMeta> {
    let payload: MetaPayload = record(value, "meta")?;
    Ok(OcsMeta {
        status: payload.status,
        status_code: payload.statuscode,
        message: payload.message,
    })
}

fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc)))
}

pub(crate) fn share(value: &Value) -> ShapeResult<Share> {
    let payload: SharePayload = record(value, "share")?;
    let id = payload.id.ok_or("share payload has no id")?;

    let permissions = match payload.permissions {
        Some(bits) => Permissions::from_bits(
            i32::try_from(bits).map_err(|_| format!("share permissions {} out of range", bits))?,
        ),
        None => Permissions::NONE,
    };

    let shared_with = payload.share_with.unwrap_or_default();
    let kind = match payload.share_type.map(ShareType::from_code) {
        Some(ShareType::Link) => ShareKind::Link {
            url: payload.url.unwrap_or_default(),
            token: payload.token.unwrap_or_default(),
        },
        Some(ShareType::User) => ShareKind::User { shared_with },
        Some(ShareType::Group) => ShareKind::Group { shared_with },
        Some(ShareType::Remote) => ShareKind::Remote { shared_with },
        Some(ShareType::None) => ShareKind::Unknown {
            share_type: payload.share_type.unwrap_or(-1),
        },
        // Creation responses may omit the discriminant
        None if payload.url.is_some() || payload.token.is_some() => ShareKind::Link {
            url: payload.url.unwrap_or_default(),
            token: payload.token.unwrap_or_default(),
        },
        None => ShareKind::Unknown { share_type: -1 },
    };

    let advanced = AdvancedShareProperties {
        item_type: payload.item_type,
        item_source: payload.item_source,
        parent: payload.parent,
        file_source: payload.file_source,
        file_parent: payload.file_parent,
        share_time: payload.stime.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        expiration: payload.expiration.as_deref().and_then(parse_expiration),
        mail_sent: payload.mail_send,
        owner: payload.uid_owner,
        owner_display_name: payload.displayname_owner,
        share_with_display_name: payload.share_with_displayname,
        storage_id: payload.storage_id,
        storage: payload.storage,
    };

    Ok(Share {
        id,
        target_path: payload.file_target.or(payload.path).unwrap_or_default(),
        permissions,
        advanced,
        kind,
    })
}

/// A single share, sent either bare or as a one-element list
pub(crate) fn single_share(value: &Value) -> ShapeResult<Share> {
    match value {
        Value::Object(map) if !map.is_empty() && !map.contains_key("element") => share(value),
        other => match list_items(other)?.first() {
            Some(item) => share(item),
            None => Err("expected a share, got an empty payload".to_string()),
        },
    }
}

pub(crate) fn remote_share(value: &Value) -> ShapeResult<RemoteShare> {
    let payload: RemoteSharePayload = record(value, "remote share")?;
    Ok(RemoteShare {
        id: payload.id.ok_or("remote share payload has no id")?,
        remote: payload.remote,
        remote_id: payload.remote_id,
        share_token: payload.share_token,
        name: payload.name,
        owner: payload.owner,
        user: payload.user,
        mountpoint: payload.mountpoint,
        accepted: payload.accepted,
    })
}

pub(crate) fn user(value: &Value) -> ShapeResult<User> {
    let payload: UserPayload = record(value, "user")?;
    Ok(User {
        display_name: payload.displayname,
        email: payload.email,
        enabled: payload.enabled,
        quota: Quota {
            free: payload.quota.free,
            used: payload.quota.used,
            total: payload.quota.total,
            relative: payload.quota.relative,
        },
    })
}

pub(crate) fn app_info(value: &Value) -> ShapeResult<AppInfo> {
    let payload: AppInfoPayload = record(value, "app")?;
    Ok(AppInfo {
        id: payload.id,
        name: payload.name,
        description: payload.description,
        licence: payload.licence,
        author: payload.author,
        require_min: payload.requiremin,
        shipped: payload.shipped,
        standalone: payload.standalone,
        default_enable: payload.default_enable,
        types: payload.types,
        remote: payload.remote,
        documentation: payload.documentation,
        info: payload.info,
        public: payload.public,
    })
}

pub(crate) fn config(value: &Value) -> ShapeResult<Config> {
    let payload: ConfigPayload = record(value, "config")?;
    Ok(Config {
        contact: payload.contact,
        host: payload.host,
        ssl: payload.ssl,
        version: payload.version,
        website: payload.website,
    })
}

pub(crate) fn attribute(value: &Value) -> ShapeResult<AppAttribute> {
    let payload: AttributePayload = record(value, "attribute")?;
    Ok(AppAttribute {
        app: payload.app,
        key: payload.key,
        value: payload.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_items_shapes() {
        assert_eq!(list_items(&json!(["a", "b"])).unwrap().len(), 2);
        assert_eq!(list_items(&json!({"element": ["a", "b"]})).unwrap().len(), 2);
        assert_eq!(list_items(&json!({"element": "a"})).unwrap().len(), 1);
        assert!(list_items(&json!("")).unwrap().is_empty());
        assert!(list_items(&json!({})).unwrap().is_empty());
        assert!(list_items(&Value::Null).unwrap().is_empty());

        assert!(list_items(&json!({"id": "1"})).is_err());
        assert!(list_items(&json!("garbage")).is_err());
        assert!(list_items(&json!(42)).is_err());
    }

    #[test]
    fn test_string_list_rejects_nested_items() {
        assert_eq!(string_list(&json!(["admin", 7])).unwrap(), vec!["admin", "7"]);
        assert!(string_list(&json!([{"name": "admin"}])).is_err());
    }

    #[test]
    fn test_meta_requires_integer_status_code() {
        let meta = meta(&json!({"status": "ok", "statuscode": "100", "message": null})).unwrap();
        assert_eq!(meta.status_code, 100);
        assert_eq!(meta.message, "");

        assert!(super::meta(&json!({"statuscode": "100.5"})).is_err());
        assert!(super::meta(&json!({"statuscode": 100.5})).is_err());
        assert!(super::meta(&json!({"status": "ok"})).is_err());
    }

    #[test]
    fn test_user_share_with_advanced_fields() {
        let obj = json!({
            "id": 7,
            "share_type": 0,
            "share_with": "alice",
            "file_target": "/Shared/report.pdf",
            "permissions": "19",
            "stime": 1700000000,
            "expiration": "2030-01-31 00:00:00",
            "mail_send": "0",
            "uid_owner": "admin",
            "item_type": "file"
        });

        let share = share(&obj).unwrap();
        assert_eq!(share.id, "7");
        assert_eq!(share.kind, ShareKind::User { shared_with: "alice".to_string() });
        assert_eq!(share.permissions.bits(), 19);
        assert_eq!(share.advanced.owner.as_deref(), Some("admin"));
        assert_eq!(share.advanced.mail_sent, Some(false));
        assert!(share.advanced.share_time.is_some());
        assert!(share.advanced.expiration.is_some());
    }

    #[test]
    fn test_unknown_share_type_falls_back() {
        let share = share(&json!({"id": "9", "share_type": "4"})).unwrap();
        assert_eq!(share.kind, ShareKind::Unknown { share_type: 4 });
        assert_eq!(share.permissions, Permissions::NONE);
    }

    #[test]
    fn test_share_shape_errors() {
        assert!(single_share(&json!([])).is_err());
        assert!(single_share(&json!("")).is_err());
        assert!(single_share(&json!("garbage")).is_err());
        assert!(share(&json!({"url": "https://host/s/1"})).is_err());
        assert!(share(&json!({"id": "1", "permissions": 4294967296_i64})).is_err());
        assert!(share(&json!({"id": "1", "permissions": "31.5"})).is_err());

        let wrapped = single_share(&json!({"element": {"id": "3", "share_type": 1}})).unwrap();
        assert_eq!(wrapped.id, "3");
    }

    #[test]
    fn test_record_shapes_reject_non_objects() {
        assert!(user(&json!("garbage")).is_err());
        assert!(user(&json!([])).is_err());
        assert!(config(&json!("")).is_err());
        assert!(app_info(&json!(["files"])).is_err());
        assert!(attribute(&json!("theme")).is_err());
        assert!(remote_share(&json!({"remote": "https://other"})).is_err());
    }

    #[test]
    fn test_user_with_blank_quota() {
        let user = user(&json!({"displayname": "X", "enabled": "1", "quota": ""})).unwrap();
        assert_eq!(user.display_name, "X");
        assert!(user.enabled);
        assert_eq!(user.quota, Quota::default());
    }

    #[test]
    fn test_app_types_as_keys() {
        let app = app_info(&json!({"id": "files", "types": {"filesystem": ""}, "shipped": "true"})).unwrap();
        assert_eq!(app.types, vec!["filesystem".to_string()]);
        assert!(app.shipped);
        assert!(!app.default_enable);

        let flagged = app_info(&json!({"id": "files", "default_enable": ""})).unwrap();
        assert!(flagged.default_enable);
    }
}
