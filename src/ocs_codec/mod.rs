//! Decoding of OCS envelopes in either encoding.
//!
//! Bodies are first turned into a `serde_json::Value` tree (XML through
//! [`xml::to_tree`], JSON through [`json::to_tree`]), then the `meta` block is
//! read and the `data` block is extracted according to the shape the calling
//! operation expects. OCS payloads are not self-describing, so the shape is
//! always supplied by the caller.

pub mod json;
mod lenient;
mod shapes;
pub mod xml;

use serde_json::Value;
use tracing::debug;

use crate::errors::{ClientError, Result};
use crate::models::{OcsData, OcsEnvelope, OcsMeta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Xml,
}

/// Expected form of the `data` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcsShape {
    Empty,
    Share,
    ShareList,
    RemoteShareList,
    User,
    /// A list of strings, either directly under `data` or under `data.<key>`
    StringList { key: Option<&'static str> },
    AppInfo,
    Config,
    AttributeList,
}

/// JSON when the content type says so or the body opens with `{`
pub fn detect_encoding(body: &str, content_type: Option<&str>) -> BodyEncoding {
    if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json")) {
        return BodyEncoding::Json;
    }
    if body.trim_start().starts_with('{') {
        BodyEncoding::Json
    } else {
        BodyEncoding::Xml
    }
}

pub fn decode(body: &str, content_type: Option<&str>, shape: OcsShape) -> Result<OcsEnvelope<OcsData>> {
    let tree = match detect_encoding(body, content_type) {
        BodyEncoding::Json => json::to_tree(body)?,
        BodyEncoding::Xml => xml::to_tree(body)?,
    };

    let meta = read_meta(&tree, body)?;
    if !meta.is_success() {
        debug!("OCS failure {}: {}", meta.status_code, meta.message);
        return Ok(OcsEnvelope {
            meta,
            data: OcsData::Empty,
        });
    }

    let data = decode_data(tree.get("data").unwrap_or(&Value::Null), shape)
        .map_err(|message| ClientError::parse(format!("OCS {:?} payload", shape), message, body))?;
    Ok(OcsEnvelope { meta, data })
}

fn read_meta(tree: &Value, body: &str) -> Result<OcsMeta> {
    let meta = tree
        .get("meta")
        .ok_or_else(|| ClientError::parse("OCS envelope", "missing meta block", body))?;
    shapes::meta(meta).map_err(|message| ClientError::parse("OCS envelope", message, body))
}

/// Typed `data` for `shape`; anything of another form is an error message
fn decode_data(data: &Value, shape: OcsShape) -> std::result::Result<OcsData, String> {
    Ok(match shape {
        OcsShape::Empty => OcsData::Empty,
        OcsShape::Share => OcsData::Share(shapes::single_share(data)?),
        OcsShape::ShareList => OcsData::Shares(
            shapes::list_items(data)?
                .into_iter()
                .map(shapes::share)
                .collect::<std::result::Result<_, _>>()?,
        ),
        OcsShape::RemoteShareList => OcsData::RemoteShares(
            shapes::list_items(data)?
                .into_iter()
                .map(shapes::remote_share)
                .collect::<std::result::Result<_, _>>()?,
        ),
        OcsShape::User => OcsData::User(shapes::user(data)?),
        OcsShape::StringList { key } => {
            let list = match (key, data) {
                (Some(key), Value::Object(map)) if map.contains_key(key) => &map[key],
                (Some(key), other) if !lenient::is_blank(other) => {
                    return Err(format!("expected a list under {:?}", key));
                }
                _ => data,
            };
            OcsData::Strings(shapes::string_list(list)?)
        }
        OcsShape::AppInfo => OcsData::App(shapes::app_info(data)?),
        OcsShape::Config => OcsData::Config(shapes::config(data)?),
        OcsShape::AttributeList => OcsData::Attributes(
            shapes::list_items(data)?
                .into_iter()
                .map(shapes::attribute)
                .collect::<std::result::Result<_, _>>()?,
        ),
    })
}
