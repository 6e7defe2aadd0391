use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub licence: String,
    pub author: String,
    pub require_min: String,
    pub shipped: bool,
    pub standalone: bool,
    pub default_enable: bool,
    pub types: Vec<String>,
    pub remote: BTreeMap<String, String>,
    pub documentation: BTreeMap<String, String>,
    pub info: BTreeMap<String, String>,
    pub public: BTreeMap<String, String>,
}

/// Server capabilities returned by the `config` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub contact: String,
    pub host: String,
    pub ssl: String,
    pub version: String,
    pub website: String,
}

/// One `privatedata` key/value record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppAttribute {
    pub app: String,
    pub key: String,
    pub value: String,
}
