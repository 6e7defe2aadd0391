use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type reported for collections instead of a MIME type
pub const DIRECTORY_CONTENT_TYPE: &str = "dav/directory";

/// A file or directory as described by one PROPFIND `<response>` entry.
///
/// `path` is the containing directory for files and the directory itself for
/// collections, relative to the DAV root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceInfo {
    pub name: String,
    pub path: String,
    pub content_type: String,
    pub size: i64,
    pub etag: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub quota_used: Option<i64>,
    pub quota_available: Option<i64>,
}

impl ResourceInfo {
    pub fn is_directory(&self) -> bool {
        self.content_type == DIRECTORY_CONTENT_TYPE
    }

    /// Path of the resource itself, relative to the DAV root
    pub fn full_path(&self) -> String {
        if self.is_directory() || self.name == "/" {
            return self.path.clone();
        }
        if self.path.ends_with('/') {
            format!("{}{}", self.path, self.name)
        } else {
            format!("{}/{}", self.path, self.name)
        }
    }
}
