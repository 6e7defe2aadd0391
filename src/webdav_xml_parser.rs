use chrono::{DateTime, Utc};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use std::str;
use tracing::{debug, warn};

use crate::errors::{ClientError, Result};
use crate::models::{ResourceInfo, DIRECTORY_CONTENT_TYPE};

const CONTEXT: &str = "PROPFIND response";

/// Properties of a single `<propstat>` block
#[derive(Debug, Default, Clone)]
struct PropBag {
    displayname: Option<String>,
    content_length: Option<i64>,
    creation_date: Option<String>,
    last_modified: Option<String>,
    content_type: Option<String>,
    etag: Option<String>,
    quota_used: Option<i64>,
    quota_available: Option<i64>,
    is_collection: bool,
    is_hidden: bool,
}

impl PropBag {
    fn merge(&mut self, other: PropBag) {
        self.displayname = other.displayname.or(self.displayname.take());
        self.content_length = other.content_length.or(self.content_length);
        self.creation_date = other.creation_date.or(self.creation_date.take());
        self.last_modified = other.last_modified.or(self.last_modified.take());
        self.content_type = other.content_type.or(self.content_type.take());
        self.etag = other.etag.or(self.etag.take());
        self.quota_used = other.quota_used.or(self.quota_used);
        self.quota_available = other.quota_available.or(self.quota_available);
        self.is_collection |= other.is_collection;
        self.is_hidden |= other.is_hidden;
    }
}

#[derive(Debug, Default)]
struct PropFindResponse {
    href: String,
    props: PropBag,
    /// Set by a non-2xx `<status>` directly under `<response>`
    failed: bool,
}

impl PropFindResponse {
    fn is_visible(&self) -> bool {
        if self.href.is_empty() {
            warn!("Skipping PROPFIND entry without href");
            return false;
        }
        if self.failed {
            debug!("Skipping failed entry {}", self.href);
            return false;
        }
        if self.props.is_hidden {
            debug!("Skipping hidden resource {}", self.href);
            return false;
        }
        true
    }
}

/// Parses a multistatus body into one `ResourceInfo` per visible `<response>`.
///
/// `dav_root_path` is the absolute path of the DAV root on the server, e.g.
/// `/remote.php/webdav`; it is stripped from every href.
pub fn parse_propfind_response(xml_text: &str, dav_root_path: &str) -> Result<Vec<ResourceInfo>> {
    Ok(parse_entries(xml_text)?
        .into_iter()
        .filter(PropFindResponse::is_visible)
        .map(|resp| build_resource(resp, dav_root_path))
        .collect())
}

/// Parses a `Depth: 1` listing, dropping the first entry which describes the
/// queried collection itself.
pub fn parse_directory_listing(xml_text: &str, dav_root_path: &str) -> Result<Vec<ResourceInfo>> {
    Ok(parse_entries(xml_text)?
        .into_iter()
        .skip(1)
        .filter(PropFindResponse::is_visible)
        .map(|resp| build_resource(resp, dav_root_path))
        .collect())
}

/// The first entry of a PROPFIND, which describes the queried resource itself.
/// Returned even when hidden since it was asked for by name.
pub fn parse_self_descriptor(xml_text: &str, dav_root_path: &str) -> Result<Option<ResourceInfo>> {
    Ok(parse_entries(xml_text)?
        .into_iter()
        .next()
        .filter(|resp| !resp.href.is_empty() && !resp.failed)
        .map(|resp| build_resource(resp, dav_root_path)))
}

/// Every `<response>` in document order, hidden and failed ones included
fn parse_entries(xml_text: &str) -> Result<Vec<PropFindResponse>> {
    let mut reader = Reader::from_str(xml_text);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current_response: Option<PropFindResponse> = None;
    let mut current_props: Option<PropBag> = None;
    let mut propstat_ok = true;
    let mut current_element = String::new();
    let mut in_resourcetype = false;
    let mut seen_multistatus = false;
    let mut depth: usize = 0;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = get_local_name(&e)?;

                match name.as_str() {
                    "multistatus" => seen_multistatus = true,
                    "response" => current_response = Some(PropFindResponse::default()),
                    "propstat" => {
                        current_props = Some(PropBag::default());
                        propstat_ok = true;
                    }
                    "resourcetype" => in_resourcetype = true,
                    "collection" if in_resourcetype => {
                        if let Some(ref mut props) = current_props {
                            props.is_collection = true;
                        }
                    }
                    _ => current_element = name,
                }
            }
            Ok(Event::Empty(e)) => {
                let name = get_local_name(&e)?;
                if name == "collection" && in_resourcetype {
                    if let Some(ref mut props) = current_props {
                        props.is_collection = true;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ClientError::parse(CONTEXT, err, xml_text))?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }

                if current_element == "href" && current_props.is_none() {
                    if let Some(ref mut resp) = current_response {
                        resp.href = text.to_string();
                    }
                    continue;
                }

                if current_element == "status" {
                    if current_props.is_some() {
                        propstat_ok = is_success_status(text);
                    } else if let Some(ref mut resp) = current_response {
                        resp.failed = !is_success_status(text);
                    }
                    continue;
                }

                if let Some(ref mut props) = current_props {
                    match current_element.as_str() {
                        "displayname" => props.displayname = Some(text.to_string()),
                        "getcontentlength" => props.content_length = text.parse().ok(),
                        "creationdate" => props.creation_date = Some(text.to_string()),
                        "getlastmodified" => props.last_modified = Some(text.to_string()),
                        "getcontenttype" => props.content_type = Some(text.to_string()),
                        "getetag" => props.etag = Some(text.to_string()),
                        "quota-used-bytes" => props.quota_used = text.parse().ok(),
                        "quota-available-bytes" => props.quota_available = text.parse().ok(),
                        "ishidden" => props.is_hidden = text == "1" || text.eq_ignore_ascii_case("true"),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                let name = get_local_name_from_end(&e)?;

                match name.as_str() {
                    "resourcetype" => in_resourcetype = false,
                    "propstat" => {
                        if let (Some(props), Some(resp)) = (current_props.take(), current_response.as_mut()) {
                            if propstat_ok {
                                resp.props.merge(props);
                            }
                        }
                    }
                    "response" => {
                        if let Some(resp) = current_response.take() {
                            entries.push(resp);
                        }
                    }
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ClientError::parse(CONTEXT, e, xml_text)),
            _ => {}
        }

        buf.clear();
    }

    if depth != 0 {
        return Err(ClientError::parse(CONTEXT, "unexpected end of document", xml_text));
    }
    if !seen_multistatus {
        return Err(ClientError::parse(CONTEXT, "missing multistatus element", xml_text));
    }

    Ok(entries)
}

fn build_resource(resp: PropFindResponse, dav_root_path: &str) -> ResourceInfo {
    let relative = relative_dav_path(&resp.href, dav_root_path);
    let props = resp.props;
    let trimmed = relative.trim_end_matches('/');

    let last_segment = trimmed.rsplit('/').next().unwrap_or("").to_string();
    let name = match props.displayname {
        Some(ref display) if !display.is_empty() => display.clone(),
        _ if trimmed.is_empty() => "/".to_string(),
        _ => last_segment,
    };

    let path = if props.is_collection {
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        match trimmed.rsplit_once('/') {
            Some((parent, _)) if !parent.is_empty() => parent.to_string(),
            _ => "/".to_string(),
        }
    };

    let content_type = if props.is_collection {
        DIRECTORY_CONTENT_TYPE.to_string()
    } else {
        props
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string())
    };

    ResourceInfo {
        name,
        path,
        content_type,
        size: props.content_length.unwrap_or(0),
        etag: props.etag,
        created: props.creation_date.as_deref().and_then(parse_http_date),
        last_modified: props.last_modified.as_deref().and_then(parse_http_date),
        quota_used: props.quota_used,
        quota_available: props.quota_available,
    }
}

/// Decoded href path with the DAV root removed; always starts with `/`
fn relative_dav_path(href: &str, dav_root_path: &str) -> String {
    let raw_path = if href.starts_with("http://") || href.starts_with("https://") {
        url::Url::parse(href)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| href.to_string())
    } else {
        href.to_string()
    };

    let decoded = urlencoding::decode(&raw_path)
        .map(|cow| cow.into_owned())
        .unwrap_or(raw_path);

    let root = format!("/{}", dav_root_path.trim_matches('/'));
    let stripped = if root == "/" {
        decoded.as_str()
    } else {
        decoded.strip_prefix(&root).unwrap_or(&decoded)
    };

    if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{}", stripped)
    }
}

fn is_success_status(status_line: &str) -> bool {
    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .map(|code| (200..300).contains(&code))
        .unwrap_or(false)
}

fn get_local_name(e: &BytesStart) -> Result<String> {
    let qname = e.name();
    let local = qname.local_name();
    let name = str::from_utf8(local.as_ref())
        .map_err(|err| ClientError::parse(CONTEXT, format!("Invalid UTF-8 in element name: {}", err), ""))?;
    Ok(name.to_string())
}

fn get_local_name_from_end(e: &BytesEnd) -> Result<String> {
    let qname = e.name();
    let local = qname.local_name();
    let name = str::from_utf8(local.as_ref())
        .map_err(|err| ClientError::parse(CONTEXT, format!("Invalid UTF-8 in element name: {}", err), ""))?;
    Ok(name.to_string())
}

/// Locale-independent parsing of the date formats DAV servers emit
pub fn parse_http_date(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            DateTime::parse_from_rfc3339(date_str)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(date_str, "%a, %d %b %Y %H:%M:%S GMT")
                .ok()
                .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
        })
}
