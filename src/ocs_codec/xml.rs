use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};
use std::str;

use crate::errors::{ClientError, Result};

const CONTEXT: &str = "OCS XML response";

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            Value::String(self.text.trim().to_string())
        } else {
            Value::Object(self.children)
        };
        (self.name, value)
    }
}

/// Converts an OCS XML document into the same tree shape the JSON encoding
/// produces: repeated siblings become arrays, leaves become strings and
/// empty elements become `""`. Returns the root element's value.
pub fn to_tree(xml_text: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml_text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(Frame::new(get_local_name(&e)?));
            }
            Ok(Event::Empty(e)) => {
                let name = get_local_name(&e)?;
                match stack.last_mut() {
                    Some(parent) => attach(&mut parent.children, name, Value::String(String::new())),
                    None => root = Some(Value::Object(Map::new())),
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ClientError::parse(CONTEXT, err, xml_text))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                let text = str::from_utf8(&raw).map_err(|err| ClientError::parse(CONTEXT, err, xml_text))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text);
                }
            }
            Ok(Event::End(e)) => {
                let closing = get_local_name_from_end(&e)?;
                let frame = stack
                    .pop()
                    .ok_or_else(|| ClientError::parse(CONTEXT, format!("unexpected closing tag {}", closing), xml_text))?;
                let (name, value) = frame.into_value();
                match stack.last_mut() {
                    Some(parent) => attach(&mut parent.children, name, value),
                    None => root = Some(value),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ClientError::parse(CONTEXT, e, xml_text)),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ClientError::parse(CONTEXT, "unexpected end of document", xml_text));
    }

    root.ok_or_else(|| ClientError::parse(CONTEXT, "document has no root element", xml_text))
}

fn attach(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.remove(&name) {
        None => {
            children.insert(name, value);
        }
        Some(Value::Array(mut items)) => {
            items.push(value);
            children.insert(name, Value::Array(items));
        }
        Some(previous) => {
            children.insert(name, Value::Array(vec![previous, value]));
        }
    }
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
