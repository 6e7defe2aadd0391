use serde_json::Value;

use crate::errors::{ClientError, Result};

const CONTEXT: &str = "OCS JSON response";

/// Parses a JSON body and returns the contents of its `ocs` object.
/// Bodies that carry `meta` at the top level are accepted as-is.
pub fn to_tree(body: &str) -> Result<Value> {
    let root: Value = serde_json::from_str(body).map_err(|e| ClientError::parse(CONTEXT, e, body))?;

    match root {
        Value::Object(mut map) => match map.remove("ocs") {
            Some(ocs @ Value::Object(_)) => Ok(ocs),
            Some(other) => Err(ClientError::parse(
                CONTEXT,
                format!("expected an object under 'ocs', found {}", kind_of(&other)),
                body,
            )),
            None => Ok(Value::Object(map)),
        },
        other => Err(ClientError::parse(
            CONTEXT,
            format!("expected a JSON object, found {}", kind_of(&other)),
            body,
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
