//! Field deserializers for OCS payloads. XML delivers every scalar as text
//! while JSON servers mix numbers, booleans and nulls, so each helper accepts
//! both forms and treats an empty element as absent.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// Text of a scalar tree node; `None` for objects, arrays and null
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(Scalar::into_text).filter(|s| !s.is_empty()))
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string(deserializer)?.unwrap_or_default())
}

/// Whole numbers only: `"19"` and `19` are accepted, `"19.5"` is an error
pub(crate) fn optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(i)) => Ok(Some(i)),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected an integer, got {:?}", s))),
        Some(other) => Err(de::Error::custom(format!(
            "expected an integer, got {}",
            other.into_text()
        ))),
    }
}

pub(crate) fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    optional_integer(deserializer)?.ok_or_else(|| de::Error::custom("expected an integer, got nothing"))
}

pub(crate) fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Scalar::Int(i)) => Ok(i as f64),
        Some(Scalar::Float(f)) => Ok(f),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got {:?}", s))),
        Some(Scalar::Bool(b)) => Err(de::Error::custom(format!("expected a number, got {}", b))),
    }
}

fn parse_bool<E: de::Error>(value: Option<Scalar>) -> Result<Option<bool>, E> {
    match value {
        None => Ok(None),
        Some(Scalar::Bool(b)) => Ok(Some(b)),
        Some(Scalar::Int(0)) => Ok(Some(false)),
        Some(Scalar::Int(1)) => Ok(Some(true)),
        Some(Scalar::Text(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            "" => Ok(None),
            _ => Err(E::custom(format!("expected a boolean, got {:?}", s))),
        },
        Some(other) => Err(E::custom(format!("expected a boolean, got {}", other.into_text()))),
    }
}

pub(crate) fn optional_boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    parse_bool(Option::<Scalar>::deserialize(deserializer)?)
}

pub(crate) fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_boolean(deserializer)?.unwrap_or(false))
}

/// A flag whose presence alone means `true`, as in `<default_enable/>`
pub(crate) fn presence_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_bool::<D::Error>(Option::<Scalar>::deserialize(deserializer)?)
        .ok()
        .flatten()
        .unwrap_or(true))
}

/// Scalar children of an object; blank elements give an empty map
pub(crate) fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .filter_map(|(k, v)| scalar_text(&v).map(|s| (k, s)))
            .collect()),
        value if is_blank(&value) => Ok(BTreeMap::new()),
        other => Err(de::Error::custom(format!("expected an object, got {}", other))),
    }
}

/// A list of names: a plain array, an `<element>` list, or (older servers)
/// the child element names themselves, as in `<types><filesystem/></types>`
pub(crate) fn names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn collect<E: de::Error>(value: &Value) -> Result<Vec<String>, E> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| scalar_text(item).ok_or_else(|| E::custom(format!("expected a name, got {}", item))))
                .collect(),
            Value::Object(map) => match map.get("element") {
                Some(inner) => collect(inner),
                None => Ok(map.keys().cloned().collect()),
            },
            value if is_blank(value) => Ok(Vec::new()),
            other => Ok(scalar_text(other).into_iter().collect()),
        }
    }

    collect(&Value::deserialize(deserializer)?)
}

/// A nested record that may also arrive as an empty element
pub(crate) fn object_or_blank<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if is_blank(&value) {
        return Ok(T::default());
    }
    if !value.is_object() {
        return Err(de::Error::custom(format!("expected an object, got {}", value)));
    }
    serde_json::from_value(value).map_err(de::Error::custom)
}
