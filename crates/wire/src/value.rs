// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload values and the extended-JSON codec.
//!
//! The value domain is plain JSON plus the extended scalars carried as
//! single-key objects on the wire:
//!
//! ```text
//! {"$date": <ms>}                      timestamp, ms since epoch
//! {"$binary": <b64>, "$type": <hex>}   opaque binary with subtype byte
//! {"$oid": <hex>}                      opaque object id
//! {"$numberLong": <string>}            large integer
//! {"$regex": <pat>, "$options": <fl>}  regex, flags subset of "ilmsux"
//! {"$minKey": 1} / {"$maxKey": 1}      ordering sentinels
//! {"$timestamp": {"t": s, "i": n}}     timestamp pair
//! {"$undefined": true}                 decoded as null
//! ```
//!
//! Decoding produces a fully-populated [`Value`] or fails with
//! [`CodecError::MalformedPayload`]; it never partially populates.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::json;
use thiserror::Error;

/// Regex flag letters the codec retains; anything else is dropped on decode.
const REGEX_OPTIONS: &str = "ilmsux";

/// Free-form string-keyed mapping, the shape of job configs and status maps.
pub type StatusMap = BTreeMap<String, Value>;

/// Errors from the payload codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

fn malformed(msg: impl Into<String>) -> CodecError {
    CodecError::MalformedPayload(msg.into())
}

/// An in-memory payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Opaque binary with a subtype byte.
    Bytes { data: Vec<u8>, subtype: u8 },
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    /// Opaque hex object id.
    ObjectId(String),
    /// Integer that must survive consumers which parse numbers as doubles.
    Long(i64),
    Regex { pattern: String, options: String },
    MinKey,
    MaxKey,
    /// Seconds-and-counter timestamp pair.
    Timestamp { time: u32, increment: u32 },
    Array(Vec<Value>),
    Map(StatusMap),
}

/// Encode a value to JSON bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, CodecError> {
    let json = value.to_json()?;
    serde_json::to_vec(&json).map_err(|e| malformed(e.to_string()))
}

/// Decode JSON bytes to a value. Fails with [`CodecError::MalformedPayload`]
/// on invalid input.
pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;
    Value::from_json(json)
}

impl Value {
    /// An empty mapping, the default shape for configs and status maps.
    pub fn empty_map() -> Self {
        Value::Map(StatusMap::new())
    }

    /// Normalized regex constructor: options are filtered to the supported
    /// flag letters so encode/decode round trips are byte-identical.
    pub fn regex(pattern: impl Into<String>, options: &str) -> Self {
        Value::Regex { pattern: pattern.into(), options: filter_regex_options(options) }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) | Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) | Value::Long(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&StatusMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Project to plain JSON, extended scalars in their single-key form.
    pub fn to_json(&self) -> Result<serde_json::Value, CodecError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => json!(b),
            Value::Int(n) => json!(n),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(malformed("non-finite float has no JSON form"));
                }
                json!(f)
            }
            Value::String(s) => json!(s),
            Value::Bytes { data, subtype } => {
                json!({"$binary": BASE64.encode(data), "$type": format!("{subtype:02x}")})
            }
            Value::DateTime(ms) => json!({"$date": ms}),
            Value::ObjectId(hex) => json!({"$oid": hex}),
            Value::Long(n) => json!({"$numberLong": n.to_string()}),
            Value::Regex { pattern, options } => {
                json!({"$regex": pattern, "$options": options})
            }
            Value::MinKey => json!({"$minKey": 1}),
            Value::MaxKey => json!({"$maxKey": 1}),
            Value::Timestamp { time, increment } => {
                json!({"$timestamp": {"t": time, "i": increment}})
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.to_json()?);
                }
                serde_json::Value::Array(out)
            }
            Value::Map(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), value.to_json()?);
                }
                serde_json::Value::Object(out)
            }
        })
    }

    /// Build a value from parsed JSON, recognizing the extended forms.
    pub fn from_json(json: serde_json::Value) -> Result<Self, CodecError> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    return Err(malformed(format!("unrepresentable number: {n}")));
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Value::from_json(item)?);
                }
                Value::Array(out)
            }
            serde_json::Value::Object(map) => decode_object(map)?,
        })
    }
}

fn decode_object(map: serde_json::Map<String, serde_json::Value>) -> Result<Value, CodecError> {
    if let Some(oid) = map.get("$oid") {
        let hex = oid.as_str().ok_or_else(|| malformed("$oid must be a string"))?;
        return Ok(Value::ObjectId(hex.to_string()));
    }
    if let Some(date) = map.get("$date") {
        // Some producers emit fractional milliseconds; truncate like the
        // float division the original decoder performed.
        let ms = date
            .as_i64()
            .or_else(|| date.as_f64().map(|f| f as i64))
            .ok_or_else(|| malformed("$date must be a number"))?;
        return Ok(Value::DateTime(ms));
    }
    if let Some(pattern) = map.get("$regex") {
        let pattern = pattern.as_str().ok_or_else(|| malformed("$regex must be a string"))?;
        let options = match map.get("$options") {
            Some(opts) => {
                let opts = opts.as_str().ok_or_else(|| malformed("$options must be a string"))?;
                filter_regex_options(opts)
            }
            None => String::new(),
        };
        return Ok(Value::Regex { pattern: pattern.to_string(), options });
    }
    if map.contains_key("$minKey") {
        return Ok(Value::MinKey);
    }
    if map.contains_key("$maxKey") {
        return Ok(Value::MaxKey);
    }
    if let Some(data) = map.get("$binary") {
        let encoded = data.as_str().ok_or_else(|| malformed("$binary must be a string"))?;
        let data = BASE64
            .decode(encoded)
            .map_err(|e| malformed(format!("$binary is not valid base64: {e}")))?;
        let subtype = match map.get("$type") {
            Some(serde_json::Value::String(hex)) => u8::from_str_radix(hex, 16)
                .map_err(|_| malformed(format!("$type is not a hex byte: {hex:?}")))?,
            Some(serde_json::Value::Number(n)) => {
                u8::try_from(n.as_u64().unwrap_or(u64::MAX))
                    .map_err(|_| malformed(format!("$type out of range: {n}")))?
            }
            Some(_) => return Err(malformed("$type must be a hex string or number")),
            None => 0,
        };
        return Ok(Value::Bytes { data, subtype });
    }
    if map.contains_key("$undefined") {
        return Ok(Value::Null);
    }
    if let Some(long) = map.get("$numberLong") {
        let n = match long {
            serde_json::Value::String(s) => s
                .parse::<i64>()
                .map_err(|_| malformed(format!("$numberLong is not an integer: {s:?}")))?,
            serde_json::Value::Number(n) => {
                n.as_i64().ok_or_else(|| malformed(format!("$numberLong out of range: {n}")))?
            }
            _ => return Err(malformed("$numberLong must be a string or number")),
        };
        return Ok(Value::Long(n));
    }
    if let Some(ts) = map.get("$timestamp") {
        let time = ts
            .get("t")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| malformed("$timestamp.t must be an unsigned number"))?;
        let increment = ts
            .get("i")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| malformed("$timestamp.i must be an unsigned number"))?;
        let time = u32::try_from(time).map_err(|_| malformed("$timestamp.t out of range"))?;
        let increment =
            u32::try_from(increment).map_err(|_| malformed("$timestamp.i out of range"))?;
        return Ok(Value::Timestamp { time, increment });
    }

    let mut out = StatusMap::new();
    for (key, value) in map {
        out.insert(key, Value::from_json(value)?);
    }
    Ok(Value::Map(out))
}

fn filter_regex_options(options: &str) -> String {
    options.chars().filter(|c| REGEX_OPTIONS.contains(*c)).collect()
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_json().map_err(serde::ser::Error::custom)?.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(json).map_err(serde::de::Error::custom)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<StatusMap> for Value {
    fn from(map: StatusMap) -> Self {
        Value::Map(map)
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
