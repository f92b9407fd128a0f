//! # Response Decoder
//!
//! Maps a successful response body to a [`DecodedResponse`] according to the
//! operation's declared [`ResultShape`].
//!
//! - List shapes always yield a sequence; a lone object is wrapped
//! - Binary shapes decode a base64 field to raw bytes
//! - Unknown fields are ignored; the shape key is the only mandatory field

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::catalog::{OperationDescriptor, ResultShape};
use crate::errors::{ChemSpiderError, ChemSpiderResult};

/// Decoded payload, typed by result shape
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    Record(Map<String, Value>),
    List(Vec<Value>),
    Value(Value),
    Binary(Vec<u8>),
}

impl DecodedResponse {
    /// Deserialize a record payload
    pub fn into_record<T: DeserializeOwned>(self) -> ChemSpiderResult<T> {
        match self {
            DecodedResponse::Record(map) => Ok(serde_json::from_value(Value::Object(map))?),
            other => Err(shape_mismatch("record", &other)),
        }
    }

    /// Deserialize every item of a list payload
    pub fn into_list<T: DeserializeOwned>(self) -> ChemSpiderResult<Vec<T>> {
        match self {
            DecodedResponse::List(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(ChemSpiderError::from))
                .collect(),
            other => Err(shape_mismatch("list", &other)),
        }
    }

    /// Deserialize a single field payload
    pub fn into_value<T: DeserializeOwned>(self) -> ChemSpiderResult<T> {
        match self {
            DecodedResponse::Value(value) => Ok(serde_json::from_value(value)?),
            other => Err(shape_mismatch("value", &other)),
        }
    }

    /// Raw bytes of a binary payload
    pub fn into_bytes(self) -> ChemSpiderResult<Vec<u8>> {
        match self {
            DecodedResponse::Binary(bytes) => Ok(bytes),
            other => Err(shape_mismatch("binary", &other)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            DecodedResponse::Record(_) => "record",
            DecodedResponse::List(_) => "list",
            DecodedResponse::Value(_) => "value",
            DecodedResponse::Binary(_) => "binary",
        }
    }
}

fn shape_mismatch(expected: &str, got: &DecodedResponse) -> ChemSpiderError {
    ChemSpiderError::Parse(format!("expected {} payload, got {}", expected, got.kind()))
}

/// Decode a 2xx body for the given operation
pub fn decode(descriptor: &OperationDescriptor, body: &[u8]) -> ChemSpiderResult<DecodedResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return match descriptor.result {
            ResultShape::Record => Err(ChemSpiderError::NotFound(format!(
                "{} returned an empty body",
                descriptor.name
            ))),
            _ => Err(ChemSpiderError::Parse(format!(
                "{} returned an empty body",
                descriptor.name
            ))),
        };
    }

    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        ChemSpiderError::Parse(format!("{} returned invalid JSON: {}", descriptor.name, e))
    })?;

    match descriptor.result {
        ResultShape::Record => match payload {
            Value::Object(map) if map.is_empty() => Err(ChemSpiderError::NotFound(format!(
                "{} returned an empty record",
                descriptor.name
            ))),
            Value::Object(map) => Ok(DecodedResponse::Record(map)),
            Value::Null => Err(ChemSpiderError::NotFound(format!(
                "{} returned no record",
                descriptor.name
            ))),
            other => Err(ChemSpiderError::Parse(format!(
                "{} expected an object, got {}",
                descriptor.name,
                type_name(&other)
            ))),
        },
        ResultShape::List { key } => match take_field(descriptor, payload, key, false)? {
            Value::Array(items) => Ok(DecodedResponse::List(items)),
            Value::Object(map) => Ok(DecodedResponse::List(vec![Value::Object(map)])),
            Value::Null => Ok(DecodedResponse::List(Vec::new())),
            other => Err(ChemSpiderError::Parse(format!(
                "{} expected a list under '{}', got {}",
                descriptor.name,
                key,
                type_name(&other)
            ))),
        },
        ResultShape::Field { key } => {
            Ok(DecodedResponse::Value(take_field(descriptor, payload, key, true)?))
        }
        ResultShape::Binary { key } => match take_field(descriptor, payload, key, true)? {
            Value::String(encoded) => STANDARD
                .decode(encoded.trim())
                .map(DecodedResponse::Binary)
                .map_err(|e| {
                    ChemSpiderError::Parse(format!(
                        "{} returned invalid base64 in '{}': {}",
                        descriptor.name, key, e
                    ))
                }),
            other => Err(ChemSpiderError::Parse(format!(
                "{} expected a base64 string under '{}', got {}",
                descriptor.name,
                key,
                type_name(&other)
            ))),
        },
    }
}

fn take_field(
    descriptor: &OperationDescriptor,
    payload: Value,
    key: &str,
    non_null: bool,
) -> ChemSpiderResult<Value> {
    let mut map = match payload {
        Value::Object(map) => map,
        other => {
            return Err(ChemSpiderError::Parse(format!(
                "{} expected an object, got {}",
                descriptor.name,
                type_name(&other)
            )))
        }
    };
    match map.remove(key) {
        Some(Value::Null) if non_null => Err(ChemSpiderError::Parse(format!(
            "{} returned null '{}'",
            descriptor.name, key
        ))),
        Some(value) => Ok(value),
        None => Err(ChemSpiderError::Parse(format!(
            "{} response missing '{}'",
            descriptor.name, key
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
