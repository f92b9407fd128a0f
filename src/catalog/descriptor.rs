//! # Operation Descriptors
//!
//! Static request shape of one logical operation.

use std::fmt;

use serde_json::Value;

use super::params::Params;
use crate::errors::{ChemSpiderError, ChemSpiderResult};

/// HTTP method used by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter goes in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Substituted into `{name}` in the path template
    Path,
    /// URL query string
    Query,
    /// Field of the JSON request body
    Body,
}

/// How a parameter value is serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// Single value
    Scalar,
    /// Sequence; comma-joined in query strings, a JSON array in bodies
    List,
}

/// One declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub location: ParamLocation,
    pub style: ParamStyle,
    pub required: bool,
}

impl ParamSpec {
    pub const fn path(name: &'static str) -> Self {
        Self {
            name,
            location: ParamLocation::Path,
            style: ParamStyle::Scalar,
            required: true,
        }
    }

    pub const fn query(name: &'static str, style: ParamStyle) -> Self {
        Self {
            name,
            location: ParamLocation::Query,
            style,
            required: false,
        }
    }

    pub const fn body(name: &'static str, style: ParamStyle, required: bool) -> Self {
        Self {
            name,
            location: ParamLocation::Body,
            style,
            required,
        }
    }
}

/// Declared shape of a successful response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// The whole body is one JSON object
    Record,
    /// An array under `key`; a lone object is wrapped into a list
    List { key: &'static str },
    /// Any JSON value under `key`
    Field { key: &'static str },
    /// Base64 string under `key`, returned as raw bytes
    Binary { key: &'static str },
}

impl ResultShape {
    /// Payload key the shape requires, if any
    pub fn key(&self) -> Option<&'static str> {
        match self {
            ResultShape::Record => None,
            ResultShape::List { key } | ResultShape::Field { key } | ResultShape::Binary { key } => {
                Some(key)
            }
        }
    }
}

/// Batch limit for operations taking many identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimit {
    /// List parameter that is split
    pub param: &'static str,
    /// Maximum items per request
    pub max: usize,
}

/// Static metadata describing one operation's request shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Logical name, e.g. `records.details`
    pub name: &'static str,
    pub method: HttpMethod,
    /// Top-level API, e.g. `compounds`
    pub api: &'static str,
    /// API namespace: lookups, records, filter or tools
    pub namespace: &'static str,
    /// Path below the namespace, with `{param}` placeholders
    pub path: &'static str,
    pub params: &'static [ParamSpec],
    pub result: ResultShape,
    pub batch: Option<BatchLimit>,
}

impl OperationDescriptor {
    /// Look up a declared parameter
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Check params against the declared schema
    ///
    /// Missing required parameters and undeclared ones are both rejected.
    pub fn validate(&self, params: &Params) -> ChemSpiderResult<()> {
        for (name, value) in params.iter() {
            let spec = self.param(name).ok_or_else(|| {
                ChemSpiderError::Validation(format!(
                    "Unknown parameter '{}' for operation {}",
                    name, self.name
                ))
            })?;
            if spec.style == ParamStyle::Scalar && value.is_array() {
                return Err(ChemSpiderError::Validation(format!(
                    "Parameter '{}' of {} takes a single value",
                    name, self.name
                )));
            }
        }

        for spec in self.params.iter().filter(|p| p.required) {
            match params.get(spec.name) {
                None | Some(Value::Null) => {
                    return Err(ChemSpiderError::Validation(format!(
                        "Missing required parameter '{}' for operation {}",
                        spec.name, self.name
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Path below the namespace with path parameters substituted
    pub fn render_path(&self, params: &Params) -> ChemSpiderResult<String> {
        let mut path = self.path.to_string();
        for spec in self.params.iter().filter(|p| p.location == ParamLocation::Path) {
            let value = params.get(spec.name).ok_or_else(|| {
                ChemSpiderError::Validation(format!(
                    "Missing path parameter '{}' for operation {}",
                    spec.name, self.name
                ))
            })?;
            let rendered = scalar_to_string(value);
            if rendered.is_empty() || rendered.contains('/') {
                return Err(ChemSpiderError::Validation(format!(
                    "Invalid value for path parameter '{}': {:?}",
                    spec.name, rendered
                )));
            }
            path = path.replace(&format!("{{{}}}", spec.name), &rendered);
        }
        Ok(path)
    }

    /// Full URL for this operation
    pub fn url(&self, api_url: &str, api_version: &str, params: &Params) -> ChemSpiderResult<String> {
        Ok(format!(
            "{}/{}/{}/{}/{}",
            api_url,
            self.api,
            api_version,
            self.namespace,
            self.render_path(params)?
        ))
    }

    /// Query-string pairs; lists are comma-joined and nulls omitted
    pub fn query_pairs(&self, params: &Params) -> Vec<(String, String)> {
        self.params
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
            .filter_map(|spec| {
                let value = params.get(spec.name)?;
                let rendered = match value {
                    Value::Null => return None,
                    Value::Array(items) => items
                        .iter()
                        .map(scalar_to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                    other => scalar_to_string(other),
                };
                Some((spec.name.to_string(), rendered))
            })
            .collect()
    }

    /// JSON body built from body parameters, or `None` if the operation has none
    pub fn body(&self, params: &Params) -> Option<Value> {
        if !self.params.iter().any(|p| p.location == ParamLocation::Body) {
            return None;
        }
        let mut body = serde_json::Map::new();
        for spec in self.params.iter().filter(|p| p.location == ParamLocation::Body) {
            match params.get(spec.name) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    body.insert(spec.name.to_string(), strip_nulls(value.clone()));
                }
            }
        }
        Some(Value::Object(body))
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Drop null members from nested objects so unset options are not sent
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}
