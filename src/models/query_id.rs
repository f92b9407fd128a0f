//! Filter query identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::ChemSpiderError;

/// Identifier returned by a `filter/*` submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(Uuid);

impl QueryId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for QueryId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for QueryId {
    type Err = ChemSpiderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| ChemSpiderError::Validation(format!("Invalid query id '{}': {}", s, e)))
    }
}

impl From<QueryId> for Value {
    fn from(id: QueryId) -> Value {
        Value::String(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let raw = "a9ab8d6e-1c6a-4d4b-9c3a-0e2f6e7b3a10";
        let id: QueryId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert_eq!(Value::from(id), Value::String(raw.into()));
    }

    #[test]
    fn test_invalid_is_validation_error() {
        let err = "not-a-query".parse::<QueryId>().unwrap_err();
        assert!(matches!(err, ChemSpiderError::Validation(_)));
    }
}
