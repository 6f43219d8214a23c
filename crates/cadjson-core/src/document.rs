use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The strict result document: a JSON object with a `parts` array.
///
/// Only the `color` field of a part is interpreted; every other field is
/// carried through untouched and in its original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ExportDocument(Map<String, Value>);

impl TryFrom<Value> for ExportDocument {
    type Error = ParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<ExportDocument> for Value {
    fn from(doc: ExportDocument) -> Self {
        doc.into_value()
    }
}

impl ExportDocument {
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let Value::Object(map) = value else {
            return Err(ParseError::NotAnObject);
        };
        if !matches!(map.get("parts"), Some(Value::Array(_))) {
            return Err(ParseError::MissingParts);
        }
        Ok(Self(map))
    }

    pub fn parts(&self) -> &[Value] {
        match self.0.get("parts") {
            Some(Value::Array(parts)) => parts,
            _ => &[],
        }
    }

    pub fn parts_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self.0.get_mut("parts") {
            Some(Value::Array(parts)) => Some(parts),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Compact, strict JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}
