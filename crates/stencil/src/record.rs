//! Input records

use std::collections::HashMap;

use serde_json::Value;
use stencil_core::CellValue;

use crate::error::{ExportError, Result};

/// A scalar field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Cell content for this value; null becomes an empty string
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            FieldValue::Null => CellValue::string(""),
            FieldValue::Bool(b) => CellValue::Boolean(*b),
            FieldValue::Number(n) => CellValue::Number(*n),
            FieldValue::Text(s) => CellValue::String(s.clone()),
        }
    }

    fn from_json(field: &str, value: Value) -> Result<Self> {
        Ok(match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => FieldValue::Number(f),
                None => {
                    return Err(ExportError::invalid_input(format!(
                        "field '{}': number {} is not representable",
                        field, n
                    )))
                }
            },
            Value::String(s) => FieldValue::Text(s),
            Value::Array(_) | Value::Object(_) => {
                return Err(ExportError::invalid_input(format!(
                    "field '{}' must be a scalar (null, boolean, number or string)",
                    field
                )))
            }
        })
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n.into())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// One caller-supplied data row, keyed by header label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputRecord {
    fields: HashMap<String, FieldValue>,
}

impl InputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Value written for `header`: the field as-is, or an empty string when
    /// the field is absent or null
    pub fn cell_value(&self, header: &str) -> CellValue {
        self.fields
            .get(header)
            .map_or_else(|| CellValue::string(""), FieldValue::to_cell_value)
    }

    /// Build from a JSON object
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(ExportError::invalid_input(format!(
                "record must be an object, got {}",
                json_type_name(&value)
            )));
        };

        let fields = map
            .into_iter()
            .map(|(k, v)| FieldValue::from_json(&k, v).map(|fv| (k, fv)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { fields })
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for InputRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse a request body holding a non-empty JSON array of objects
pub fn parse_records(body: &[u8]) -> Result<Vec<InputRecord>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ExportError::invalid_input("request body is empty"));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ExportError::invalid_input(format!("malformed JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(ExportError::invalid_input(format!(
            "payload must be an array of records, got {}",
            json_type_name(&value)
        )));
    };
    if items.is_empty() {
        return Err(ExportError::invalid_input("payload contains no records"));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            InputRecord::from_json(item).map_err(|e| match e {
                ExportError::InvalidInput(msg) => {
                    ExportError::InvalidInput(format!("record {}: {}", i, msg))
                }
                other => other,
            })
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
