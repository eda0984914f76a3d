use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single record of some entity type.
///
/// Fields are held as raw JSON keyed by field name. The API layer builds
/// these from request bodies, the engine checks them against the type's
/// schema, and only then are they handed to storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub data: Map<String, Value>,
}

impl Entity {
    /// An entity with no fields set.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            data: Map::new(),
        }
    }

    /// Wraps a JSON object. Returns `None` for any other JSON value.
    pub fn from_value(entity_type: impl Into<String>, value: Value) -> Option<Self> {
        match value {
            Value::Object(data) => Some(Self {
                entity_type: entity_type.into(),
                data,
            }),
            _ => None,
        }
    }

    /// Builder-style setter, handy for tests and fixtures.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Raw value of a field, `None` if the key is missing.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Extract a string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(|v| v.as_str())
    }

    /// Extract a boolean field.
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.data.get(field).and_then(|v| v.as_bool())
    }

    /// Extract a numeric field.
    pub fn get_number(&self, field: &str) -> Option<f64> {
        self.data.get(field).and_then(|v| v.as_f64())
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.data.insert(field.to_string(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.data.remove(field)
    }

    /// True when the key is missing or explicitly `null`.
    pub fn is_absent(&self, field: &str) -> bool {
        is_absent(self.data.get(field))
    }

    /// True when the field is absent or holds its type's zero value.
    pub fn is_blank(&self, field: &str) -> bool {
        self.data.get(field).is_none_or(is_blank)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

/// Missing or `null`.
pub fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// `null` or the zero value of the JSON type: `""`, `0`, `false`, `[]`, `{}`.
///
/// Defaults, required checks and "was this supplied" checks on create all
/// use this notion of emptiness.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
