//! Record and value types
//!
//! A record is an ordered mapping from field to value. Stored records carry
//! all nine fields; projected records carry a subset. Records serialize as
//! JSON objects keyed by the stored record keys, in canonical field order.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::field::{Field, FieldKind};

/// A single cell value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Number(_) => FieldKind::Numeric,
            Value::Text(_) => FieldKind::Textual,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

/// Largest magnitude at which every integer is exactly representable as f64
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Integral numbers serialize as JSON integers (`120`, not `120.0`).
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_EXACT_INT => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// One data row
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>")]
pub struct Record {
    values: BTreeMap<Field, Value>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// Inserts or replaces the value of a field
    pub fn insert(&mut self, field: Field, value: impl Into<Value>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// Fields present, in canonical order
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.values.keys().copied()
    }

    /// (field, value) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks the record against the fixed course schema: every field
    /// present, each value of its field's kind.
    pub fn validate_schema(&self) -> Result<(), String> {
        for field in Field::ALL {
            match self.values.get(&field) {
                None => return Err(format!("missing field '{}'", field.key())),
                Some(value) if value.kind() != field.kind() => {
                    return Err(format!(
                        "field '{}': expected {}, got {}",
                        field.key(),
                        field.kind().type_name(),
                        value.kind().type_name()
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

impl TryFrom<BTreeMap<String, Value>> for Record {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let field =
                Field::from_key(&key).ok_or_else(|| format!("unknown record key '{}'", key))?;
            values.insert(field, value);
        }
        Ok(Self { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Record {
        Record::new()
            .with(Field::Title, "intro comp sci")
            .with(Field::Uuid, "1234")
            .with(Field::Instructor, "smith, jane")
            .with(Field::Audit, 1.0)
            .with(Field::Id, "110")
            .with(Field::Pass, 120.0)
            .with(Field::Fail, 8.0)
            .with(Field::Average, 78.5)
            .with(Field::Department, "cpsc")
    }

    #[test]
    fn test_serializes_in_canonical_order() {
        let record = Record::new()
            .with(Field::Uuid, "u1")
            .with(Field::Average, 90.0)
            .with(Field::Department, "cpsc");

        let out = serde_json::to_string(&record).unwrap();
        assert_eq!(
            out,
            r#"{"courses_dept":"cpsc","courses_avg":90,"courses_uuid":"u1"}"#
        );
    }

    #[test]
    fn test_integral_numbers_serialize_as_integers() {
        assert_eq!(serde_json::to_value(Value::Number(120.0)).unwrap(), json!(120));
        assert_eq!(serde_json::to_string(&Value::Number(-3.0)).unwrap(), "-3");
        assert_eq!(serde_json::to_string(&Value::Number(78.5)).unwrap(), "78.5");
        assert_eq!(serde_json::to_string(&Value::Number(1e300)).unwrap(), "1e300");
        assert_eq!(serde_json::to_string(&Value::from("120")).unwrap(), r#""120""#);
    }

    #[test]
    fn test_deserialize_maps_keys() {
        let record: Record =
            serde_json::from_value(json!({"courses_avg": 72, "courses_title": "algs"})).unwrap();
        assert_eq!(record.get(Field::Average), Some(&Value::Number(72.0)));
        assert_eq!(record.get(Field::Title), Some(&Value::Text("algs".into())));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_deserialize_rejects_unknown_key() {
        let result: Result<Record, _> = serde_json::from_value(json!({"courses_year": 2015}));
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_validation() {
        assert!(full_record().validate_schema().is_ok());

        let missing = Record::new().with(Field::Title, "x");
        assert!(missing.validate_schema().is_err());

        let mut wrong_kind = full_record();
        wrong_kind.insert(Field::Average, "high");
        let err = wrong_kind.validate_schema().unwrap_err();
        assert!(err.contains("courses_avg"));
    }

    #[test]
    fn test_round_trip_full_record() {
        let record = full_record();
        let text = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }
}
