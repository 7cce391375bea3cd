//! Option values: scalars, lists and records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// Why a JSON/YAML value could not become an [`OptionValue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
  /// `null` only has a meaning at the top of a definition (unset).
  #[error("null is not a value here")]
  Null,

  #[error("reserved key '{key}' is not allowed inside a value")]
  ReservedKey { key: String },
}

/// Leaf value. Numbers stay JSON numbers so serialization is byte-stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
  Bool(bool),
  Number(Number),
  String(String),
}

impl fmt::Display for Scalar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scalar::Bool(b) => write!(f, "{}", b),
      Scalar::Number(n) => write!(f, "{}", n),
      Scalar::String(s) => f.write_str(s),
    }
  }
}

/// Structural shape of a value; merge rules are chosen per shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
  Scalar,
  List,
  Record,
}

impl fmt::Display for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Shape::Scalar => "scalar",
      Shape::List => "list",
      Shape::Record => "record",
    })
  }
}

/// A configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
  Scalar(Scalar),
  List(Vec<OptionValue>),
  Record(BTreeMap<String, OptionValue>),
}

impl OptionValue {
  pub fn shape(&self) -> Shape {
    match self {
      OptionValue::Scalar(_) => Shape::Scalar,
      OptionValue::List(_) => Shape::List,
      OptionValue::Record(_) => Shape::Record,
    }
  }

  /// Finer-grained than [`Shape`]; used in type errors.
  pub fn kind(&self) -> &'static str {
    match self {
      OptionValue::Scalar(Scalar::Bool(_)) => "bool",
      OptionValue::Scalar(Scalar::Number(_)) => "number",
      OptionValue::Scalar(Scalar::String(_)) => "string",
      OptionValue::List(_) => "list",
      OptionValue::Record(_) => "record",
    }
  }

  pub fn empty_record() -> Self {
    OptionValue::Record(BTreeMap::new())
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      OptionValue::Scalar(Scalar::Bool(b)) => Some(*b),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      OptionValue::Scalar(Scalar::String(s)) => Some(s),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[OptionValue]> {
    match self {
      OptionValue::List(items) => Some(items),
      _ => None,
    }
  }

  pub fn as_record(&self) -> Option<&BTreeMap<String, OptionValue>> {
    match self {
      OptionValue::Record(fields) => Some(fields),
      _ => None,
    }
  }

  /// Walk nested records by segment.
  pub fn get(&self, segments: &[String]) -> Option<&OptionValue> {
    segments.iter().try_fold(self, |value, segment| value.as_record()?.get(segment))
  }

  pub fn to_json(&self) -> Value {
    match self {
      OptionValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
      OptionValue::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
      OptionValue::Scalar(Scalar::String(s)) => Value::String(s.clone()),
      OptionValue::List(items) => Value::Array(items.iter().map(OptionValue::to_json).collect()),
      OptionValue::Record(fields) => Value::Object(fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
    }
  }

  /// Plain-text rendering: strings unquoted, everything else as compact JSON.
  pub fn render(&self) -> String {
    match self {
      OptionValue::Scalar(scalar) => scalar.to_string(),
      other => other.to_json().to_string(),
    }
  }
}

impl TryFrom<Value> for OptionValue {
  type Error = ValueError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    Ok(match value {
      Value::Null => return Err(ValueError::Null),
      Value::Bool(b) => OptionValue::Scalar(Scalar::Bool(b)),
      Value::Number(n) => OptionValue::Scalar(Scalar::Number(n)),
      Value::String(s) => OptionValue::Scalar(Scalar::String(s)),
      Value::Array(items) => OptionValue::List(items.into_iter().map(OptionValue::try_from).collect::<Result<_, _>>()?),
      Value::Object(map) => {
        let mut fields = BTreeMap::new();
        for (key, value) in map {
          if key.starts_with("__") {
            return Err(ValueError::ReservedKey { key });
          }
          fields.insert(key, OptionValue::try_from(value)?);
        }
        OptionValue::Record(fields)
      }
    })
  }
}

impl<'de> Deserialize<'de> for OptionValue {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    OptionValue::try_from(value).map_err(serde::de::Error::custom)
  }
}

impl From<bool> for OptionValue {
  fn from(value: bool) -> Self {
    OptionValue::Scalar(Scalar::Bool(value))
  }
}

impl From<&str> for OptionValue {
  fn from(value: &str) -> Self {
    OptionValue::Scalar(Scalar::String(value.to_string()))
  }
}

impl From<String> for OptionValue {
  fn from(value: String) -> Self {
    OptionValue::Scalar(Scalar::String(value))
  }
}

impl From<i64> for OptionValue {
  fn from(value: i64) -> Self {
    OptionValue::Scalar(Scalar::Number(value.into()))
  }
}

impl From<u64> for OptionValue {
  fn from(value: u64) -> Self {
    OptionValue::Scalar(Scalar::Number(value.into()))
  }
}

impl From<i32> for OptionValue {
  fn from(value: i32) -> Self {
    OptionValue::Scalar(Scalar::Number(value.into()))
  }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
  fn from(items: Vec<T>) -> Self {
    OptionValue::List(items.into_iter().map(Into::into).collect())
  }
}

impl From<BTreeMap<String, OptionValue>> for OptionValue {
  fn from(fields: BTreeMap<String, OptionValue>) -> Self {
    OptionValue::Record(fields)
  }
}
