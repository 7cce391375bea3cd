//! Serialized fragment documents (JSON or YAML).
//!
//! ```json
//! {
//!   "name": "python",
//!   "enables": ["languages.python"],
//!   "platforms": ["x86_64-linux"],
//!   "config": {
//!     "packages": ["numpy", "pillow"],
//!     "languages.python.version": { "__priority": "force", "__value": "3.12.8" },
//!     "languages.python.venv": null
//!   }
//! }
//! ```
//!
//! `null` unsets a path. A `{ "__priority", "__value" }` object sets a
//! priority for everything beneath it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Assignment, Fragment, FragmentError};
use crate::option::{OptionPath, OptionValue, Priority, ValidationError};

pub const PRIORITY_KEY: &str = "__priority";
pub const VALUE_KEY: &str = "__value";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentDoc {
  pub name: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub enables: Vec<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub platforms: Option<Vec<String>>,

  /// Other fragment files, resolved by the project loader.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub imports: Vec<String>,

  #[serde(default)]
  pub config: Map<String, Value>,
}

impl FragmentDoc {
  pub fn into_fragment(self) -> Result<Fragment, FragmentError> {
    let mut parser = DocParser {
      fragment: &self.name,
      out: Vec::new(),
    };
    for (key, raw) in &self.config {
      let path = OptionPath::parse(key).map_err(|source| parser.path_error(source))?;
      parser.emit(path, raw, Priority::DEFAULT)?;
    }
    let assignments = parser.out;

    let mut builder = Fragment::builder(self.name.clone());
    if let Some(description) = self.description {
      builder = builder.description(description);
    }
    for capability in self.enables {
      builder = builder.enables(capability);
    }
    if let Some(platforms) = self.platforms {
      builder = builder.only_on(platforms);
    }
    assignments
      .into_iter()
      .fold(builder, |builder, assignment| builder.assign(assignment))
      .build()
  }
}

struct DocParser<'a> {
  fragment: &'a str,
  out: Vec<Assignment>,
}

impl DocParser<'_> {
  fn path_error(&self, source: ValidationError) -> FragmentError {
    FragmentError::Path {
      fragment: self.fragment.to_string(),
      source,
    }
  }

  fn emit(&mut self, path: OptionPath, raw: &Value, priority: Priority) -> Result<(), FragmentError> {
    match raw {
      Value::Null => {
        self.out.push(Assignment::unset(path).with_priority(priority));
      }
      Value::Object(map) if map.contains_key(PRIORITY_KEY) => {
        let (priority, inner) = self.unwrap_priority(&path, map)?;
        self.emit(path, inner, priority)?;
      }
      Value::Object(map) => {
        // Plain fields go into one record assignment; fields that unset or
        // re-prioritise follow it as their own assignments.
        let mut record = Map::new();
        let mut nested = Vec::new();
        for (key, value) in map {
          let child = path.child(key).map_err(|source| self.path_error(source))?;
          if needs_own_assignment(value) {
            nested.push((child, value));
          } else {
            record.insert(key.clone(), value.clone());
          }
        }
        // A record made only of unsets or wrappers creates nothing by itself.
        if !record.is_empty() || nested.is_empty() {
          let value = self.plain_value(&path, Value::Object(record))?;
          self.out.push(Assignment::set(path, value).with_priority(priority));
        }
        for (child, value) in nested {
          self.emit(child, value, priority)?;
        }
      }
      other => {
        let value = self.plain_value(&path, other.clone())?;
        self.out.push(Assignment::set(path, value).with_priority(priority));
      }
    }
    Ok(())
  }

  fn unwrap_priority<'v>(
    &self,
    path: &OptionPath,
    map: &'v Map<String, Value>,
  ) -> Result<(Priority, &'v Value), FragmentError> {
    let wrapper_error = |message: String| FragmentError::Wrapper {
      fragment: self.fragment.to_string(),
      path: path.to_string(),
      message,
    };

    if let Some(extra) = map.keys().find(|key| *key != PRIORITY_KEY && *key != VALUE_KEY) {
      return Err(wrapper_error(format!("unexpected key '{}'", extra)));
    }
    let inner = map
      .get(VALUE_KEY)
      .ok_or_else(|| wrapper_error(format!("missing '{}'", VALUE_KEY)))?;
    let priority = match &map[PRIORITY_KEY] {
      Value::Number(n) => n
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .map(Priority::order)
        .ok_or_else(|| wrapper_error(format!("priority {} is not a non-negative integer", n)))?,
      Value::String(name) => name.parse::<Priority>().map_err(|source| FragmentError::Priority {
        fragment: self.fragment.to_string(),
        path: path.to_string(),
        source,
      })?,
      other => return Err(wrapper_error(format!("priority must be a number or name, got {}", other))),
    };
    Ok((priority, inner))
  }

  fn plain_value(&self, path: &OptionPath, raw: Value) -> Result<OptionValue, FragmentError> {
    OptionValue::try_from(raw).map_err(|source| FragmentError::Value {
      fragment: self.fragment.to_string(),
      path: path.to_string(),
      source,
    })
  }
}

fn needs_own_assignment(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Object(map) => map.contains_key(PRIORITY_KEY) || map.values().any(needs_own_assignment),
    _ => false,
  }
}
