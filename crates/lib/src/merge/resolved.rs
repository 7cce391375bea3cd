use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::option::{OptionPath, OptionValue};
use crate::util::hash::Hashable;

/// The fully merged option set for one platform.
///
/// Values live in a sorted map, so serialization is canonical: equal
/// configurations always produce byte-identical JSON and the same hash.
/// Provenance (which fragments produced each leaf) is kept alongside but is
/// not part of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfig {
  values: BTreeMap<String, OptionValue>,
  #[serde(skip)]
  origins: BTreeMap<OptionPath, Vec<String>>,
}

impl Hashable for ResolvedConfig {}

impl ResolvedConfig {
  pub(crate) fn new(values: BTreeMap<String, OptionValue>, origins: BTreeMap<OptionPath, Vec<String>>) -> Self {
    Self { values, origins }
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Top-level options.
  pub fn values(&self) -> &BTreeMap<String, OptionValue> {
    &self.values
  }

  pub fn get(&self, path: &OptionPath) -> Option<&OptionValue> {
    let (first, rest) = path.segments().split_first()?;
    self.values.get(first)?.get(rest)
  }

  /// Like [`ResolvedConfig::get`], for a dotted string; malformed paths resolve to nothing.
  pub fn lookup(&self, path: &str) -> Option<&OptionValue> {
    OptionPath::parse(path).ok().and_then(|path| self.get(&path))
  }

  /// Fragments that contributed the leaf at `path`, in contribution order.
  pub fn origins(&self, path: &OptionPath) -> &[String] {
    self.origins.get(path).map(Vec::as_slice).unwrap_or_default()
  }

  /// Every fragment that contributed to `path` or anything beneath it.
  pub fn origins_under(&self, path: &OptionPath) -> BTreeSet<&str> {
    self
      .origins
      .range(path.clone()..)
      .take_while(|(leaf, _)| leaf.starts_with(path))
      .flat_map(|(_, names)| names.iter().map(String::as_str))
      .collect()
  }

  /// Leaves in path order: scalars, lists and empty records.
  pub fn leaves(&self) -> Vec<(OptionPath, &OptionValue)> {
    let mut out = Vec::new();
    for (key, value) in &self.values {
      collect_leaves(vec![key.clone()], value, &mut out);
    }
    out
  }

  pub fn to_json(&self) -> Value {
    Value::Object(self.values.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
  }

  /// Compact canonical JSON.
  pub fn to_canonical_string(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }

  pub fn to_pretty_string(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }
}

fn collect_leaves<'a>(segments: Vec<String>, value: &'a OptionValue, out: &mut Vec<(OptionPath, &'a OptionValue)>) {
  match value {
    OptionValue::Record(fields) if !fields.is_empty() => {
      for (key, child) in fields {
        let mut child_segments = segments.clone();
        child_segments.push(key.clone());
        collect_leaves(child_segments, child, out);
      }
    }
    leaf => {
      if let Ok(path) = OptionPath::from_segments(segments) {
        out.push((path, leaf));
      }
    }
  }
}
