//! Option declarations.
//!
//! Declaring an option is optional. A declaration pins the option's type,
//! chooses how list contributions combine, can make equal-priority
//! disagreements an error, and can supply a fallback value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{OptionPath, OptionValue, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
  #[error(transparent)]
  Path(#[from] ValidationError),

  #[error("default for '{path}' is a {found}, but the option is declared as {expected}")]
  InvalidDefault {
    path: OptionPath,
    expected: OptionType,
    found: String,
  },
}

/// Declared type of an option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
  Bool,
  String,
  Number,
  /// Any of bool, number or string.
  Scalar,
  List,
  Record,
  #[default]
  Any,
}

impl OptionType {
  pub fn accepts(self, value: &OptionValue) -> bool {
    match self {
      OptionType::Any => true,
      OptionType::Scalar => matches!(value, OptionValue::Scalar(_)),
      OptionType::List => matches!(value, OptionValue::List(_)),
      OptionType::Record => matches!(value, OptionValue::Record(_)),
      OptionType::Bool | OptionType::String | OptionType::Number => value.kind() == self.as_str(),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OptionType::Bool => "bool",
      OptionType::String => "string",
      OptionType::Number => "number",
      OptionType::Scalar => "scalar",
      OptionType::List => "list",
      OptionType::Record => "record",
      OptionType::Any => "any",
    }
  }
}

impl fmt::Display for OptionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How list contributions from several fragments combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMerge {
  #[default]
  Append,
  Replace,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDecl {
  #[serde(rename = "type", default)]
  pub ty: OptionType,

  #[serde(default)]
  pub merge: ListMerge,

  /// Equal-priority definitions with different values are a conflict.
  #[serde(default)]
  pub strict: bool,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<OptionValue>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl OptionDecl {
  pub fn new(ty: OptionType) -> Self {
    Self {
      ty,
      ..Self::default()
    }
  }

  pub fn replace(mut self) -> Self {
    self.merge = ListMerge::Replace;
    self
  }

  pub fn strict(mut self) -> Self {
    self.strict = true;
    self
  }

  pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
    self.default = Some(value.into());
    self
  }

  pub fn describe(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }
}

/// All declared options, keyed by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
  decls: BTreeMap<OptionPath, OptionDecl>,
}

impl Schema {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a schema from the `options` table of a project file.
  pub fn from_decls(decls: BTreeMap<String, OptionDecl>) -> Result<Self, SchemaError> {
    let mut schema = Self::new();
    for (path, decl) in decls {
      schema.declare(OptionPath::parse(&path)?, decl)?;
    }
    Ok(schema)
  }

  pub fn declare(&mut self, path: OptionPath, decl: OptionDecl) -> Result<(), SchemaError> {
    if let Some(default) = decl.default.as_ref().filter(|value| !decl.ty.accepts(value)) {
      return Err(SchemaError::InvalidDefault {
        path,
        expected: decl.ty,
        found: default.kind().to_string(),
      });
    }
    self.decls.insert(path, decl);
    Ok(())
  }

  /// Chainable form of [`Schema::declare`] taking a string path.
  pub fn with(mut self, path: &str, decl: OptionDecl) -> Result<Self, SchemaError> {
    self.declare(OptionPath::parse(path)?, decl)?;
    Ok(self)
  }

  pub fn get(&self, path: &OptionPath) -> Option<&OptionDecl> {
    self.decls.get(path)
  }

  pub fn list_merge(&self, path: &OptionPath) -> ListMerge {
    self.get(path).map(|decl| decl.merge).unwrap_or_default()
  }

  pub fn is_strict(&self, path: &OptionPath) -> bool {
    self.get(path).is_some_and(|decl| decl.strict)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&OptionPath, &OptionDecl)> {
    self.decls.iter()
  }

  /// Declared defaults in path order.
  pub fn defaults(&self) -> impl Iterator<Item = (&OptionPath, &OptionValue)> {
    self
      .decls
      .iter()
      .filter_map(|(path, decl)| decl.default.as_ref().map(|value| (path, value)))
  }

  pub fn is_empty(&self) -> bool {
    self.decls.is_empty()
  }

  pub fn len(&self) -> usize {
    self.decls.len()
  }
}
