//! Dotted option paths such as `languages.python.enable`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed option path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("option path must not be empty")]
  Empty,

  #[error("option path '{path}' contains an empty segment")]
  EmptySegment { path: String },

  #[error("option path '{path}' has invalid segment '{segment}'")]
  InvalidSegment { path: String, segment: String },

  #[error("option path '{path}' uses reserved segment '{segment}'")]
  ReservedSegment { path: String, segment: String },
}

/// Check a single path segment against `[A-Za-z_][A-Za-z0-9_-]*`.
///
/// `path` is only used to give the error some context.
pub fn validate_segment(path: &str, segment: &str) -> Result<(), ValidationError> {
  let mut chars = segment.chars();
  let Some(first) = chars.next() else {
    return Err(ValidationError::EmptySegment { path: path.to_string() });
  };
  let valid_first = first.is_ascii_alphabetic() || first == '_';
  if !valid_first || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
    return Err(ValidationError::InvalidSegment {
      path: path.to_string(),
      segment: segment.to_string(),
    });
  }
  // `__priority` and friends are wrapper keys in fragment documents.
  if segment.starts_with("__") {
    return Err(ValidationError::ReservedSegment {
      path: path.to_string(),
      segment: segment.to_string(),
    });
  }
  Ok(())
}

/// A validated, non-empty dotted option path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionPath {
  segments: Vec<String>,
}

impl OptionPath {
  pub fn parse(path: &str) -> Result<Self, ValidationError> {
    if path.is_empty() {
      return Err(ValidationError::Empty);
    }
    let segments = path
      .split('.')
      .map(|segment| validate_segment(path, segment).map(|_| segment.to_string()))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self { segments })
  }

  /// Build a path from already-split segments, validating each one.
  pub fn from_segments<I, S>(segments: I) -> Result<Self, ValidationError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
    if segments.is_empty() {
      return Err(ValidationError::Empty);
    }
    let joined = segments.join(".");
    for segment in &segments {
      validate_segment(&joined, segment)?;
    }
    Ok(Self { segments })
  }

  /// Extend the path by one segment.
  pub fn child(&self, segment: &str) -> Result<Self, ValidationError> {
    validate_segment(&format!("{}.{}", self, segment), segment)?;
    let mut segments = self.segments.clone();
    segments.push(segment.to_string());
    Ok(Self { segments })
  }

  pub fn segments(&self) -> &[String] {
    &self.segments
  }

  pub fn len(&self) -> usize {
    self.segments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  pub fn last(&self) -> &str {
    self.segments.last().map(String::as_str).unwrap_or_default()
  }

  /// The enclosing path, or `None` for a top-level option.
  pub fn parent(&self) -> Option<Self> {
    if self.segments.len() < 2 {
      return None;
    }
    Some(Self {
      segments: self.segments[..self.segments.len() - 1].to_vec(),
    })
  }

  /// The first `len` segments, or `None` when `len` is zero or too long.
  pub fn prefix(&self, len: usize) -> Option<Self> {
    if len == 0 || len > self.segments.len() {
      return None;
    }
    Some(Self {
      segments: self.segments[..len].to_vec(),
    })
  }

  /// True if `prefix` equals this path or is one of its ancestors.
  pub fn starts_with(&self, prefix: &OptionPath) -> bool {
    self.segments.starts_with(&prefix.segments)
  }
}

impl fmt::Display for OptionPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.segments.join("."))
  }
}

impl FromStr for OptionPath {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl TryFrom<String> for OptionPath {
  type Error = ValidationError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::parse(&value)
  }
}

impl TryFrom<&str> for OptionPath {
  type Error = ValidationError;

  fn try_from(value: &str) -> Result<Self, Self::Error> {
    Self::parse(value)
  }
}

impl From<OptionPath> for String {
  fn from(path: OptionPath) -> Self {
    path.to_string()
  }
}
