use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::option::{OptionPath, OptionType, Priority, Shape, ValidationError};

/// Coarse error class, as reported per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
  #[serde(rename = "ValidationError")]
  Validation,
  #[serde(rename = "TypeError")]
  Type,
  #[serde(rename = "ConflictError")]
  Conflict,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ErrorKind::Validation => "ValidationError",
      ErrorKind::Type => "TypeError",
      ErrorKind::Conflict => "ConflictError",
    })
  }
}

/// Why two definitions of one path could not be combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
  /// The path already holds a value of another shape.
  Shape {
    existing: Shape,
    existing_origin: String,
    incoming: Shape,
    incoming_origin: String,
  },

  /// Strict option defined twice at the same priority with different values.
  Priority {
    priority: Priority,
    existing_origin: String,
    incoming_origin: String,
  },
}

impl fmt::Display for ConflictKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConflictKind::Shape {
        existing,
        existing_origin,
        incoming,
        incoming_origin,
      } => write!(
        f,
        "fragment '{}' defines a {}, but fragment '{}' already defined a {}",
        incoming_origin, incoming, existing_origin, existing
      ),
      ConflictKind::Priority {
        priority,
        existing_origin,
        incoming_origin,
      } => write!(
        f,
        "fragments '{}' and '{}' define different values at priority {}; \
         give one of them a stronger priority (e.g. force) or unset the path first",
        existing_origin, incoming_origin, priority
      ),
    }
  }
}

/// Errors raised while merging fragments for one platform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
  #[error("fragment '{fragment}': {source}")]
  Validation {
    fragment: String,
    #[source]
    source: ValidationError,
  },

  #[error("type error at '{path}' in fragment '{fragment}': declared {expected}, got {found}")]
  Type {
    path: OptionPath,
    fragment: String,
    expected: OptionType,
    found: String,
  },

  #[error("conflict at '{path}': {kind}")]
  Conflict { path: OptionPath, kind: ConflictKind },
}

impl MergeError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      MergeError::Validation { .. } => ErrorKind::Validation,
      MergeError::Type { .. } => ErrorKind::Type,
      MergeError::Conflict { .. } => ErrorKind::Conflict,
    }
  }

  /// The option path the error is about, when there is one.
  pub fn path(&self) -> Option<&OptionPath> {
    match self {
      MergeError::Validation { .. } => None,
      MergeError::Type { path, .. } | MergeError::Conflict { path, .. } => Some(path),
    }
  }
}
