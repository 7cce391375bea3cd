//! Override priorities.
//!
//! Lower numbers are stronger. Plain definitions carry [`Priority::DEFAULT`].
//! For scalars the strongest definition wins (ties go to the later one); for
//! appended lists the priority orders the contributions, so `before` lands
//! at the front and `after` at the back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority '{0}', expected a number or one of: force, before, default, after")]
pub struct PriorityParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub u32);

impl Priority {
  pub const FORCE: Priority = Priority(50);
  pub const BEFORE: Priority = Priority(500);
  pub const DEFAULT: Priority = Priority(1000);
  pub const AFTER: Priority = Priority(1500);

  pub fn order(value: u32) -> Self {
    Priority(value)
  }

  /// True if a definition at `self` overrides one at `other`.
  pub fn overrides(self, other: Priority) -> bool {
    self.0 <= other.0
  }

  pub fn name(self) -> Option<&'static str> {
    match self {
      Self::FORCE => Some("force"),
      Self::BEFORE => Some("before"),
      Self::DEFAULT => Some("default"),
      Self::AFTER => Some("after"),
      _ => None,
    }
  }
}

impl Default for Priority {
  fn default() -> Self {
    Self::DEFAULT
  }
}

impl fmt::Display for Priority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.name() {
      Some(name) => write!(f, "{} ({})", name, self.0),
      None => write!(f, "{}", self.0),
    }
  }
}

impl FromStr for Priority {
  type Err = PriorityParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "force" => Ok(Self::FORCE),
      "before" => Ok(Self::BEFORE),
      "default" => Ok(Self::DEFAULT),
      "after" => Ok(Self::AFTER),
      other => other
        .parse::<u32>()
        .map(Priority)
        .map_err(|_| PriorityParseError(other.to_string())),
    }
  }
}
