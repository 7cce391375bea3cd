use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Platform;

/// Errors raised when building platform identifiers or sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
  #[error("platform identifier must not be empty")]
  Empty,

  #[error("invalid platform identifier '{token}': whitespace and commas are not allowed")]
  Invalid { token: String },
}

/// Opaque target platform token such as `x86_64-linux`.
///
/// The token is only ever used as a lookup key. Validation rejects values
/// that could not round-trip through a comma separated list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformId(String);

impl PlatformId {
  pub fn new(token: impl Into<String>) -> Result<Self, PlatformError> {
    let token = token.into();
    if token.is_empty() {
      return Err(PlatformError::Empty);
    }
    if token.chars().any(|c| c.is_whitespace() || c == ',') {
      return Err(PlatformError::Invalid { token });
    }
    Ok(Self(token))
  }

  // Triples produced by host detection are always well formed.
  pub(super) fn from_triple(triple: String) -> Self {
    Self(triple)
  }

  /// The platform the current process runs on, if host detection supports it.
  pub fn host() -> Option<Self> {
    Platform::current().map(Self::from)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PlatformId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for PlatformId {
  type Err = PlatformError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::new(s)
  }
}

impl TryFrom<String> for PlatformId {
  type Error = PlatformError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<PlatformId> for String {
  fn from(id: PlatformId) -> Self {
    id.0
  }
}

/// Ordered, duplicate-free set of platforms.
///
/// Order is the order of first appearance and determines the order in which
/// outcomes are reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PlatformId>", into = "Vec<PlatformId>")]
pub struct PlatformSet {
  platforms: Vec<PlatformId>,
}

impl PlatformSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse a comma separated list, ignoring blank entries.
  pub fn parse_list(list: &str) -> Result<Self, PlatformError> {
    list
      .split(',')
      .map(str::trim)
      .filter(|token| !token.is_empty())
      .map(PlatformId::new)
      .collect()
  }

  /// Adds a platform; returns false if it was already present.
  pub fn insert(&mut self, platform: PlatformId) -> bool {
    if self.platforms.contains(&platform) {
      return false;
    }
    self.platforms.push(platform);
    true
  }

  pub fn contains(&self, platform: &PlatformId) -> bool {
    self.platforms.contains(platform)
  }

  pub fn len(&self) -> usize {
    self.platforms.len()
  }

  pub fn is_empty(&self) -> bool {
    self.platforms.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, PlatformId> {
    self.platforms.iter()
  }

  pub fn as_slice(&self) -> &[PlatformId] {
    &self.platforms
  }
}

impl FromIterator<PlatformId> for PlatformSet {
  fn from_iter<I: IntoIterator<Item = PlatformId>>(iter: I) -> Self {
    let mut set = Self::new();
    for platform in iter {
      set.insert(platform);
    }
    set
  }
}

impl<'a> IntoIterator for &'a PlatformSet {
  type Item = &'a PlatformId;
  type IntoIter = std::slice::Iter<'a, PlatformId>;

  fn into_iter(self) -> Self::IntoIter {
    self.platforms.iter()
  }
}

impl From<Vec<PlatformId>> for PlatformSet {
  fn from(platforms: Vec<PlatformId>) -> Self {
    platforms.into_iter().collect()
  }
}

impl From<PlatformSet> for Vec<PlatformId> {
  fn from(set: PlatformSet) -> Self {
    set.platforms
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn id(s: &str) -> PlatformId {
    PlatformId::new(s).unwrap()
  }

  #[test]
  fn rejects_empty_and_whitespace() {
    assert_eq!(PlatformId::new(""), Err(PlatformError::Empty));
    assert!(matches!(PlatformId::new("x86_64 linux"), Err(PlatformError::Invalid { .. })));
    assert!(matches!(PlatformId::new("a,b"), Err(PlatformError::Invalid { .. })));
  }

  #[test]
  fn set_keeps_first_occurrence_order() {
    let set: PlatformSet = vec![id("b"), id("a"), id("b"), id("c")].into_iter().collect();
    let order: Vec<&str> = set.iter().map(PlatformId::as_str).collect();
    assert_eq!(order, vec!["b", "a", "c"]);
  }

  #[test]
  fn parse_list_trims_and_skips_blanks() {
    let set = PlatformSet::parse_list(" x86_64-linux, ,aarch64-darwin ,").unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&id("x86_64-linux")));
    assert!(set.contains(&id("aarch64-darwin")));
  }

  #[test]
  fn serializes_as_plain_strings() {
    let set = PlatformSet::parse_list("x86_64-linux,aarch64-linux").unwrap();
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, r#"["x86_64-linux","aarch64-linux"]"#);

    let err = serde_json::from_str::<PlatformSet>(r#"["ok", ""]"#);
    assert!(err.is_err());
  }
}
