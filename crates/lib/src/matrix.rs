//! Matrix expansion: one independent merge per platform.
//!
//! Platforms share nothing but the (immutable) inputs, so they are merged
//! concurrently on the rayon pool. A failing platform is recorded and
//! reported; it never prevents or alters the result of any other platform.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fragment::Fragment;
use crate::merge::{MergeError, ResolvedConfig, merge_with_schema};
use crate::option::Schema;
use crate::platform::{PlatformId, PlatformSet};

/// Result of merging one platform.
pub type PlatformOutcome = Result<ResolvedConfig, MergeError>;

/// Per-platform outcomes, in platform-set order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformMap {
  entries: Vec<(PlatformId, PlatformOutcome)>,
}

impl PlatformMap {
  pub fn get(&self, platform: &PlatformId) -> Option<&PlatformOutcome> {
    self
      .entries
      .iter()
      .find(|(candidate, _)| candidate == platform)
      .map(|(_, outcome)| outcome)
  }

  pub fn resolved(&self, platform: &PlatformId) -> Option<&ResolvedConfig> {
    self.get(platform).and_then(|outcome| outcome.as_ref().ok())
  }

  pub fn error(&self, platform: &PlatformId) -> Option<&MergeError> {
    self.get(platform).and_then(|outcome| outcome.as_ref().err())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&PlatformId, &PlatformOutcome)> {
    self.entries.iter().map(|(platform, outcome)| (platform, outcome))
  }

  pub fn platforms(&self) -> impl Iterator<Item = &PlatformId> {
    self.entries.iter().map(|(platform, _)| platform)
  }

  pub fn successes(&self) -> impl Iterator<Item = (&PlatformId, &ResolvedConfig)> {
    self
      .entries
      .iter()
      .filter_map(|(platform, outcome)| outcome.as_ref().ok().map(|resolved| (platform, resolved)))
  }

  pub fn failures(&self) -> impl Iterator<Item = (&PlatformId, &MergeError)> {
    self
      .entries
      .iter()
      .filter_map(|(platform, outcome)| outcome.as_ref().err().map(|error| (platform, error)))
  }

  /// True when every platform merged successfully.
  pub fn is_complete(&self) -> bool {
    self.entries.iter().all(|(_, outcome)| outcome.is_ok())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// All-or-nothing view: every resolved configuration, or every failure.
  pub fn into_resolved(self) -> Result<BTreeMap<PlatformId, ResolvedConfig>, ExpandError> {
    let mut resolved = BTreeMap::new();
    let mut failures = Vec::new();
    for (platform, outcome) in self.entries {
      match outcome {
        Ok(config) => {
          resolved.insert(platform, config);
        }
        Err(error) => failures.push((platform, error)),
      }
    }
    if failures.is_empty() {
      Ok(resolved)
    } else {
      Err(ExpandError { failures })
    }
  }
}

/// One or more platforms failed to merge.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ExpandError {
  pub failures: Vec<(PlatformId, MergeError)>,
}

impl fmt::Display for ExpandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} platform(s) failed to evaluate", self.failures.len())?;
    for (platform, error) in &self.failures {
      write!(f, "\n  {}: {}", platform, error)?;
    }
    Ok(())
  }
}

/// Expand fragments over every platform with no option declarations.
pub fn expand(platforms: &PlatformSet, fragments: &[Fragment]) -> PlatformMap {
  expand_with_schema(platforms, fragments, &Schema::default())
}

pub fn expand_with_schema(platforms: &PlatformSet, fragments: &[Fragment], schema: &Schema) -> PlatformMap {
  info!(
    platforms = platforms.len(),
    fragments = fragments.len(),
    "expanding platform matrix"
  );

  let entries: Vec<(PlatformId, PlatformOutcome)> = platforms
    .as_slice()
    .par_iter()
    .map(|platform| (platform.clone(), evaluate_platform(platform, fragments, schema)))
    .collect();

  for (platform, outcome) in &entries {
    match outcome {
      Ok(resolved) => debug!(platform = %platform, options = resolved.values().len(), "platform resolved"),
      Err(error) => warn!(platform = %platform, kind = %error.kind(), "platform failed to evaluate: {}", error),
    }
  }

  PlatformMap { entries }
}

/// Merge the fragments that apply to a single platform.
pub fn evaluate_platform(platform: &PlatformId, fragments: &[Fragment], schema: &Schema) -> PlatformOutcome {
  let selected = fragments.iter().filter(|fragment| fragment.applies_to(platform));
  merge_with_schema(selected, schema)
}
