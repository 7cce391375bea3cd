//! Platform-list source resolution.
//!
//! Sources are consulted in order: explicit list (CLI), the
//! `DEVMATRIX_PLATFORMS` environment variable, the project file, and finally
//! the built-in defaults. The first non-empty source wins.

use tracing::debug;

use super::{PlatformError, PlatformId, PlatformSet};
use crate::consts::{DEFAULT_PLATFORMS, PLATFORMS_ENV};

/// The built-in platform list.
pub fn default_platforms() -> PlatformSet {
  DEFAULT_PLATFORMS
    .iter()
    .map(|token| PlatformId::from_triple((*token).to_string()))
    .collect()
}

/// Pick the platform set for this run.
pub fn select_platforms(explicit: &[String], project: Option<&PlatformSet>) -> Result<PlatformSet, PlatformError> {
  let explicit: PlatformSet = explicit
    .iter()
    .map(|token| PlatformId::new(token.trim()))
    .collect::<Result<_, _>>()?;
  if !explicit.is_empty() {
    debug!(count = explicit.len(), "using platforms from command line");
    return Ok(explicit);
  }

  if let Ok(list) = std::env::var(PLATFORMS_ENV) {
    let from_env = PlatformSet::parse_list(&list)?;
    if !from_env.is_empty() {
      debug!(count = from_env.len(), "using platforms from {}", PLATFORMS_ENV);
      return Ok(from_env);
    }
  }

  if let Some(set) = project.filter(|set| !set.is_empty()) {
    debug!(count = set.len(), "using platforms from project file");
    return Ok(set.clone());
  }

  Ok(default_platforms())
}
