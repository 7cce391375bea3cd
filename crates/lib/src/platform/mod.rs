//! Target platforms.
//!
//! Every derived artifact is produced independently per platform. The merge
//! engine treats a [`PlatformId`] as an opaque lookup key; only host detection
//! in this module knows about architectures and operating systems.

pub mod arch;
mod id;
pub mod os;
mod select;

use arch::Arch;
use os::Os;
use std::fmt;

pub use id::{PlatformError, PlatformId, PlatformSet};
pub use select::{default_platforms, select_platforms};

/// Platform identifier combining architecture and OS (e.g., "aarch64-darwin")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Every triple host detection can produce, ordered by OS then architecture.
  pub fn known() -> Vec<Self> {
    Os::ALL
      .iter()
      .flat_map(|os| Arch::ALL.iter().map(move |arch| Self::new(*arch, *os)))
      .collect()
  }

  /// Returns the platform triple string (e.g., "aarch64-darwin")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

impl From<Platform> for PlatformId {
  fn from(platform: Platform) -> Self {
    PlatformId::from_triple(platform.triple())
  }
}
