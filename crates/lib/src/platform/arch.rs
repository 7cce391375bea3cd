use std::fmt;

/// CPU architectures devmatrix can detect on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
  X86_64,
  Aarch64,
}

impl Arch {
  pub const ALL: [Arch; 2] = [Arch::X86_64, Arch::Aarch64];

  /// Detect the host CPU architecture at runtime
  pub fn current() -> Option<Self> {
    Self::from_rust_arch(std::env::consts::ARCH)
  }

  /// Map a `std::env::consts::ARCH` value onto a supported architecture.
  pub fn from_rust_arch(arch: &str) -> Option<Self> {
    match arch {
      "x86_64" => Some(Self::X86_64),
      "aarch64" => Some(Self::Aarch64),
      _ => None,
    }
  }

  /// Identifier used in platform triples
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
