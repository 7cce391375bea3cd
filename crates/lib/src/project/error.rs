use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::consts::PROJECT_VERSION;
use crate::fragment::FragmentError;
use crate::option::SchemaError;
use crate::platform::PlatformError;

/// Document decoding failure, by format.
#[derive(Debug, Error)]
pub enum ParseError {
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while loading a project or its fragment files.
#[derive(Debug, Error)]
pub enum SourceError {
  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: ParseError,
  },

  #[error("unsupported file format for {} (expected .json, .yaml or .yml)", path.display())]
  UnsupportedFormat { path: PathBuf },

  #[error("unsupported project file version {found} in {}, expected {PROJECT_VERSION}", path.display())]
  UnsupportedVersion { path: PathBuf, found: u32 },

  #[error("invalid fragment in {}: {source}", path.display())]
  Fragment {
    path: PathBuf,
    #[source]
    source: FragmentError,
  },

  #[error("invalid option declarations in {}: {source}", path.display())]
  Schema {
    path: PathBuf,
    #[source]
    source: SchemaError,
  },

  #[error("invalid platform list in {}: {source}", path.display())]
  Platform {
    path: PathBuf,
    #[source]
    source: PlatformError,
  },

  #[error("import cycle: {}", format_chain(chain))]
  ImportCycle { chain: Vec<PathBuf> },

  #[error("failed to walk {}: {source}", path.display())]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

fn format_chain(chain: &[PathBuf]) -> String {
  chain
    .iter()
    .map(|path| path.display().to_string())
    .collect::<Vec<_>>()
    .join(" -> ")
}
