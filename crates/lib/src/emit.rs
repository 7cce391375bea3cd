//! Artifact emission: turning a resolved configuration into the concrete
//! environment descriptor consumed by downstream builders.
//!
//! The descriptor reads a handful of well-known options:
//!
//! | option                        | descriptor field        |
//! |-------------------------------|-------------------------|
//! | `packages` (list of strings)  | `packages`              |
//! | `languages.<name>.enable`     | `languages.<name>`      |
//! | `languages.<name>.version`    | `languages.<name>.version` |
//! | `enterShell` (string)         | `activation`            |
//! | `enterTest` (string)          | `selfTest`              |
//!
//! Everything else stays in the resolved configuration, which is written
//! next to the descriptor.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::merge::ResolvedConfig;
use crate::option::OptionValue;
use crate::platform::PlatformId;
use crate::util::hash::Hashable;

pub const DESCRIPTOR_FILENAME: &str = "descriptor.json";
pub const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to serialize output: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("platform '{0}' cannot be used as a directory name")]
  InvalidPlatformDir(PlatformId),
}

/// An enabled language toolchain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSpec {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

/// The concrete environment for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
  pub platform: PlatformId,
  pub packages: Vec<String>,
  pub languages: BTreeMap<String, LanguageSpec>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub activation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub self_test: Option<String>,
  /// Hash of the resolved configuration the descriptor was built from.
  pub digest: String,
}

impl Descriptor {
  pub fn from_resolved(platform: &PlatformId, resolved: &ResolvedConfig) -> Result<Self, EmitError> {
    let digest = resolved.compute_hash().map_err(EmitError::Serialize)?;
    Ok(Self {
      platform: platform.clone(),
      packages: packages(platform, resolved),
      languages: languages(resolved),
      activation: resolved.lookup("enterShell").and_then(OptionValue::as_str).map(str::to_string),
      self_test: resolved.lookup("enterTest").and_then(OptionValue::as_str).map(str::to_string),
      digest: digest.0,
    })
  }
}

fn packages(platform: &PlatformId, resolved: &ResolvedConfig) -> Vec<String> {
  let Some(items) = resolved.lookup("packages").and_then(OptionValue::as_list) else {
    return Vec::new();
  };
  items
    .iter()
    .filter_map(|item| match item.as_str() {
      Some(name) => Some(name.to_string()),
      None => {
        warn!(platform = %platform, "ignoring non-string package entry {}", item.render());
        None
      }
    })
    .collect()
}

fn languages(resolved: &ResolvedConfig) -> BTreeMap<String, LanguageSpec> {
  let Some(table) = resolved.lookup("languages").and_then(OptionValue::as_record) else {
    return BTreeMap::new();
  };
  table
    .iter()
    .filter_map(|(name, language)| {
      let settings = language.as_record()?;
      let enabled = settings.get("enable").and_then(OptionValue::as_bool).unwrap_or(false);
      enabled.then(|| {
        let version = settings.get("version").and_then(OptionValue::as_str).map(str::to_string);
        (name.clone(), LanguageSpec { version })
      })
    })
    .collect()
}

/// Sink for per-platform artifacts.
pub trait Emitter {
  /// Emit one platform's artifacts, returning where they were written.
  fn emit(&self, descriptor: &Descriptor, resolved: &ResolvedConfig) -> Result<PathBuf, EmitError>;
}

/// Writes `<out_dir>/<platform>/descriptor.json` and `config.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonEmitter {
  out_dir: PathBuf,
}

impl JsonEmitter {
  pub fn new(out_dir: impl Into<PathBuf>) -> Self {
    Self { out_dir: out_dir.into() }
  }

  fn platform_dir(&self, platform: &PlatformId) -> Result<PathBuf, EmitError> {
    let token = platform.as_str();
    if token.contains(['/', '\\']) || token == "." || token == ".." {
      return Err(EmitError::InvalidPlatformDir(platform.clone()));
    }
    Ok(self.out_dir.join(token))
  }
}

impl Emitter for JsonEmitter {
  fn emit(&self, descriptor: &Descriptor, resolved: &ResolvedConfig) -> Result<PathBuf, EmitError> {
    let dir = self.platform_dir(&descriptor.platform)?;
    fs::create_dir_all(&dir).map_err(|source| EmitError::Write {
      path: dir.clone(),
      source,
    })?;

    let descriptor_json = serde_json::to_string_pretty(descriptor).map_err(EmitError::Serialize)?;
    write_file(&dir.join(DESCRIPTOR_FILENAME), &descriptor_json)?;
    let config_json = resolved.to_pretty_string().map_err(EmitError::Serialize)?;
    write_file(&dir.join(CONFIG_FILENAME), &config_json)?;

    debug!(platform = %descriptor.platform, dir = %dir.display(), "artifacts written");
    Ok(dir)
  }
}

fn write_file(path: &Path, content: &str) -> Result<(), EmitError> {
  fs::write(path, content).map_err(|source| EmitError::Write {
    path: path.to_path_buf(),
    source,
  })
}
