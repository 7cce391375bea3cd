use std::path::Path;

use serde::de::DeserializeOwned;

use super::error::ParseError;

/// On-disk document format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  Json,
  Yaml,
}

impl Format {
  pub fn from_path(path: &Path) -> Option<Self> {
    match path.extension()?.to_str()? {
      "json" => Some(Self::Json),
      "yaml" | "yml" => Some(Self::Yaml),
      _ => None,
    }
  }

  pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, ParseError> {
    match self {
      Self::Json => Ok(serde_json::from_str(content)?),
      Self::Yaml => Ok(serde_yaml::from_str(content)?),
    }
  }
}
