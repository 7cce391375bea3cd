use std::path::PathBuf;

use super::error::SourceError;
use super::loader::Loader;
use crate::fragment::Fragment;

/// Anything that can hand the merge engine an ordered list of fragments.
pub trait FragmentSource {
  fn load(&self) -> Result<Vec<Fragment>, SourceError>;
}

/// Fragment files and directories on disk, loaded in the given order with
/// their imports resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSource {
  paths: Vec<PathBuf>,
}

impl FileSource {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      paths: vec![path.into()],
    }
  }

  pub fn from_paths<I, P>(paths: I) -> Self
  where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
  {
    Self {
      paths: paths.into_iter().map(Into::into).collect(),
    }
  }
}

impl FragmentSource for FileSource {
  fn load(&self) -> Result<Vec<Fragment>, SourceError> {
    let mut loader = Loader::new();
    for path in &self.paths {
      loader.load_path(path)?;
    }
    Ok(loader.into_fragments())
  }
}

/// Fragments built in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticSource {
  fragments: Vec<Fragment>,
}

impl StaticSource {
  pub fn new(fragments: Vec<Fragment>) -> Self {
    Self { fragments }
  }
}

impl From<Vec<Fragment>> for StaticSource {
  fn from(fragments: Vec<Fragment>) -> Self {
    Self::new(fragments)
  }
}

impl FragmentSource for StaticSource {
  fn load(&self) -> Result<Vec<Fragment>, SourceError> {
    Ok(self.fragments.clone())
  }
}
