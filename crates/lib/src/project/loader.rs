use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::error::SourceError;
use super::format::Format;
use crate::fragment::{Fragment, FragmentDoc};

/// Depth-first import resolution.
///
/// Imported fragments land before the importing fragment. Each file is
/// loaded at most once; reaching a file that is still being loaded further
/// up the chain is a cycle.
#[derive(Debug, Default)]
pub(crate) struct Loader {
  loaded: HashSet<PathBuf>,
  stack: Vec<PathBuf>,
  fragments: Vec<Fragment>,
}

impl Loader {
  pub fn new() -> Self {
    Self::default()
  }

  /// A loader that treats `loaded` as already visited.
  pub fn with_loaded(loaded: HashSet<PathBuf>) -> Self {
    Self {
      loaded,
      ..Self::default()
    }
  }

  pub fn into_fragments(self) -> Vec<Fragment> {
    self.fragments
  }

  pub fn into_parts(self) -> (Vec<Fragment>, HashSet<PathBuf>) {
    (self.fragments, self.loaded)
  }

  /// Mark a non-fragment document (the project file) as being loaded.
  pub fn enter_root(&mut self, path: &Path) -> Result<(), SourceError> {
    self.enter(path).map(|_| ())
  }

  /// Load an import spec relative to `base`.
  pub fn import(&mut self, base: &Path, spec: &str) -> Result<(), SourceError> {
    self.load_path(&base.join(spec))
  }

  /// Load a fragment file, or every fragment file under a directory.
  pub fn load_path(&mut self, path: &Path) -> Result<(), SourceError> {
    let metadata = fs::metadata(path).map_err(|source| SourceError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    if metadata.is_dir() {
      for file in fragment_files(path)? {
        self.load_file(&file)?;
      }
      Ok(())
    } else {
      self.load_file(path)
    }
  }

  /// Add a fragment document defined inline, after resolving its imports.
  pub fn load_doc(&mut self, doc: FragmentDoc, base: &Path, origin: &Path) -> Result<(), SourceError> {
    for spec in &doc.imports {
      self.import(base, spec)?;
    }
    let fragment = doc.into_fragment().map_err(|source| SourceError::Fragment {
      path: origin.to_path_buf(),
      source,
    })?;
    trace!(fragment = fragment.name(), "fragment loaded");
    self.fragments.push(fragment);
    Ok(())
  }

  fn load_file(&mut self, path: &Path) -> Result<(), SourceError> {
    let path = canonical(path)?;
    if !self.enter(&path)? {
      return Ok(());
    }
    debug!(path = %path.display(), "loading fragment file");
    let doc: FragmentDoc = read_document(&path)?;
    let base = path.parent().unwrap_or(Path::new("."));
    self.load_doc(doc, base, &path)?;
    self.stack.pop();
    Ok(())
  }

  /// Returns false when the file was already loaded.
  fn enter(&mut self, path: &Path) -> Result<bool, SourceError> {
    if let Some(start) = self.stack.iter().position(|open| open == path) {
      let mut chain = self.stack[start..].to_vec();
      chain.push(path.to_path_buf());
      return Err(SourceError::ImportCycle { chain });
    }
    if !self.loaded.insert(path.to_path_buf()) {
      debug!(path = %path.display(), "already loaded, skipping");
      return Ok(false);
    }
    self.stack.push(path.to_path_buf());
    Ok(true)
  }
}

pub(crate) fn canonical(path: &Path) -> Result<PathBuf, SourceError> {
  dunce::canonicalize(path).map_err(|source| SourceError::Read {
    path: path.to_path_buf(),
    source,
  })
}

/// Read and decode a JSON or YAML document.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
  let format = Format::from_path(path).ok_or_else(|| SourceError::UnsupportedFormat {
    path: path.to_path_buf(),
  })?;
  let content = fs::read_to_string(path).map_err(|source| SourceError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  format.parse(&content).map_err(|source| SourceError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

/// Fragment documents under `dir`, recursively, in file name order.
fn fragment_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
  let mut files = Vec::new();
  for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|source| SourceError::Walk {
      path: dir.to_path_buf(),
      source,
    })?;
    if entry.file_type().is_file() && Format::from_path(entry.path()).is_some() {
      files.push(entry.into_path());
    }
  }
  Ok(files)
}
