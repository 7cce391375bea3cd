//! Project loading: the fragment source boundary.
//!
//! A project file (`devmatrix.json`, or YAML) names the platforms to
//! evaluate, declares options, and lists fragments either inline or through
//! imports:
//!
//! ```json
//! {
//!   "version": 1,
//!   "platforms": ["x86_64-linux", "aarch64-darwin"],
//!   "options": {
//!     "packages": { "type": "list" },
//!     "languages.python.version": { "type": "string", "strict": true }
//!   },
//!   "imports": ["fragments/"],
//!   "fragments": [
//!     { "name": "local", "config": { "packages": ["pre-commit"] } }
//!   ]
//! }
//! ```
//!
//! Imports are resolved relative to the importing file and come before the
//! importer's own fragments. A directory import loads every `.json`,
//! `.yaml` and `.yml` file beneath it in file name order.

mod error;
mod format;
mod loader;
mod source;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{PROJECT_FILENAME, PROJECT_VERSION};
use crate::fragment::{Fragment, FragmentDoc};
use crate::matrix::{PlatformMap, expand_with_schema};
use crate::option::{OptionDecl, Schema};
use crate::platform::{PlatformError, PlatformId, PlatformSet, select_platforms};

pub use error::{ParseError, SourceError};
pub use format::Format;
pub use source::{FileSource, FragmentSource, StaticSource};

use loader::{Loader, canonical, read_document};

/// Serialized project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
  pub version: u32,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub platforms: Option<Vec<String>>,

  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub options: BTreeMap<String, OptionDecl>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub imports: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub fragments: Vec<FragmentDoc>,
}

// Read before the full document so a newer file reports its version rather
// than an unknown field.
#[derive(Deserialize)]
struct VersionProbe {
  version: u32,
}

/// A loaded project: platform list, option declarations and the ordered
/// fragment list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
  path: Option<PathBuf>,
  platforms: Option<PlatformSet>,
  schema: Schema,
  fragments: Vec<Fragment>,
  /// Canonical paths of every file read so far, the project file included.
  loaded: HashSet<PathBuf>,
}

impl Project {
  /// An in-memory project with no file behind it.
  pub fn new(fragments: Vec<Fragment>, schema: Schema) -> Self {
    Self {
      path: None,
      platforms: None,
      schema,
      fragments,
      loaded: HashSet::new(),
    }
  }

  /// Load a project file. A directory is looked up for `devmatrix.json`.
  pub fn load(path: &Path) -> Result<Self, SourceError> {
    let path = if path.is_dir() {
      path.join(PROJECT_FILENAME)
    } else {
      path.to_path_buf()
    };
    let path = canonical(&path)?;

    let probe: VersionProbe = read_document(&path)?;
    if probe.version != PROJECT_VERSION {
      return Err(SourceError::UnsupportedVersion {
        path,
        found: probe.version,
      });
    }
    let file: ProjectFile = read_document(&path)?;

    let platforms = file
      .platforms
      .map(|tokens| tokens.into_iter().map(PlatformId::new).collect::<Result<PlatformSet, _>>())
      .transpose()
      .map_err(|source| SourceError::Platform {
        path: path.clone(),
        source,
      })?;

    let schema = Schema::from_decls(file.options).map_err(|source| SourceError::Schema {
      path: path.clone(),
      source,
    })?;

    let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let mut loader = Loader::new();
    loader.enter_root(&path)?;
    for spec in &file.imports {
      loader.import(&base, spec)?;
    }
    for doc in file.fragments {
      loader.load_doc(doc, &base, &path)?;
    }
    let (fragments, loaded) = loader.into_parts();

    info!(
      path = %path.display(),
      fragments = fragments.len(),
      options = schema.len(),
      "project loaded"
    );

    Ok(Self {
      path: Some(path),
      platforms,
      schema,
      fragments,
      loaded,
    })
  }

  /// Append fragments from another source after the project's own.
  ///
  /// The source loads on its own; a [`FileSource`] naming a file the project
  /// already imported contributes it a second time. Use [`Project::load_files`]
  /// for files that should share the project's import bookkeeping.
  pub fn extend_from(&mut self, source: &impl FragmentSource) -> Result<usize, SourceError> {
    let fragments = source.load()?;
    let added = fragments.len();
    self.fragments.extend(fragments);
    Ok(added)
  }

  /// Load extra fragment files or directories after the project's own
  /// fragments. Files already loaded by the project, or by an earlier call,
  /// are skipped. Returns the number of fragments added.
  pub fn load_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize, SourceError> {
    let mut loader = Loader::with_loaded(self.loaded.clone());
    for path in paths {
      loader.load_path(path.as_ref())?;
    }
    let (fragments, loaded) = loader.into_parts();
    self.loaded = loaded;
    let added = fragments.len();
    self.fragments.extend(fragments);
    Ok(added)
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  /// Platforms named by the project file, if any.
  pub fn platforms(&self) -> Option<&PlatformSet> {
    self.platforms.as_ref()
  }

  pub fn schema(&self) -> &Schema {
    &self.schema
  }

  pub fn fragments(&self) -> &[Fragment] {
    &self.fragments
  }

  /// Platform set for a run: `explicit`, else the environment, else the
  /// project file, else the defaults.
  pub fn select_platforms(&self, explicit: &[String]) -> Result<PlatformSet, PlatformError> {
    select_platforms(explicit, self.platforms.as_ref())
  }

  pub fn expand(&self, platforms: &PlatformSet) -> PlatformMap {
    expand_with_schema(platforms, &self.fragments, &self.schema)
  }
}
