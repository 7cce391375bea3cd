mod eval;
mod info;
mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use devmatrix_lib::project::Project;
use tracing::debug;

pub use eval::cmd_eval;
pub use info::cmd_info;
pub use show::cmd_show;

/// Load the project file, then append any extra fragment files given on the
/// command line. Files the project already imports are not loaded twice.
fn load_project(path: &Path, extra: &[PathBuf]) -> Result<Project> {
  let mut project = Project::load(path).with_context(|| format!("Failed to load project: {}", path.display()))?;
  if !extra.is_empty() {
    let added = project.load_files(extra).context("Failed to load extra fragments")?;
    debug!(added, "extra fragments appended");
  }
  Ok(project)
}
