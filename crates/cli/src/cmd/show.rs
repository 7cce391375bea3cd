//! Implementation of the `devmatrix show` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::json;

use devmatrix_lib::matrix::evaluate_platform;
use devmatrix_lib::option::OptionPath;
use devmatrix_lib::platform::PlatformId;

use super::load_project;
use crate::output::{OutputFormat, print_json, print_stat, symbols};

pub fn cmd_show(
  project_path: &Path,
  platform: &str,
  path: Option<&str>,
  extra_fragments: &[PathBuf],
  verbose: bool,
  format: OutputFormat,
) -> Result<()> {
  let project = load_project(project_path, extra_fragments)?;
  let platform = PlatformId::new(platform).context("Invalid platform")?;
  let resolved = evaluate_platform(&platform, project.fragments(), project.schema())
    .with_context(|| format!("Failed to evaluate platform {}", platform))?;

  let Some(path) = path else {
    if format.is_json() {
      return print_json(&resolved);
    }
    println!("{}", resolved.to_pretty_string().context("Failed to serialize configuration")?);
    if verbose {
      println!();
      for (leaf, _) in resolved.leaves() {
        let origins = resolved.origins(&leaf).join(", ");
        println!("  {} {} {}", leaf, symbols::ARROW, origins);
      }
    }
    return Ok(());
  };

  let path = OptionPath::parse(path).with_context(|| format!("Invalid option path: {}", path))?;
  let Some(value) = resolved.get(&path) else {
    bail!("No value at '{}' for platform {}", path, platform);
  };
  let origins: Vec<&str> = resolved.origins_under(&path).into_iter().collect();

  if format.is_json() {
    print_json(&json!({
      "platform": platform,
      "path": path,
      "value": value,
      "origins": origins,
    }))?;
  } else {
    println!(
      "{}",
      serde_json::to_string_pretty(value).context("Failed to serialize value")?
    );
    println!();
    print_stat("Defined by", &origins.join(", "));
  }

  Ok(())
}
