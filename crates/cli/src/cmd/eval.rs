//! Implementation of the `devmatrix eval` command.
//!
//! Evaluates the project for every selected platform and reports each
//! outcome. Descriptors for successful platforms are written when an output
//! directory is given. Exits non-zero when any platform failed, but only
//! after all of them have been reported.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;

use devmatrix_lib::emit::{Descriptor, EmitError, Emitter, JsonEmitter};
use devmatrix_lib::merge::ResolvedConfig;
use devmatrix_lib::platform::PlatformId;
use devmatrix_lib::util::hash::Hashable;

use super::load_project;
use crate::output::{
  OutputFormat, print_failure, print_info, print_json, print_stat, print_success, print_warning, symbols,
  truncate_hash,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlatformReport {
  platform: PlatformId,
  ok: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  digest: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  options: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  artifacts: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error_kind: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

impl PlatformReport {
  fn failed(platform: &PlatformId, kind: &str, message: String) -> Self {
    Self {
      platform: platform.clone(),
      ok: false,
      digest: None,
      options: None,
      artifacts: None,
      error_kind: Some(kind.to_string()),
      error: Some(message),
    }
  }
}

#[derive(Debug, Serialize)]
struct EvalReport {
  fragments: usize,
  succeeded: usize,
  failed: usize,
  platforms: Vec<PlatformReport>,
}

pub fn cmd_eval(
  project_path: &Path,
  platforms: &[String],
  extra_fragments: &[PathBuf],
  out_dir: Option<&Path>,
  verbose: bool,
  format: OutputFormat,
) -> Result<ExitCode> {
  let project = load_project(project_path, extra_fragments)?;
  if project.fragments().is_empty() {
    print_warning("Project defines no fragments; every platform resolves to an empty configuration");
  }

  let platforms = project.select_platforms(platforms).context("Invalid platform list")?;
  let map = project.expand(&platforms);
  let emitter = out_dir.map(JsonEmitter::new);

  let reports: Vec<PlatformReport> = map
    .iter()
    .map(|(platform, outcome)| match outcome {
      Ok(resolved) => match report_success(platform, resolved, emitter.as_ref()) {
        Ok(report) => report,
        Err(err) => PlatformReport::failed(platform, "EmitError", err.to_string()),
      },
      Err(err) => PlatformReport::failed(platform, &err.kind().to_string(), err.to_string()),
    })
    .collect();

  let failed = reports.iter().filter(|report| !report.ok).count();
  let report = EvalReport {
    fragments: project.fragments().len(),
    succeeded: reports.len() - failed,
    failed,
    platforms: reports,
  };

  if format.is_json() {
    print_json(&report)?;
  } else {
    print_text(&report, verbose);
  }

  Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn report_success(
  platform: &PlatformId,
  resolved: &ResolvedConfig,
  emitter: Option<&JsonEmitter>,
) -> Result<PlatformReport, EmitError> {
  let digest = resolved.compute_hash().map_err(EmitError::Serialize)?;
  let artifacts = match emitter {
    Some(emitter) => {
      let descriptor = Descriptor::from_resolved(platform, resolved)?;
      Some(emitter.emit(&descriptor, resolved)?)
    }
    None => None,
  };
  Ok(PlatformReport {
    platform: platform.clone(),
    ok: true,
    digest: Some(digest.0),
    options: Some(resolved.leaves().len()),
    artifacts,
    error_kind: None,
    error: None,
  })
}

fn print_text(report: &EvalReport, verbose: bool) {
  for platform in &report.platforms {
    if platform.ok {
      let digest = platform.digest.as_deref().map(truncate_hash).unwrap_or_default();
      print_success(&format!(
        "{} {} ({} options)",
        platform.platform,
        digest,
        platform.options.unwrap_or_default()
      ));
      if let Some(dir) = &platform.artifacts {
        println!("  {} {}", symbols::ARROW, dir.display());
      }
    } else {
      print_failure(&format!(
        "{}: {}: {}",
        platform.platform,
        platform.error_kind.as_deref().unwrap_or("Error"),
        platform.error.as_deref().unwrap_or_default()
      ));
    }
  }

  if verbose {
    println!();
    print_stat("Fragments", &report.fragments.to_string());
  }
  println!();
  print_info(&format!(
    "{} platform(s) evaluated: {} succeeded, {} failed",
    report.platforms.len(),
    report.succeeded,
    report.failed
  ));
}
