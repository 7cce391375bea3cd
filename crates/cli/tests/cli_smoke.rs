//! CLI smoke tests for devmatrix.
//!
//! Each test runs the binary against a throwaway project and checks exit
//! codes and the reported outcomes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn devmatrix_cmd(project: &TempDir) -> Command {
  let mut cmd = cargo_bin_cmd!("devmatrix");
  cmd
    .current_dir(project.path())
    .env_remove("DEVMATRIX_PLATFORMS")
    .env_remove("DEVMATRIX_LOG");
  cmd
}

fn temp_project(content: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("devmatrix.json"), content).unwrap();
  temp
}

const PYTHON_PROJECT: &str = r#"{
  "version": 1,
  "platforms": ["x86_64-linux", "aarch64-darwin"],
  "fragments": [
    { "name": "f1", "config": { "packages": ["pre-commit"], "enterShell": "echo hi" } },
    {
      "name": "f2",
      "config": {
        "packages": ["numpy", "pillow"],
        "languages.python.enable": true,
        "languages.python.version": "3.12.8"
      }
    }
  ]
}"#;

const LINUX_CONFLICT_PROJECT: &str = r#"{
  "version": 1,
  "platforms": ["x86_64-linux", "aarch64-darwin"],
  "fragments": [
    { "name": "base", "config": { "packages": ["git"] } },
    { "name": "linux-typo", "platforms": ["x86_64-linux"], "config": { "packages": "strace" } }
  ]
}"#;

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  let temp = TempDir::new().unwrap();
  devmatrix_cmd(&temp)
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn info_lists_default_platforms() {
  let temp = TempDir::new().unwrap();
  devmatrix_cmd(&temp)
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("x86_64-linux, aarch64-linux, x86_64-darwin, aarch64-darwin"));
}

// =============================================================================
// eval
// =============================================================================

#[test]
fn eval_reports_every_platform() {
  let temp = temp_project(PYTHON_PROJECT);
  devmatrix_cmd(&temp)
    .arg("eval")
    .assert()
    .success()
    .stdout(predicate::str::contains("x86_64-linux"))
    .stdout(predicate::str::contains("aarch64-darwin"))
    .stdout(predicate::str::contains("2 succeeded, 0 failed"));
}

#[test]
fn eval_platform_flag_overrides_the_project() {
  let temp = temp_project(PYTHON_PROJECT);
  devmatrix_cmd(&temp)
    .args(["eval", "-p", "riscv64-linux"])
    .assert()
    .success()
    .stdout(predicate::str::contains("riscv64-linux"))
    .stdout(predicate::str::contains("aarch64-darwin").not());
}

#[test]
fn eval_environment_overrides_the_project() {
  let temp = temp_project(PYTHON_PROJECT);
  devmatrix_cmd(&temp)
    .env("DEVMATRIX_PLATFORMS", "x86_64-freebsd")
    .args(["-o", "json", "eval"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"platform\": \"x86_64-freebsd\""))
    .stdout(predicate::str::contains("x86_64-linux").not());
}

#[test]
fn eval_fails_after_reporting_all_platforms() {
  let temp = temp_project(LINUX_CONFLICT_PROJECT);
  devmatrix_cmd(&temp)
    .arg("eval")
    .assert()
    .code(1)
    .stdout(predicate::str::contains("x86_64-linux: ConflictError"))
    .stdout(predicate::str::contains("1 succeeded, 1 failed"));
}

#[test]
fn eval_json_output_carries_error_kinds() {
  let temp = temp_project(LINUX_CONFLICT_PROJECT);
  let output = devmatrix_cmd(&temp).args(["--output", "json", "eval"]).output().unwrap();
  assert_eq!(output.status.code(), Some(1));

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["failed"], 1);
  assert_eq!(report["platforms"][0]["errorKind"], "ConflictError");
  assert_eq!(report["platforms"][1]["ok"], true);
}

#[test]
fn eval_writes_descriptors() {
  let temp = temp_project(PYTHON_PROJECT);
  devmatrix_cmd(&temp).args(["eval", "--out-dir", "out"]).assert().success();

  let descriptor = std::fs::read_to_string(temp.path().join("out/x86_64-linux/descriptor.json")).unwrap();
  let descriptor: serde_json::Value = serde_json::from_str(&descriptor).unwrap();
  assert_eq!(descriptor["packages"], serde_json::json!(["pre-commit", "numpy", "pillow"]));
  assert_eq!(descriptor["languages"]["python"]["version"], "3.12.8");
  assert_eq!(descriptor["activation"], "echo hi");
  assert!(temp.path().join("out/aarch64-darwin/config.json").exists());
}

#[test]
fn eval_with_extra_fragment_file() {
  let temp = temp_project(PYTHON_PROJECT);
  std::fs::write(
    temp.path().join("ci.yaml"),
    "name: ci\nconfig:\n  packages: 3\n",
  )
  .unwrap();
  devmatrix_cmd(&temp)
    .args(["eval", "-f", "ci.yaml"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("fragment 'ci'"));
}

#[test]
fn eval_without_project_fails() {
  let temp = TempDir::new().unwrap();
  devmatrix_cmd(&temp)
    .arg("eval")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load project"));
}

// =============================================================================
// show
// =============================================================================

#[test]
fn show_path_prints_value_and_origins() {
  let temp = temp_project(PYTHON_PROJECT);
  devmatrix_cmd(&temp)
    .args(["show", "x86_64-linux", "packages"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"numpy\""))
    .stdout(predicate::str::contains("f1, f2"));
}

#[test]
fn show_json_for_whole_config() {
  let temp = temp_project(PYTHON_PROJECT);
  let output = devmatrix_cmd(&temp)
    .args(["-o", "json", "show", "aarch64-darwin"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(config["languages"]["python"]["enable"], true);
}

#[test]
fn show_missing_path_fails() {
  let temp = temp_project(PYTHON_PROJECT);
  devmatrix_cmd(&temp)
    .args(["show", "x86_64-linux", "languages.rust"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("No value at 'languages.rust'"));
}
