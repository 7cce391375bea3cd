use devmatrix_lib::merge::merge_with_schema;
use devmatrix_lib::option::OptionValue;
use devmatrix_lib::project::{FileSource, FragmentSource, Project, SourceError, StaticSource};
use serde_json::json;
use tempfile::TempDir;

use super::common::{fragment, platform, platforms, write_file};

fn names(project: &Project) -> Vec<&str> {
  project.fragments().iter().map(|f| f.name()).collect()
}

#[test]
fn loads_inline_fragments_options_and_platforms() {
  let temp = TempDir::new().unwrap();
  write_file(
    temp.path(),
    "devmatrix.json",
    r#"{
      "version": 1,
      "platforms": ["x86_64-linux", "aarch64-darwin"],
      "options": { "packages": { "type": "list" } },
      "fragments": [
        { "name": "base", "config": { "packages": ["git"] } },
        { "name": "python", "enables": ["languages.python"], "config": { "packages": ["python3"] } }
      ]
    }"#,
  );

  let project = Project::load(temp.path()).unwrap();

  assert_eq!(names(&project), vec!["base", "python"]);
  assert_eq!(project.platforms(), Some(&platforms("x86_64-linux,aarch64-darwin")));
  assert_eq!(project.schema().len(), 1);

  let map = project.expand(&project.select_platforms(&["x86_64-linux".to_string()]).unwrap());
  let resolved = map.resolved(&platform("x86_64-linux")).unwrap();
  assert_eq!(resolved.lookup("packages").map(OptionValue::to_json), Some(json!(["git", "python3"])));
}

#[test]
fn imports_come_before_the_importer_in_file_name_order() {
  let temp = TempDir::new().unwrap();
  write_file(temp.path(), "fragments/20-node.json", r#"{ "name": "node", "config": { "packages": ["nodejs"] } }"#);
  write_file(
    temp.path(),
    "fragments/10-python.yaml",
    "name: python\nimports: [../shared/base.json]\nconfig:\n  packages: [python3]\n",
  );
  write_file(temp.path(), "fragments/notes.txt", "ignored");
  write_file(temp.path(), "shared/base.json", r#"{ "name": "base", "config": { "packages": ["git"] } }"#);
  let project_file = write_file(
    temp.path(),
    "devmatrix.json",
    r#"{
      "version": 1,
      "imports": ["shared/base.json", "fragments"],
      "fragments": [{ "name": "local", "config": { "packages": ["jq"] } }]
    }"#,
  );

  let project = Project::load(&project_file).unwrap();

  // base is imported twice but loaded once, at its first position
  assert_eq!(names(&project), vec!["base", "python", "node", "local"]);
  let resolved = merge_with_schema(project.fragments(), project.schema()).unwrap();
  assert_eq!(
    resolved.lookup("packages").map(OptionValue::to_json),
    Some(json!(["git", "python3", "nodejs", "jq"]))
  );
}

#[test]
fn import_cycles_are_reported() {
  let temp = TempDir::new().unwrap();
  write_file(temp.path(), "a.json", r#"{ "name": "a", "imports": ["b.json"], "config": {} }"#);
  write_file(temp.path(), "b.json", r#"{ "name": "b", "imports": ["a.json"], "config": {} }"#);
  write_file(temp.path(), "devmatrix.json", r#"{ "version": 1, "imports": ["a.json"] }"#);

  let err = Project::load(temp.path()).unwrap_err();
  match err {
    SourceError::ImportCycle { chain } => {
      let files: Vec<_> = chain
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
      assert_eq!(files, vec!["a.json", "b.json", "a.json"]);
    }
    other => panic!("expected an import cycle, got {other}"),
  }
}

#[test]
fn unsupported_version_is_rejected() {
  let temp = TempDir::new().unwrap();
  write_file(temp.path(), "devmatrix.json", r#"{ "version": 2, "somethingNew": true }"#);

  let err = Project::load(temp.path()).unwrap_err();
  assert!(matches!(err, SourceError::UnsupportedVersion { found: 2, .. }), "{err}");
}

#[test]
fn malformed_inputs_map_to_source_errors() {
  let temp = TempDir::new().unwrap();

  let missing = Project::load(&temp.path().join("nope.json")).unwrap_err();
  assert!(matches!(missing, SourceError::Read { .. }));

  let toml = write_file(temp.path(), "project.toml", "version = 1");
  assert!(matches!(
    Project::load(&toml).unwrap_err(),
    SourceError::UnsupportedFormat { .. }
  ));

  let bad_json = write_file(temp.path(), "broken.json", "{ version: 1");
  assert!(matches!(Project::load(&bad_json).unwrap_err(), SourceError::Parse { .. }));

  let bad_platform = write_file(temp.path(), "platform.json", r#"{ "version": 1, "platforms": ["x86 64"] }"#);
  assert!(matches!(
    Project::load(&bad_platform).unwrap_err(),
    SourceError::Platform { .. }
  ));

  let bad_default = write_file(
    temp.path(),
    "schema.json",
    r#"{ "version": 1, "options": { "packages": { "type": "list", "default": "git" } } }"#,
  );
  assert!(matches!(Project::load(&bad_default).unwrap_err(), SourceError::Schema { .. }));

  let bad_path = write_file(
    temp.path(),
    "path.json",
    r#"{ "version": 1, "fragments": [{ "name": "x", "config": { "9lives": true } }] }"#,
  );
  assert!(matches!(Project::load(&bad_path).unwrap_err(), SourceError::Fragment { .. }));
}

#[test]
fn file_and_static_sources_extend_a_project() {
  let temp = TempDir::new().unwrap();
  write_file(temp.path(), "devmatrix.json", r#"{ "version": 1, "fragments": [{ "name": "base", "config": {} }] }"#);
  let extra = write_file(temp.path(), "extra/ci.yml", "name: ci\nconfig:\n  enterTest: make test\n");

  let mut project = Project::load(temp.path()).unwrap();
  assert_eq!(project.extend_from(&FileSource::new(&extra)).unwrap(), 1);
  let added = StaticSource::from(vec![fragment(json!({ "name": "inline", "config": {} }))]);
  assert_eq!(project.extend_from(&added).unwrap(), 1);

  assert_eq!(names(&project), vec!["base", "ci", "inline"]);
  assert_eq!(FileSource::new(temp.path().join("extra")).load().unwrap().len(), 1);
}

#[test]
fn extra_files_already_imported_by_the_project_load_once() {
  let temp = TempDir::new().unwrap();
  write_file(temp.path(), "devmatrix.json", r#"{ "version": 1, "imports": ["fragments/tools.json"] }"#);
  let tools = write_file(
    temp.path(),
    "fragments/tools.json",
    r#"{ "name": "tools", "config": { "packages": ["ripgrep"] } }"#,
  );
  let ci = write_file(temp.path(), "ci.json", r#"{ "name": "ci", "config": { "packages": ["make"] } }"#);

  let mut project = Project::load(temp.path()).unwrap();
  assert_eq!(project.load_files(&[&tools, &ci]).unwrap(), 1);
  assert_eq!(project.load_files(&[temp.path().join("ci.json")]).unwrap(), 0);
  assert_eq!(names(&project), vec!["tools", "ci"]);

  let resolved = merge_with_schema(project.fragments(), project.schema()).unwrap();
  assert_eq!(resolved.lookup("packages").map(OptionValue::to_json), Some(json!(["ripgrep", "make"])));
}

#[test]
fn failed_extra_load_leaves_the_project_unchanged() {
  let temp = TempDir::new().unwrap();
  write_file(temp.path(), "devmatrix.json", r#"{ "version": 1 }"#);
  let good = write_file(temp.path(), "good.json", r#"{ "name": "good", "config": {} }"#);

  let mut project = Project::load(temp.path()).unwrap();
  let err = project.load_files(&[good.clone(), temp.path().join("missing.json")]).unwrap_err();
  assert!(matches!(err, SourceError::Read { .. }));
  assert!(project.fragments().is_empty());
  assert_eq!(project.load_files(&[good]).unwrap(), 1);
}

#[test]
fn in_memory_project_expands_with_its_schema() {
  use devmatrix_lib::option::{OptionDecl, OptionType, Schema};

  let schema = Schema::new()
    .with("enterTest", OptionDecl::new(OptionType::String).with_default("true"))
    .unwrap();
  let project = Project::new(vec![fragment(json!({ "name": "base", "config": {} }))], schema);

  assert_eq!(project.path(), None);
  let map = project.expand(&platforms("x86_64-linux"));
  let resolved = map.resolved(&platform("x86_64-linux")).unwrap();
  assert_eq!(resolved.lookup("enterTest").map(OptionValue::to_json), Some(json!("true")));
  assert_eq!(resolved.origins(&"enterTest".parse().unwrap()), ["<default>".to_string()]);
}
