use devmatrix_lib::fragment::Fragment;
use devmatrix_lib::merge::{ErrorKind, merge};
use devmatrix_lib::option::OptionValue;
use proptest::prelude::*;
use serde_json::{Value, json};

use super::common::fragment;

fn json_at(fragments: &[Fragment], path: &str) -> Option<Value> {
  merge(fragments)
    .expect("merge succeeds")
    .lookup(path)
    .map(OptionValue::to_json)
}

#[test]
fn python_environment_example() {
  let f1 = fragment(json!({ "name": "f1", "config": { "packages": ["pre-commit"] } }));
  let f2 = fragment(json!({
    "name": "f2",
    "config": {
      "packages": ["numpy", "pillow"],
      "languages.python.enable": true,
      "languages.python.version": "3.12.8"
    }
  }));

  let resolved = merge([&f1, &f2]).unwrap();
  assert_eq!(
    resolved.to_json(),
    json!({
      "languages": { "python": { "enable": true, "version": "3.12.8" } },
      "packages": ["pre-commit", "numpy", "pillow"]
    })
  );
  assert_eq!(resolved.origins_under(&"packages".parse().unwrap()).len(), 2);
}

#[test]
fn enable_after_version_keeps_the_version() {
  let declare = fragment(json!({ "name": "declare", "config": { "languages.python.version": "3.12.8" } }));
  let enable = fragment(json!({ "name": "enable", "enables": ["languages.python"], "config": {} }));

  assert_eq!(
    json_at(&[declare, enable], "languages.python"),
    Some(json!({ "enable": true, "version": "3.12.8" }))
  );
}

#[test]
fn documents_can_retract_and_force() {
  let base = fragment(json!({
    "name": "base",
    "config": { "languages": { "python": { "enable": true, "venv": { "enable": true } } } }
  }));
  let user = fragment(json!({
    "name": "user",
    "config": {
      "languages.python.venv": null,
      "languages.python.enable": { "__priority": "force", "__value": false }
    }
  }));
  let late = fragment(json!({ "name": "late", "config": { "languages.python.enable": true } }));

  assert_eq!(
    json_at(&[base, user, late], "languages.python"),
    Some(json!({ "enable": false }))
  );
}

#[test]
fn scalar_meeting_list_reports_both_fragments() {
  let tools = fragment(json!({ "name": "tools", "config": { "packages": ["git"] } }));
  let single = fragment(json!({ "name": "single", "config": { "packages": "git" } }));

  let err = merge([&tools, &single]).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  let message = err.to_string();
  assert!(message.contains("'tools'"), "{message}");
  assert!(message.contains("'single'"), "{message}");
}

fn package_list() -> impl Strategy<Value = Vec<String>> {
  prop::collection::vec("[a-z][a-z0-9-]{0,7}", 0..5)
}

fn scalar() -> impl Strategy<Value = Value> {
  prop_oneof![
    any::<bool>().prop_map(Value::from),
    any::<i32>().prop_map(Value::from),
    "[a-z0-9.]{0,6}".prop_map(Value::from),
  ]
}

/// Fragments drawing from a small pool of paths so they overlap.
fn arbitrary_fragment(index: usize) -> impl Strategy<Value = Fragment> {
  (
    package_list(),
    prop::option::of(scalar()),
    prop::option::of("[0-9]\\.[0-9]{1,2}"),
    prop::option::of(any::<bool>()),
  )
    .prop_map(move |(packages, shell, version, enable)| {
      let mut config = serde_json::Map::new();
      config.insert("packages".into(), json!(packages));
      if let Some(shell) = shell {
        config.insert("env.SHELL_FLAG".into(), shell);
      }
      if let Some(version) = version {
        config.insert("languages.python.version".into(), json!(version));
      }
      if let Some(enable) = enable {
        config.insert("languages.python.enable".into(), json!(enable));
      }
      fragment(json!({ "name": format!("f{index}"), "config": config }))
    })
}

fn fragment_list() -> impl Strategy<Value = Vec<Fragment>> {
  (0usize..6).prop_flat_map(|len| (0..len).map(arbitrary_fragment).collect::<Vec<_>>())
}

proptest! {
  #[test]
  fn merging_is_deterministic(fragments in fragment_list()) {
    let first = merge(&fragments).unwrap();
    let second = merge(&fragments).unwrap();
    prop_assert_eq!(first.to_canonical_string().unwrap(), second.to_canonical_string().unwrap());
    prop_assert_eq!(first, second);
  }

  #[test]
  fn lists_are_additive(a in package_list(), b in package_list()) {
    let fa = fragment(json!({ "name": "a", "config": { "packages": a } }));
    let fb = fragment(json!({ "name": "b", "config": { "packages": b } }));

    let expected: Vec<String> = a.iter().chain(b.iter()).cloned().collect();
    prop_assert_eq!(json_at(&[fa, fb], "packages"), Some(json!(expected)));
  }

  #[test]
  fn later_scalar_wins(a in scalar(), b in scalar()) {
    prop_assume!(a != b);
    let fa = fragment(json!({ "name": "a", "config": { "env.FLAG": a.clone() } }));
    let fb = fragment(json!({ "name": "b", "config": { "env.FLAG": b.clone() } }));

    prop_assert_eq!(json_at(&[fa.clone(), fb.clone()], "env.FLAG"), Some(b));
    prop_assert_eq!(json_at(&[fb, fa], "env.FLAG"), Some(a));
  }

  #[test]
  fn setting_one_field_keeps_siblings(version in "[0-9]\\.[0-9]{1,2}", enable in any::<bool>()) {
    let fa = fragment(json!({ "name": "a", "config": { "languages.python.version": version.clone() } }));
    let fb = fragment(json!({ "name": "b", "config": { "languages.python.enable": enable } }));

    prop_assert_eq!(
      json_at(&[fa, fb], "languages.python"),
      Some(json!({ "enable": enable, "version": version }))
    );
  }
}
