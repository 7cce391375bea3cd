use devmatrix_lib::matrix::{expand, expand_with_schema};
use devmatrix_lib::merge::ErrorKind;
use devmatrix_lib::option::{OptionDecl, OptionType, OptionValue, Schema};
use proptest::prelude::*;
use serde_json::json;

use super::common::{fragment, platform, platforms};

#[test]
fn failure_on_one_platform_leaves_the_other_resolved() {
  let fragments = vec![
    fragment(json!({ "name": "base", "config": { "packages": ["git"] } })),
    fragment(json!({
      "name": "linux-only",
      "platforms": ["x86_64-linux"],
      "config": { "packages": "strace" }
    })),
  ];

  let map = expand(&platforms("x86_64-linux,aarch64-darwin"), &fragments);

  assert_eq!(map.len(), 2);
  let failure = map.error(&platform("x86_64-linux")).expect("linux fails");
  assert_eq!(failure.kind(), ErrorKind::Conflict);
  let darwin = map.resolved(&platform("aarch64-darwin")).expect("darwin resolves");
  assert_eq!(darwin.lookup("packages").map(OptionValue::to_json), Some(json!(["git"])));
}

#[test]
fn identical_inputs_give_byte_identical_configs() {
  let fragments = vec![
    fragment(json!({ "name": "a", "config": { "packages": ["git"], "env.EDITOR": "vi" } })),
    fragment(json!({ "name": "b", "enables": ["languages.go"], "config": { "packages": ["go"] } })),
  ];
  let map = expand(&platforms("x86_64-linux,aarch64-linux,x86_64-darwin,aarch64-darwin"), &fragments);

  let rendered: Vec<String> = map
    .successes()
    .map(|(_, resolved)| resolved.to_canonical_string().unwrap())
    .collect();
  assert_eq!(rendered.len(), 4);
  assert!(rendered.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn schema_applies_on_every_platform() {
  let schema = Schema::new()
    .with(
      "packages",
      OptionDecl::new(OptionType::List).describe("Packages installed into the environment"),
    )
    .unwrap()
    .with("enterShell", OptionDecl::new(OptionType::String).with_default("echo ready"))
    .unwrap();
  let fragments = vec![
    fragment(json!({ "name": "ok", "config": { "packages": ["git"] } })),
    fragment(json!({ "name": "mac-typo", "platforms": ["aarch64-darwin"], "config": { "enterShell": 1 } })),
  ];

  let map = expand_with_schema(&platforms("x86_64-linux,aarch64-darwin"), &fragments, &schema);

  let linux = map.resolved(&platform("x86_64-linux")).unwrap();
  assert_eq!(linux.lookup("enterShell").map(OptionValue::to_json), Some(json!("echo ready")));
  assert_eq!(
    map.error(&platform("aarch64-darwin")).map(|err| err.kind()),
    Some(ErrorKind::Type)
  );
}

proptest! {
  #[test]
  fn dropping_a_platform_does_not_change_another(
    extra in "[a-z]{1,6}-[a-z]{1,6}",
    packages in prop::collection::vec("[a-z]{1,6}", 0..4),
  ) {
    prop_assume!(extra != "x86_64-linux");
    let fragments = vec![
      fragment(json!({ "name": "base", "config": { "packages": packages } })),
      fragment(json!({ "name": "other", "platforms": [extra.clone()], "config": { "packages": "broken" } })),
    ];

    let both = expand(&platforms(&format!("x86_64-linux,{extra}")), &fragments);
    let alone = expand(&platforms("x86_64-linux"), &fragments);

    prop_assert_eq!(both.get(&platform("x86_64-linux")), alone.get(&platform("x86_64-linux")));
    prop_assert!(both.error(&platform(&extra)).is_some());
  }
}
