use std::fs;
use std::path::{Path, PathBuf};

use devmatrix_lib::fragment::{Fragment, FragmentDoc};
use devmatrix_lib::platform::{PlatformId, PlatformSet};
use serde_json::Value;

/// Build a fragment from its JSON document form.
pub fn fragment(doc: Value) -> Fragment {
  serde_json::from_value::<FragmentDoc>(doc)
    .expect("valid fragment document")
    .into_fragment()
    .expect("valid fragment")
}

pub fn platform(token: &str) -> PlatformId {
  PlatformId::new(token).expect("valid platform")
}

pub fn platforms(list: &str) -> PlatformSet {
  PlatformSet::parse_list(list).expect("valid platform list")
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).expect("create parent dirs");
  }
  fs::write(&path, content).expect("write fixture");
  path
}
