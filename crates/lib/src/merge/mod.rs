//! The merge engine.
//!
//! Fragments are applied in order, each definition in turn, in a single
//! pass over an in-memory tree:
//!
//! - scalars: the strongest priority wins, ties go to the later fragment
//! - lists: contributions are concatenated, ordered by priority and then by
//!   fragment order (or replaced, for options declared `merge: replace`)
//! - records: merged field by field, recursively
//! - unset: removes everything defined so far at the path
//!
//! A path must keep one shape across fragments; a list meeting a scalar is a
//! conflict, not a coercion. Declared defaults fill whatever is still vacant
//! once every fragment has been applied, except beneath paths a fragment
//! explicitly unset.

mod error;
mod resolved;
mod tree;

use tracing::debug;

use crate::consts::DEFAULT_ORIGIN;
use crate::fragment::Fragment;
use crate::option::Schema;

pub use error::{ConflictKind, ErrorKind, MergeError};
pub use resolved::ResolvedConfig;

use tree::MergeTree;

/// Merge fragments in order with no option declarations.
pub fn merge<'a, I>(fragments: I) -> Result<ResolvedConfig, MergeError>
where
  I: IntoIterator<Item = &'a Fragment>,
{
  merge_with_schema(fragments, &Schema::default())
}

/// Merge fragments in order, checking declared types and applying declared
/// list strategies, strictness and defaults.
pub fn merge_with_schema<'a, I>(fragments: I, schema: &Schema) -> Result<ResolvedConfig, MergeError>
where
  I: IntoIterator<Item = &'a Fragment>,
{
  let mut tree = MergeTree::default();
  let mut applied = 0usize;
  for fragment in fragments {
    debug!(fragment = fragment.name(), "applying fragment");
    for assignment in fragment.definitions() {
      tree.apply(assignment, fragment.name(), schema)?;
    }
    applied += 1;
  }
  tree.apply_defaults(schema, DEFAULT_ORIGIN)?;
  let resolved = tree.freeze();
  debug!(fragments = applied, options = resolved.values().len(), "merge complete");
  Ok(resolved)
}
