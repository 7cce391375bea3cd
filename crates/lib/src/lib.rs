//! devmatrix-lib: composable development environment configuration.
//!
//! Environments are described by ordered, named [`Fragment`]s of option
//! assignments. This crate provides:
//! - `option`: option paths, values, priorities and declarations
//! - `fragment`: fragments and their JSON/YAML documents
//! - `merge`: the deterministic, priority-aware merge engine
//! - `matrix`: per-platform expansion with failure isolation
//! - `project`: loading project files and fragment sources
//! - `emit`: environment descriptors written for downstream builders

pub mod consts;
pub mod emit;
pub mod fragment;
pub mod matrix;
pub mod merge;
pub mod option;
pub mod platform;
pub mod project;
pub mod util;

pub use fragment::{Fragment, FragmentBuilder};
pub use matrix::{PlatformMap, expand, expand_with_schema};
pub use merge::{MergeError, ResolvedConfig, merge, merge_with_schema};
pub use option::{OptionPath, OptionValue, Priority, Schema};
pub use platform::{PlatformId, PlatformSet};
pub use project::{FragmentSource, Project, SourceError};
