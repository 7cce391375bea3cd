//! Fragments: named, ordered bundles of option assignments.
//!
//! A fragment is immutable once built. Besides explicit assignments it may
//! carry intent metadata (`enables`) and a platform filter.

mod document;

use thiserror::Error;

use crate::option::{OptionPath, OptionValue, Priority, PriorityParseError, ValidationError, ValueError};
use crate::platform::{PlatformError, PlatformId, PlatformSet};

pub use document::{FragmentDoc, PRIORITY_KEY, VALUE_KEY};

/// Errors raised while building a fragment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FragmentError {
  #[error("fragment name must not be empty")]
  EmptyName,

  #[error("fragment '{fragment}': {source}")]
  Path {
    fragment: String,
    #[source]
    source: ValidationError,
  },

  #[error("fragment '{fragment}': invalid value at '{path}': {source}")]
  Value {
    fragment: String,
    path: String,
    #[source]
    source: ValueError,
  },

  #[error("fragment '{fragment}': invalid priority at '{path}': {source}")]
  Priority {
    fragment: String,
    path: String,
    #[source]
    source: PriorityParseError,
  },

  #[error("fragment '{fragment}': malformed priority wrapper at '{path}': {message}")]
  Wrapper {
    fragment: String,
    path: String,
    message: String,
  },

  #[error("fragment '{fragment}': {source}")]
  Platform {
    fragment: String,
    #[source]
    source: PlatformError,
  },
}

/// What a fragment says about one option path.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
  Set(OptionValue),
  /// Explicitly absent: removes every earlier contribution at the path.
  Unset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
  pub path: OptionPath,
  pub definition: Definition,
  pub priority: Priority,
}

impl Assignment {
  pub fn set(path: OptionPath, value: OptionValue) -> Self {
    Self {
      path,
      definition: Definition::Set(value),
      priority: Priority::DEFAULT,
    }
  }

  pub fn unset(path: OptionPath) -> Self {
    Self {
      path,
      definition: Definition::Unset,
      priority: Priority::DEFAULT,
    }
  }

  pub fn with_priority(mut self, priority: Priority) -> Self {
    self.priority = priority;
    self
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
  name: String,
  description: Option<String>,
  enables: Vec<OptionPath>,
  platforms: Option<PlatformSet>,
  implied: Vec<Assignment>,
  assignments: Vec<Assignment>,
}

impl Fragment {
  pub fn builder(name: impl Into<String>) -> FragmentBuilder {
    FragmentBuilder::new(name)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }

  /// Capabilities this fragment declares enabled.
  pub fn enables(&self) -> &[OptionPath] {
    &self.enables
  }

  pub fn platforms(&self) -> Option<&PlatformSet> {
    self.platforms.as_ref()
  }

  /// Explicit assignments, in declaration order.
  pub fn assignments(&self) -> &[Assignment] {
    &self.assignments
  }

  /// Whether this fragment takes part in the merge for `platform`.
  pub fn applies_to(&self, platform: &PlatformId) -> bool {
    self.platforms.as_ref().is_none_or(|set| set.contains(platform))
  }

  /// Everything the merge engine applies, in order: one `<capability>.enable = true`
  /// per enabled capability, then the explicit assignments.
  pub fn definitions(&self) -> impl Iterator<Item = &Assignment> {
    self.implied.iter().chain(self.assignments.iter())
  }
}

enum PendingPath {
  Raw(String),
  Parsed(OptionPath),
}

/// Builder for [`Fragment`]. Paths given as strings are validated in [`FragmentBuilder::build`].
pub struct FragmentBuilder {
  name: String,
  description: Option<String>,
  enables: Vec<String>,
  platforms: Option<Vec<String>>,
  pending: Vec<(PendingPath, Definition, Priority)>,
}

impl FragmentBuilder {
  fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      description: None,
      enables: Vec::new(),
      platforms: None,
      pending: Vec::new(),
    }
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn enables(mut self, capability: impl Into<String>) -> Self {
    self.enables.push(capability.into());
    self
  }

  /// Restrict the fragment to the given platforms.
  pub fn only_on<I, S>(mut self, platforms: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self
      .platforms
      .get_or_insert_with(Vec::new)
      .extend(platforms.into_iter().map(Into::into));
    self
  }

  pub fn set(self, path: &str, value: impl Into<OptionValue>) -> Self {
    self.set_with_priority(path, value, Priority::DEFAULT)
  }

  pub fn set_with_priority(mut self, path: &str, value: impl Into<OptionValue>, priority: Priority) -> Self {
    self
      .pending
      .push((PendingPath::Raw(path.to_string()), Definition::Set(value.into()), priority));
    self
  }

  pub fn force(self, path: &str, value: impl Into<OptionValue>) -> Self {
    self.set_with_priority(path, value, Priority::FORCE)
  }

  pub fn unset(mut self, path: &str) -> Self {
    self
      .pending
      .push((PendingPath::Raw(path.to_string()), Definition::Unset, Priority::DEFAULT));
    self
  }

  /// Append an already-validated assignment.
  pub fn assign(mut self, assignment: Assignment) -> Self {
    self.pending.push((
      PendingPath::Parsed(assignment.path),
      assignment.definition,
      assignment.priority,
    ));
    self
  }

  pub fn build(self) -> Result<Fragment, FragmentError> {
    if self.name.trim().is_empty() {
      return Err(FragmentError::EmptyName);
    }
    let name = self.name;
    let path_error = |source| FragmentError::Path {
      fragment: name.clone(),
      source,
    };

    let enables = self
      .enables
      .iter()
      .map(|capability| OptionPath::parse(capability))
      .collect::<Result<Vec<_>, _>>()
      .map_err(path_error)?;
    let implied = enables
      .iter()
      .map(|capability| {
        capability
          .child("enable")
          .map(|path| Assignment::set(path, OptionValue::from(true)))
      })
      .collect::<Result<Vec<_>, _>>()
      .map_err(path_error)?;

    let mut assignments = Vec::with_capacity(self.pending.len());
    for (path, definition, priority) in self.pending {
      let path = match path {
        PendingPath::Raw(raw) => OptionPath::parse(&raw).map_err(path_error)?,
        PendingPath::Parsed(path) => path,
      };
      assignments.push(Assignment {
        path,
        definition,
        priority,
      });
    }

    let platforms = self
      .platforms
      .map(|tokens| tokens.into_iter().map(PlatformId::new).collect::<Result<PlatformSet, _>>())
      .transpose()
      .map_err(|source| FragmentError::Platform {
        fragment: name.clone(),
        source,
      })?;

    Ok(Fragment {
      name,
      description: self.description,
      enables,
      platforms,
      implied,
      assignments,
    })
  }
}
