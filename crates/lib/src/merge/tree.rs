//! Working tree used while a merge is in progress.
//!
//! Unlike [`OptionValue`], every leaf here remembers the priority and the
//! fragment it came from, and lists keep their contributions apart until the
//! tree is frozen into a [`ResolvedConfig`].

use std::collections::BTreeMap;

use tracing::trace;

use super::error::{ConflictKind, MergeError};
use super::resolved::ResolvedConfig;
use crate::fragment::{Assignment, Definition};
use crate::option::{ListMerge, OptionPath, OptionType, OptionValue, Priority, Scalar, Schema, Shape};

struct ScalarSlot {
  value: Scalar,
  priority: Priority,
  origin: String,
}

struct Chunk {
  priority: Priority,
  origin: String,
  items: Vec<OptionValue>,
}

enum Node {
  Scalar(ScalarSlot),
  List(Vec<Chunk>),
  Record { fields: BTreeMap<String, Node>, origin: String },
}

impl Node {
  fn shape(&self) -> Shape {
    match self {
      Node::Scalar(_) => Shape::Scalar,
      Node::List(_) => Shape::List,
      Node::Record { .. } => Shape::Record,
    }
  }

  /// Most recent fragment that touched this node.
  fn origin(&self) -> &str {
    match self {
      Node::Scalar(slot) => &slot.origin,
      Node::List(chunks) => chunks.last().map(|chunk| chunk.origin.as_str()).unwrap_or_default(),
      Node::Record { origin, .. } => origin,
    }
  }

  fn record(origin: &str) -> Self {
    Node::Record {
      fields: BTreeMap::new(),
      origin: origin.to_string(),
    }
  }
}

/// Everything a single definition needs to know while it is applied.
struct Ctx<'a> {
  schema: &'a Schema,
  fragment: &'a str,
  priority: Priority,
}

impl Ctx<'_> {
  fn check_declared(&self, path: &OptionPath, value: &OptionValue) -> Result<(), MergeError> {
    match self.schema.get(path) {
      Some(decl) if !decl.ty.accepts(value) => Err(MergeError::Type {
        path: path.clone(),
        fragment: self.fragment.to_string(),
        expected: decl.ty,
        found: value.kind().to_string(),
      }),
      _ => Ok(()),
    }
  }

  fn shape_conflict(&self, path: &OptionPath, existing: &Node, incoming: Shape) -> MergeError {
    MergeError::Conflict {
      path: path.clone(),
      kind: ConflictKind::Shape {
        existing: existing.shape(),
        existing_origin: existing.origin().to_string(),
        incoming,
        incoming_origin: self.fragment.to_string(),
      },
    }
  }

  fn priority_conflict(&self, path: &OptionPath, existing_origin: &str) -> MergeError {
    MergeError::Conflict {
      path: path.clone(),
      kind: ConflictKind::Priority {
        priority: self.priority,
        existing_origin: existing_origin.to_string(),
        incoming_origin: self.fragment.to_string(),
      },
    }
  }
}

#[derive(Default)]
pub(super) struct MergeTree {
  root: BTreeMap<String, Node>,
  /// Paths removed by an unset and not written again since. Declared
  /// defaults stay out of these subtrees.
  retracted: Vec<OptionPath>,
}

impl MergeTree {
  pub(super) fn apply(&mut self, assignment: &Assignment, fragment: &str, schema: &Schema) -> Result<(), MergeError> {
    let ctx = Ctx {
      schema,
      fragment,
      priority: assignment.priority,
    };
    let path = &assignment.path;
    let segments = path.segments();
    let (key, parents) = match segments.split_last() {
      Some(split) => split,
      None => return Ok(()),
    };

    if matches!(assignment.definition, Definition::Unset) {
      if let Some(fields) = self.existing_parent(parents) {
        if fields.remove(key).is_some() {
          trace!(path = %path, fragment, "unset");
        }
      }
      if !self.retracted.contains(path) {
        self.retracted.push(path.clone());
      }
      return Ok(());
    }
    self.retracted.retain(|retracted| !retracted.starts_with(path));

    let mut fields = &mut self.root;
    for depth in 1..=parents.len() {
      let segment = &parents[depth - 1];
      let prefix = path.prefix(depth).unwrap_or_else(|| path.clone());
      let declared = schema.get(&prefix).map(|decl| decl.ty);
      if let Some(ty) = declared.filter(|ty| !matches!(ty, OptionType::Record | OptionType::Any)) {
        return Err(MergeError::Type {
          path: prefix,
          fragment: fragment.to_string(),
          expected: ty,
          found: "record".to_string(),
        });
      }
      let node = fields.entry(segment.clone()).or_insert_with(|| Node::record(fragment));
      match node {
        Node::Record { fields: inner, origin } => {
          *origin = fragment.to_string();
          fields = inner;
        }
        other => return Err(ctx.shape_conflict(&prefix, other, Shape::Record)),
      }
    }

    if let Definition::Set(value) = &assignment.definition {
      set_at(fields, key, path, value, &ctx)?;
    }
    Ok(())
  }

  /// Fill declared defaults into paths nothing defined.
  pub(super) fn apply_defaults(&mut self, schema: &Schema, origin: &str) -> Result<(), MergeError> {
    for (path, value) in schema.defaults() {
      if !self.is_vacant(path) || self.is_retracted(path) {
        continue;
      }
      trace!(path = %path, "applying declared default");
      let assignment = Assignment::set(path.clone(), value.clone()).with_priority(Priority(u32::MAX));
      self.apply(&assignment, origin, schema)?;
    }
    Ok(())
  }

  pub(super) fn freeze(self) -> ResolvedConfig {
    let mut origins = BTreeMap::new();
    let mut values = BTreeMap::new();
    for (key, node) in self.root {
      let segments = vec![key.clone()];
      values.insert(key, freeze_node(node, &segments, &mut origins));
    }
    ResolvedConfig::new(values, origins)
  }

  fn existing_parent(&mut self, parents: &[String]) -> Option<&mut BTreeMap<String, Node>> {
    let mut fields = &mut self.root;
    for segment in parents {
      match fields.get_mut(segment) {
        Some(Node::Record { fields: inner, .. }) => fields = inner,
        _ => return None,
      }
    }
    Some(fields)
  }

  fn is_retracted(&self, path: &OptionPath) -> bool {
    self.retracted.iter().any(|retracted| path.starts_with(retracted))
  }

  /// True if nothing is defined at `path` and every existing ancestor is a record.
  fn is_vacant(&self, path: &OptionPath) -> bool {
    let mut fields = &self.root;
    let segments = path.segments();
    for (index, segment) in segments.iter().enumerate() {
      match fields.get(segment) {
        None => return true,
        Some(Node::Record { fields: inner, .. }) if index + 1 < segments.len() => fields = inner,
        Some(_) => return false,
      }
    }
    false
  }
}

fn set_at(
  fields: &mut BTreeMap<String, Node>,
  key: &str,
  path: &OptionPath,
  value: &OptionValue,
  ctx: &Ctx<'_>,
) -> Result<(), MergeError> {
  ctx.check_declared(path, value)?;

  if !fields.contains_key(key) {
    let node = match value {
      OptionValue::Scalar(scalar) => Node::Scalar(ScalarSlot {
        value: scalar.clone(),
        priority: ctx.priority,
        origin: ctx.fragment.to_string(),
      }),
      OptionValue::List(items) => Node::List(vec![Chunk {
        priority: ctx.priority,
        origin: ctx.fragment.to_string(),
        items: items.clone(),
      }]),
      OptionValue::Record(_) => Node::record(ctx.fragment),
    };
    fields.insert(key.to_string(), node);
    // Records are filled field by field below so nested declarations are checked.
    if !matches!(value, OptionValue::Record(_)) {
      return Ok(());
    }
  }

  let Some(existing) = fields.get_mut(key) else {
    return Ok(());
  };

  match (existing, value) {
    (Node::Record { fields: inner, origin }, OptionValue::Record(incoming)) => {
      *origin = ctx.fragment.to_string();
      for (field, field_value) in incoming {
        let child = path.child(field).map_err(|source| MergeError::Validation {
          fragment: ctx.fragment.to_string(),
          source,
        })?;
        set_at(inner, field, &child, field_value, ctx)?;
      }
      Ok(())
    }
    (Node::Scalar(slot), OptionValue::Scalar(incoming)) => {
      if !ctx.priority.overrides(slot.priority) {
        trace!(path = %path, fragment = ctx.fragment, "weaker scalar definition ignored");
        return Ok(());
      }
      if ctx.priority == slot.priority && ctx.schema.is_strict(path) && slot.value != *incoming {
        return Err(ctx.priority_conflict(path, &slot.origin));
      }
      slot.value = incoming.clone();
      slot.priority = ctx.priority;
      slot.origin = ctx.fragment.to_string();
      Ok(())
    }
    (Node::List(chunks), OptionValue::List(items)) => {
      let chunk = Chunk {
        priority: ctx.priority,
        origin: ctx.fragment.to_string(),
        items: items.clone(),
      };
      match ctx.schema.list_merge(path) {
        ListMerge::Append => {
          // Stable: equal priorities stay in fragment order.
          let position = chunks
            .iter()
            .position(|existing| existing.priority > chunk.priority)
            .unwrap_or(chunks.len());
          chunks.insert(position, chunk);
        }
        ListMerge::Replace => {
          let strongest = chunks.iter().map(|existing| existing.priority).min();
          if let Some(strongest) = strongest {
            if !ctx.priority.overrides(strongest) {
              trace!(path = %path, fragment = ctx.fragment, "weaker list definition ignored");
              return Ok(());
            }
            let differs = chunks.iter().any(|existing| existing.items != chunk.items);
            if ctx.priority == strongest && ctx.schema.is_strict(path) && differs {
              return Err(ctx.priority_conflict(path, chunks[0].origin.as_str()));
            }
          }
          *chunks = vec![chunk];
        }
      }
      Ok(())
    }
    (existing, incoming) => Err(ctx.shape_conflict(path, existing, incoming.shape())),
  }
}

fn freeze_node(node: Node, segments: &[String], origins: &mut BTreeMap<OptionPath, Vec<String>>) -> OptionValue {
  let leaf_origins = |origins: &mut BTreeMap<OptionPath, Vec<String>>, names: Vec<String>| {
    if let Ok(path) = OptionPath::from_segments(segments.iter().cloned()) {
      origins.insert(path, names);
    }
  };

  match node {
    Node::Scalar(slot) => {
      leaf_origins(origins, vec![slot.origin]);
      OptionValue::Scalar(slot.value)
    }
    Node::List(chunks) => {
      let mut names: Vec<String> = Vec::new();
      let mut items = Vec::new();
      for chunk in chunks {
        if !names.contains(&chunk.origin) {
          names.push(chunk.origin);
        }
        items.extend(chunk.items);
      }
      leaf_origins(origins, names);
      OptionValue::List(items)
    }
    Node::Record { fields, origin } => {
      if fields.is_empty() {
        leaf_origins(origins, vec![origin]);
      }
      let mut record = BTreeMap::new();
      for (key, child) in fields {
        let mut child_segments = segments.to_vec();
        child_segments.push(key.clone());
        record.insert(key, freeze_node(child, &child_segments, origins));
      }
      OptionValue::Record(record)
    }
  }
}
