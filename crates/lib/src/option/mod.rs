//! Option model: paths, values, priorities and declarations.

mod path;
mod priority;
mod schema;
mod value;

pub use path::{OptionPath, ValidationError, validate_segment};
pub use priority::{Priority, PriorityParseError};
pub use schema::{ListMerge, OptionDecl, OptionType, Schema, SchemaError};
pub use value::{OptionValue, Scalar, Shape, ValueError};
