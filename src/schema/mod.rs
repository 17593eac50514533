//! Course record schema
//!
//! The fixed nine-field schema shared by every record set:
//! - numeric: Average, Pass, Fail, Audit
//! - textual: Department, ID, Instructor, Title, UUID

mod field;
mod record;

pub use field::{Field, FieldDef, FieldKind, FIELD_TABLE};
pub use record::{Record, Value};
