//! NSX plugin property validation
//!
//! Declarative per-field rules (required, default, type, enum, nested
//! structure) and the recursive engine applying them to a property tree.

pub mod engine;
pub mod schema;

pub use engine::validate;
pub use schema::{FieldKind, FieldRule, Schema};
