//! CLI commands

pub mod lifecycle;
pub mod types;
pub mod validate;

pub use lifecycle::{Action, LifecycleCommand};
pub use types::TypesCommand;
pub use validate::ValidateCommand;
