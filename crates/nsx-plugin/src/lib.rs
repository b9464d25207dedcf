//! NSX plugin lifecycle operations
//!
//! Each NSX node type implements [`Lifecycle`]: validated properties go in,
//! a remote object comes out and its id is kept in the node's runtime
//! properties. [`OperationRegistry`] dispatches by node type name.

pub mod lifecycle;
pub mod nodes;
pub mod registry;

pub use lifecycle::Lifecycle;
pub use registry::OperationRegistry;

#[cfg(test)]
mod tests;
