//! NSX plugin CLI
//!
//! Runs the lifecycle operations of NSX node types against a node context
//! kept in a JSON file, the way an orchestrator would between workflow
//! steps.

pub mod commands;
pub mod input;
