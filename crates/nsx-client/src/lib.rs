//! NSX manager REST session
//!
//! Maps NSX resource type names to URIs and implements the core `Session`
//! contract over HTTP.

pub mod login;
pub mod resources;
pub mod rest;

pub use login::{nsx_login, nsx_login_from_context};
pub use resources::{resource, Operation, Resource, RESOURCES};
pub use rest::RestSession;
