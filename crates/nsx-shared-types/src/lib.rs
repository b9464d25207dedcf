pub mod error;
pub mod resource_id;
pub mod session;

pub use error::{SharedResult, SharedTypeError};
pub use resource_id::ResourceId;
pub use session::{SessionResponse, UriParameters};

/// Property tree of a node, as handed over by the orchestration engine
pub type Properties = serde_json::Map<String, serde_json::Value>;
