//! NSX plugin core
//!
//! Session contract, error taxonomy and the helpers that normalise the
//! XML-derived JSON returned by the NSX manager.

pub mod error;
pub mod normalize;
pub mod retry;
pub mod session;

pub use error::{ConfigError, NsxError, NsxResult, ValidationError};
pub use normalize::{as_list, ensure_object, lookup_path, nested_list, struct_get_list};
pub use nsx_shared_types::{Properties, ResourceId, SessionResponse, UriParameters};
pub use retry::{attempt_with_rerun, RetryPolicy};
pub use session::{check_raw_result, nsx_read, nsx_search, Session};
