//! NSX plugin configuration
//!
//! Node context handed over by the orchestration engine, the layering of
//! node, runtime and call-time properties, NSX credentials and the plugin
//! configuration file.

pub mod context;
pub mod credentials;
pub mod plugin_config;
pub mod properties;

pub use context::{NodeContext, RESOURCE_ID, USE_EXTERNAL_RESOURCE};
pub use credentials::{credentials_schema, nsx_credentials, NsxCredentials, NSX_AUTH};
pub use plugin_config::PluginConfig;
pub use properties::{
    external_resource_id, get_properties, get_properties_and_validate, get_properties_update,
    mask_secrets, remove_properties, use_external_resource, PropertiesUpdate,
};
