//! NSX manager credentials

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nsx_core::{ConfigError, NsxError, NsxResult, Properties, ValidationError};
use nsx_validate::{validate, FieldRule, Schema};

use crate::context::NodeContext;
use crate::properties::merge_layers;

/// Property name carrying the credentials
pub const NSX_AUTH: &str = "nsx_auth";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct NsxCredentials {
    pub username: String,
    pub password: String,
    pub host: String,
    pub insecure: bool,
    pub timeout_secs: u64,
}

impl fmt::Debug for NsxCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NsxCredentials")
            .field("username", &self.username)
            .field("password", &"********")
            .field("host", &self.host)
            .field("insecure", &self.insecure)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

pub fn credentials_schema() -> Schema {
    Schema::new()
        .field("username", FieldRule::string().required())
        .field("password", FieldRule::string().required())
        .field("host", FieldRule::string().required())
        .field("insecure", FieldRule::boolean().with_default(false))
        .field("timeout_secs", FieldRule::integer().with_default(60))
}

/// Resolve credentials from every layer
///
/// Plugin configuration defaults are overlaid by the node's `nsx_auth`, then
/// by runtime properties and finally by the call's `nsx_auth`.
pub fn nsx_credentials(
    ctx: &NodeContext,
    kwargs: &Properties,
    defaults: &Properties,
) -> NsxResult<NsxCredentials> {
    let defaults = Value::Object(defaults.clone());
    let merged = merge_layers(
        NSX_AUTH,
        &[
            Some(&defaults),
            ctx.properties.get(NSX_AUTH),
            ctx.runtime_properties.get(NSX_AUTH),
            kwargs.get(NSX_AUTH),
        ],
    );

    let validated = validate(&merged, &credentials_schema(), false).map_err(|e| match e {
        ValidationError::MissingField { path } => {
            NsxError::Configuration(ConfigError::MissingCredential { field: path })
        }
        other => NsxError::Validation(other),
    })?;

    Ok(serde_json::from_value(Value::Object(validated))?)
}
