//! Session factory

use log::info;

use nsx_config::{nsx_credentials, NodeContext, NsxCredentials, PluginConfig};
use nsx_core::{NsxResult, Properties};

use crate::rest::RestSession;

/// Open a REST session for the given credentials
pub fn nsx_login(credentials: &NsxCredentials) -> NsxResult<RestSession> {
    info!(
        "Connecting to NSX manager {} as {}",
        credentials.host, credentials.username
    );
    RestSession::new(credentials)
}

/// Open a session with credentials layered from configuration, node and call
pub fn nsx_login_from_context(
    ctx: &NodeContext,
    kwargs: &Properties,
    config: &PluginConfig,
) -> NsxResult<RestSession> {
    let credentials = nsx_credentials(ctx, kwargs, &config.nsx_auth)?;
    nsx_login(&credentials)
}
