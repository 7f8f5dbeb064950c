//! permissions.* command processor.

use std::sync::Arc;

use crosswire_bidi::permissions as bidi_permissions;
use crosswire_bidi::{BidiError, Command, ErrorCode};
use crosswire_cdp::protocol::browser as cdp_browser;
use crosswire_cdp::CdpMux;
use serde_json::Value;

use crate::context::DEFAULT_USER_CONTEXT;
use crate::error::Result;

use super::{empty_result, parse_params, unknown_operation};

/// Handles permissions.* commands.
pub struct PermissionsProcessor {
    mux: Arc<CdpMux>,
}

impl PermissionsProcessor {
    /// New processor.
    pub fn new(mux: Arc<CdpMux>) -> Self {
        Self { mux }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "setPermission" => {
                let params: bidi_permissions::SetPermissionParams = parse_params(&command)?;
                let browser_context_id = params
                    .user_context
                    .as_deref()
                    .filter(|uc| *uc != DEFAULT_USER_CONTEXT)
                    .map(ToString::to_string);
                let root = self.mux.session(None);
                root.send_command::<_, Value>(
                    "Browser.setPermission",
                    Some(cdp_browser::SetPermissionParams {
                        permission: cdp_browser::PermissionDescriptor {
                            name: params.descriptor.name.clone(),
                            sysex: None,
                            user_visible_only: None,
                            allow_without_sanitization: None,
                        },
                        setting: params.state.as_cdp().to_string(),
                        origin: Some(params.origin.clone()),
                        browser_context_id,
                    }),
                )
                .await
                .map_err(|err| BidiError::new(ErrorCode::InvalidArgument, err.to_string()))?;
                Ok(empty_result())
            }
            other => Err(unknown_operation("permissions", other)),
        }
    }
}
