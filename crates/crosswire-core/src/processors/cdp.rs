//! cdp.* extension command processor.
//!
//! Raw CDP access for clients that need it; also reachable under the
//! `goog:cdp.*` vendor-prefixed names.

use std::sync::Arc;

use crosswire_bidi::cdp as bidi_cdp;
use crosswire_bidi::Command;
use crosswire_cdp::CdpMux;
use serde_json::Value;

use crate::context::BrowsingContextStorage;
use crate::error::{cdp_to_bidi, Result};
use crate::realm::RealmStorage;

use super::{parse_params, unknown_operation};

/// Handles cdp.* commands.
pub struct CdpProcessor {
    mux: Arc<CdpMux>,
    contexts: Arc<BrowsingContextStorage>,
    realms: Arc<RealmStorage>,
}

impl CdpProcessor {
    /// New processor.
    pub fn new(
        mux: Arc<CdpMux>,
        contexts: Arc<BrowsingContextStorage>,
        realms: Arc<RealmStorage>,
    ) -> Self {
        Self {
            mux,
            contexts,
            realms,
        }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "sendCommand" => {
                let params: bidi_cdp::SendCommandParams = parse_params(&command)?;
                let result = self
                    .mux
                    .send_raw(&params.method, params.params.clone(), params.session.as_deref())
                    .await
                    .map_err(|e| cdp_to_bidi(&e))?;
                Ok(serde_json::to_value(bidi_cdp::SendCommandResult {
                    result,
                    session: params.session.clone(),
                })
                .unwrap_or(Value::Null))
            }
            "getSession" => {
                let params: bidi_cdp::GetSessionParams = parse_params(&command)?;
                let session = self.contexts.session_of(&params.context).await?;
                Ok(serde_json::to_value(bidi_cdp::GetSessionResult { session })
                    .unwrap_or(Value::Null))
            }
            "resolveRealm" => {
                let params: bidi_cdp::ResolveRealmParams = parse_params(&command)?;
                let realm = self.realms.get(&params.realm).await?;
                Ok(serde_json::to_value(bidi_cdp::ResolveRealmResult {
                    execution_context_id: realm.execution_context_id,
                })
                .unwrap_or(Value::Null))
            }
            other => Err(unknown_operation("cdp", other)),
        }
    }
}
