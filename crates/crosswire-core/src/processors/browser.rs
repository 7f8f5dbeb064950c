//! browser.* command processor.

use std::sync::Arc;

use crosswire_bidi::browser as bidi_browser;
use crosswire_bidi::{BidiError, Command, ErrorCode};
use crosswire_cdp::protocol::target as cdp_target;
use crosswire_cdp::CdpMux;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::config::ContextConfigStorage;
use crate::context::DEFAULT_USER_CONTEXT;
use crate::error::{cdp_to_bidi, Result};

use super::{empty_result, parse_params, unknown_operation};

/// Handles browser.* commands.
pub struct BrowserProcessor {
    mux: Arc<CdpMux>,
    configs: Arc<ContextConfigStorage>,
    shutdown: mpsc::UnboundedSender<()>,
}

impl BrowserProcessor {
    /// New processor.
    pub fn new(
        mux: Arc<CdpMux>,
        configs: Arc<ContextConfigStorage>,
        shutdown: mpsc::UnboundedSender<()>,
    ) -> Self {
        Self {
            mux,
            configs,
            shutdown,
        }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        let root = self.mux.session(None);
        match operation {
            "close" => {
                root.send_raw("Browser.close", None).await.map_err(|err| {
                    BidiError::new(ErrorCode::UnableToCloseBrowser, err.to_string())
                })?;
                let _ = self.shutdown.send(());
                Ok(empty_result())
            }
            "createUserContext" => {
                let result: cdp_target::CreateBrowserContextResult = root
                    .send_command(
                        "Target.createBrowserContext",
                        Some(cdp_target::CreateBrowserContextParams::default()),
                    )
                    .await
                    .map_err(|e| cdp_to_bidi(&e))?;
                Ok(serde_json::to_value(bidi_browser::UserContextInfo {
                    user_context: result.browser_context_id,
                })
                .unwrap_or(Value::Null))
            }
            "removeUserContext" => {
                let params: bidi_browser::RemoveUserContextParams = parse_params(&command)?;
                if params.user_context == DEFAULT_USER_CONTEXT {
                    return Err(BidiError::invalid_argument(
                        "the default user context cannot be removed",
                    ));
                }
                root.send_command::<_, Value>(
                    "Target.disposeBrowserContext",
                    Some(cdp_target::DisposeBrowserContextParams {
                        browser_context_id: params.user_context.clone(),
                    }),
                )
                .await
                .map_err(|err| match err {
                    err if err.is_protocol() => BidiError::new(
                        ErrorCode::NoSuchUserContext,
                        format!("user context {} not found", params.user_context),
                    ),
                    err => cdp_to_bidi(&err),
                })?;
                self.configs.remove_user_context(&params.user_context).await;
                Ok(empty_result())
            }
            "getUserContexts" => {
                let result: cdp_target::GetBrowserContextsResult = root
                    .send_command::<Option<Value>, _>("Target.getBrowserContexts", None)
                    .await
                    .map_err(|e| cdp_to_bidi(&e))?;
                let mut user_contexts = vec![bidi_browser::UserContextInfo {
                    user_context: DEFAULT_USER_CONTEXT.to_string(),
                }];
                user_contexts.extend(result.browser_context_ids.into_iter().map(|id| {
                    bidi_browser::UserContextInfo { user_context: id }
                }));
                Ok(
                    serde_json::to_value(bidi_browser::GetUserContextsResult { user_contexts })
                        .unwrap_or(Value::Null),
                )
            }
            other => Err(unknown_operation("browser", other)),
        }
    }
}
