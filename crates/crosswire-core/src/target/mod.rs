//! Per-target façade.
//!
//! One [`CdpTarget`] per attached CDP session owns that session's domain
//! bookkeeping: the enable batch run at attach time, the applied context
//! configuration, preload script installs, and the current Fetch
//! interception pattern set. All CDP writes for these concerns go
//! through here, so each setting has exactly one writer.

pub mod manager;

use std::sync::Arc;

use crosswire_bidi::BidiError;
use crosswire_cdp::protocol::{emulation, fetch, network, page};
use crosswire_cdp::{CdpError, CdpSession};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ContextConfig;
use crate::error::cdp_to_bidi;
use crate::script::PreloadScriptStorage;

/// A CDP session attached to one target.
#[derive(Debug)]
pub struct CdpTarget {
    /// Target id.
    pub target_id: String,
    /// Flat session id.
    pub session_id: String,
    /// Browser context the target lives in, when reported.
    pub browser_context_id: Option<String>,
    /// Browsing context bound to this target (page and iframe targets).
    pub context_id: Option<String>,
    session: CdpSession,
    fetch_state: Mutex<Option<fetch::EnableParams>>,
}

impl CdpTarget {
    /// New target over its session view.
    pub fn new(
        target_id: String,
        session_id: String,
        browser_context_id: Option<String>,
        context_id: Option<String>,
        session: CdpSession,
    ) -> Arc<Self> {
        Arc::new(Self {
            target_id,
            session_id,
            browser_context_id,
            context_id,
            session,
            fetch_state: Mutex::new(None),
        })
    }

    /// The session view for this target.
    pub fn session(&self) -> &CdpSession {
        &self.session
    }

    /// The user context this target belongs to.
    pub fn user_context(&self) -> &str {
        self.browser_context_id
            .as_deref()
            .unwrap_or(crate::context::DEFAULT_USER_CONTEXT)
    }

    /// Run the bounded attach-time enable batch.
    ///
    /// Order matters only at the ends: domains first, the debugger
    /// release last, so nothing runs before the target is instrumented.
    ///
    /// # Errors
    ///
    /// Any failing step fails the whole batch; the caller closes the
    /// target and marks its context failed.
    pub async fn init(
        &self,
        config: &ContextConfig,
        preloads: &PreloadScriptStorage,
        top_level_context: &str,
        fetch_params: Option<fetch::EnableParams>,
    ) -> Result<(), CdpError> {
        self.send_void("Runtime.enable", None).await?;
        self.send_void("Page.enable", None).await?;
        self.session
            .send_command::<_, Value>(
                "Page.setLifecycleEventsEnabled",
                Some(page::SetLifecycleEventsEnabledParams { enabled: true }),
            )
            .await?;
        self.send_void("Network.enable", None).await?;
        self.send_void("Log.enable", None).await?;

        self.apply_config(config).await?;
        self.install_preload_scripts(preloads, top_level_context).await?;
        if let Err(err) = self.reconcile_fetch(fetch_params).await {
            return Err(CdpError::SendFailed(err.message));
        }

        self.send_void("Runtime.runIfWaitingForDebugger", None).await?;
        debug!(target = %self.target_id, session = %self.session_id, "target initialized");
        Ok(())
    }

    /// Apply the effective context configuration.
    pub async fn apply_config(&self, config: &ContextConfig) -> Result<(), CdpError> {
        self.session
            .send_command::<_, Value>(
                "Network.setCacheDisabled",
                Some(network::SetCacheDisabledParams {
                    cache_disabled: config.cache_bypass.unwrap_or(false),
                }),
            )
            .await?;
        if let Some(user_agent) = &config.user_agent {
            self.session
                .send_command::<_, Value>(
                    "Network.setUserAgentOverride",
                    Some(network::SetUserAgentOverrideParams {
                        user_agent: user_agent.clone(),
                        accept_language: None,
                        platform: None,
                    }),
                )
                .await?;
        }
        self.apply_viewport(config).await?;
        Ok(())
    }

    /// Apply (or clear) the viewport override from the config.
    pub async fn apply_viewport(&self, config: &ContextConfig) -> Result<(), CdpError> {
        match (&config.viewport, config.device_pixel_ratio) {
            (Some(Some(viewport)), dpr) => {
                self.session
                    .send_command::<_, Value>(
                        "Emulation.setDeviceMetricsOverride",
                        Some(emulation::SetDeviceMetricsOverrideParams {
                            width: viewport.width,
                            height: viewport.height,
                            device_scale_factor: dpr.flatten().unwrap_or(0.0),
                            mobile: false,
                        }),
                    )
                    .await?;
            }
            (Some(None), _) => {
                self.session
                    .send_command::<_, Value>(
                        "Emulation.clearDeviceMetricsOverride",
                        Some(emulation::ClearDeviceMetricsOverrideParams {}),
                    )
                    .await?;
            }
            (None, _) => {}
        }
        Ok(())
    }

    /// Install every qualifying preload script not yet on this target.
    pub async fn install_preload_scripts(
        &self,
        preloads: &PreloadScriptStorage,
        top_level_context: &str,
    ) -> Result<(), CdpError> {
        let pending = preloads
            .pending_for_target(&self.target_id, top_level_context, self.user_context())
            .await;
        for script in pending {
            let result: page::AddScriptToEvaluateOnNewDocumentResult = self
                .session
                .send_command(
                    "Page.addScriptToEvaluateOnNewDocument",
                    Some(page::AddScriptToEvaluateOnNewDocumentParams {
                        source: script.source(),
                        world_name: script.sandbox.clone(),
                        run_immediately: Some(true),
                    }),
                )
                .await?;
            preloads
                .mark_installed(&script.id, &self.target_id, result.identifier)
                .await;
        }
        Ok(())
    }

    /// Remove one installed preload script from this target.
    pub async fn uninstall_preload_script(&self, cdp_identifier: &str) {
        let result = self
            .session
            .send_command::<_, Value>(
                "Page.removeScriptToEvaluateOnNewDocument",
                Some(page::RemoveScriptToEvaluateOnNewDocumentParams {
                    identifier: cdp_identifier.to_string(),
                }),
            )
            .await;
        if let Err(err) = result {
            // The document may already be gone; nothing to roll back.
            debug!(target = %self.target_id, error = %err, "preload uninstall skipped");
        }
    }

    /// Bring the Fetch domain in line with the wanted pattern set.
    ///
    /// `None` disables the domain. On failure the previous set is kept
    /// and the change surfaces as `unknown error`.
    pub async fn reconcile_fetch(
        &self,
        wanted: Option<fetch::EnableParams>,
    ) -> Result<(), BidiError> {
        let mut state = self.fetch_state.lock().await;
        if *state == wanted {
            return Ok(());
        }
        let result = match &wanted {
            Some(params) => {
                self.session
                    .send_command::<_, Value>("Fetch.enable", Some(params.clone()))
                    .await
            }
            None => self.session.send_raw("Fetch.disable", None).await,
        };
        match result {
            Ok(_) => {
                debug!(target = %self.target_id, enabled = wanted.is_some(), "fetch reconciled");
                *state = wanted;
                Ok(())
            }
            Err(err) => {
                warn!(target = %self.target_id, error = %err,
                    "fetch reconciliation failed, keeping previous pattern set");
                Err(cdp_to_bidi(&err))
            }
        }
    }

    /// The currently applied Fetch pattern set, for tests and
    /// diagnostics.
    pub async fn fetch_state(&self) -> Option<fetch::EnableParams> {
        self.fetch_state.lock().await.clone()
    }

    async fn send_void(&self, method: &str, params: Option<Value>) -> Result<(), CdpError> {
        self.session.send_raw(method, params).await.map(|_| ())
    }
}
