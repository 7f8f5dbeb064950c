//! browsingContext.* command processor.

use std::sync::Arc;

use crosswire_bidi::browsing_context as bidi_bc;
use crosswire_bidi::{BidiError, Command, ErrorCode};
use crosswire_cdp::protocol::page as cdp_page;
use crosswire_cdp::protocol::target as cdp_target;
use crosswire_cdp::CdpSession;
use serde_json::Value;

use crate::clock::Clock;
use crate::config::ContextConfigStorage;
use crate::context::{BrowsingContextStorage, DEFAULT_USER_CONTEXT};
use crate::error::{cdp_to_bidi, Result};
use crate::navigation::{NavigationHandle, Readiness};
use crate::target::manager::CdpTargetManager;

use super::{empty_result, parse_params, unknown_operation};

/// Handles browsingContext.* commands.
pub struct BrowsingContextProcessor {
    contexts: Arc<BrowsingContextStorage>,
    configs: Arc<ContextConfigStorage>,
    manager: Arc<CdpTargetManager>,
}

impl BrowsingContextProcessor {
    /// New processor.
    pub fn new(
        contexts: Arc<BrowsingContextStorage>,
        configs: Arc<ContextConfigStorage>,
        manager: Arc<CdpTargetManager>,
    ) -> Self {
        Self {
            contexts,
            configs,
            manager,
        }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "create" => self.create(parse_params(&command)?).await,
            "close" => self.close(parse_params(&command)?).await,
            "activate" => self.activate(parse_params(&command)?).await,
            "getTree" => self.get_tree(parse_params(&command)?).await,
            "navigate" => self.navigate(parse_params(&command)?).await,
            "reload" => self.reload(parse_params(&command)?).await,
            "traverseHistory" => self.traverse_history(parse_params(&command)?).await,
            "handleUserPrompt" => self.handle_user_prompt(parse_params(&command)?).await,
            "captureScreenshot" => self.capture_screenshot(parse_params(&command)?).await,
            "setViewport" => self.set_viewport(parse_params(&command)?).await,
            other => Err(unknown_operation("browsingContext", other)),
        }
    }

    async fn session_for(&self, context_id: &str) -> Result<CdpSession> {
        let target = self
            .manager
            .target_for_context(context_id)
            .await
            .ok_or_else(|| BidiError::no_such_frame(context_id))?;
        Ok(target.session().clone())
    }

    async fn require_top_level(&self, context_id: &str) -> Result<()> {
        let is_top = self
            .contexts
            .with(context_id, |ctx| ctx.parent_id.is_none())
            .await?;
        if is_top {
            Ok(())
        } else {
            Err(BidiError::invalid_argument(format!(
                "context {context_id} is not top-level"
            )))
        }
    }

    async fn create(&self, params: bidi_bc::CreateParams) -> Result<Value> {
        if let Some(reference) = &params.reference_context {
            self.require_top_level(reference).await?;
        }
        let browser_context_id = match params.user_context.as_deref() {
            None | Some(DEFAULT_USER_CONTEXT) => None,
            Some(other) => Some(other.to_string()),
        };
        let root = self.manager.mux().session(None);
        let result: cdp_target::CreateTargetResult = root
            .send_command(
                "Target.createTarget",
                Some(cdp_target::CreateTargetParams {
                    url: "about:blank".to_string(),
                    browser_context_id,
                    background: Some(params.background),
                    new_window: Some(params.context_type == bidi_bc::CreateType::Window),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        // The context record materializes from the auto-attach path.
        if !self.contexts.wait_for_context(&result.target_id).await {
            return Err(BidiError::unknown(format!(
                "created target {} never attached",
                result.target_id
            )));
        }
        Ok(serde_json::to_value(bidi_bc::CreateResult {
            context: result.target_id,
        })
        .unwrap_or(Value::Null))
    }

    async fn close(&self, params: bidi_bc::CloseParams) -> Result<Value> {
        self.require_top_level(&params.context).await?;
        let root = self.manager.mux().session(None);
        root.send_command::<_, Value>(
            "Target.closeTarget",
            Some(cdp_target::CloseTargetParams {
                target_id: params.context.clone(),
            }),
        )
        .await
        .map_err(|e| cdp_to_bidi(&e))?;
        Ok(empty_result())
    }

    async fn activate(&self, params: bidi_bc::ActivateParams) -> Result<Value> {
        self.require_top_level(&params.context).await?;
        let root = self.manager.mux().session(None);
        root.send_command::<_, Value>(
            "Target.activateTarget",
            Some(cdp_target::ActivateTargetParams {
                target_id: params.context.clone(),
            }),
        )
        .await
        .map_err(|e| cdp_to_bidi(&e))?;
        Ok(empty_result())
    }

    async fn get_tree(&self, params: bidi_bc::GetTreeParams) -> Result<Value> {
        let roots = match &params.root {
            Some(root) => vec![root.clone()],
            None => self.contexts.top_level_ids().await,
        };
        let mut infos = Vec::with_capacity(roots.len());
        for root in roots {
            infos.push(self.contexts.tree_info(&root, params.max_depth, false).await?);
        }
        infos.sort_by(|a, b| a.context.cmp(&b.context));
        Ok(serde_json::to_value(bidi_bc::GetTreeResult { contexts: infos })
            .unwrap_or(Value::Null))
    }

    async fn navigate(&self, params: bidi_bc::NavigateParams) -> Result<Value> {
        let session = self.session_for(&params.context).await?;
        let handle = self
            .contexts
            .with(&params.context, |ctx| {
                ctx.navigation.start_command_navigation(&params.url)
            })
            .await?;

        let result: cdp_page::NavigateResult = session
            .send_command(
                "Page.navigate",
                Some(cdp_page::NavigateParams {
                    url: params.url.clone(),
                    referrer: None,
                    transition_type: None,
                    frame_id: Some(params.context.clone()),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        if let Some(error_text) = result.error_text {
            let now = self.manager_now();
            let emissions = self
                .contexts
                .with(&params.context, |ctx| {
                    ctx.navigation.fail_navigation(&handle.id, &error_text, now)
                })
                .await
                .unwrap_or_default();
            self.emit(emissions).await;
            return Err(BidiError::unknown(format!("navigation failed: {error_text}")));
        }

        self.await_readiness(handle, params.wait, &params.context).await
    }

    async fn reload(&self, params: bidi_bc::ReloadParams) -> Result<Value> {
        let session = self.session_for(&params.context).await?;
        let current_url = self.contexts.with(&params.context, |ctx| ctx.url.clone()).await?;
        let handle = self
            .contexts
            .with(&params.context, |ctx| {
                ctx.navigation.start_command_navigation(&current_url)
            })
            .await?;

        session
            .send_command::<_, Value>(
                "Page.reload",
                Some(cdp_page::ReloadParams {
                    ignore_cache: params.ignore_cache,
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        self.await_readiness(handle, params.wait, &params.context).await
    }

    async fn await_readiness(
        &self,
        mut handle: NavigationHandle,
        wait: bidi_bc::ReadinessState,
        context: &str,
    ) -> Result<Value> {
        let readiness = match wait {
            bidi_bc::ReadinessState::None => Readiness::Started,
            bidi_bc::ReadinessState::Interactive => Readiness::Interactive,
            bidi_bc::ReadinessState::Complete => Readiness::Complete,
        };
        handle.wait_for(readiness).await?;

        let url = self
            .contexts
            .with(context, |ctx| ctx.url.clone())
            .await
            .unwrap_or_else(|_| handle.url.clone());
        Ok(serde_json::to_value(bidi_bc::NavigateResult {
            navigation: Some(handle.id),
            url,
        })
        .unwrap_or(Value::Null))
    }

    async fn traverse_history(&self, params: bidi_bc::TraverseHistoryParams) -> Result<Value> {
        self.require_top_level(&params.context).await?;
        let session = self.session_for(&params.context).await?;
        let history: cdp_page::GetNavigationHistoryResult = session
            .send_command(
                "Page.getNavigationHistory",
                Some(cdp_page::GetNavigationHistoryParams::default()),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        let target_index = history.current_index + params.delta;
        let entry = usize::try_from(target_index)
            .ok()
            .and_then(|index| history.entries.get(index))
            .ok_or_else(|| {
                BidiError::invalid_argument(format!(
                    "history delta {} out of range",
                    params.delta
                ))
            })?;

        session
            .send_command::<_, Value>(
                "Page.navigateToHistoryEntry",
                Some(cdp_page::NavigateToHistoryEntryParams { entry_id: entry.id }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        Ok(empty_result())
    }

    async fn handle_user_prompt(&self, params: bidi_bc::HandleUserPromptParams) -> Result<Value> {
        let open = self
            .contexts
            .with(&params.context, |ctx| ctx.open_prompt.clone())
            .await?;
        if open.is_none() {
            return Err(BidiError::new(
                ErrorCode::NoSuchAlert,
                format!("no user prompt open in context {}", params.context),
            ));
        }
        let session = self.session_for(&params.context).await?;
        session
            .send_command::<_, Value>(
                "Page.handleJavaScriptDialog",
                Some(cdp_page::HandleJavaScriptDialogParams {
                    accept: params.accept.unwrap_or(false),
                    prompt_text: params.user_text.clone(),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        Ok(empty_result())
    }

    async fn capture_screenshot(&self, params: bidi_bc::CaptureScreenshotParams) -> Result<Value> {
        let session = self.session_for(&params.context).await?;
        let format = params
            .format
            .as_ref()
            .map(|f| match f.format_type.as_str() {
                "image/jpeg" => "jpeg".to_string(),
                "image/webp" => "webp".to_string(),
                _ => "png".to_string(),
            });
        let quality = params
            .format
            .as_ref()
            .and_then(|f| f.quality)
            .map(|q| (q * 100.0).clamp(0.0, 100.0) as u32);
        let clip = params.clip.as_ref().map(|clip| cdp_page::Viewport {
            x: clip.x,
            y: clip.y,
            width: clip.width,
            height: clip.height,
            scale: 1.0,
        });

        let result: cdp_page::CaptureScreenshotResult = session
            .send_command(
                "Page.captureScreenshot",
                Some(cdp_page::CaptureScreenshotParams {
                    format,
                    quality,
                    clip,
                    capture_beyond_viewport: Some(
                        params.origin == bidi_bc::ScreenshotOrigin::Document,
                    ),
                }),
            )
            .await
            .map_err(|err| BidiError::new(ErrorCode::UnableToCaptureScreen, err.to_string()))?;
        Ok(
            serde_json::to_value(bidi_bc::CaptureScreenshotResult { data: result.data })
                .unwrap_or(Value::Null),
        )
    }

    async fn set_viewport(&self, params: bidi_bc::SetViewportParams) -> Result<Value> {
        if params.context.is_some() && params.user_contexts.is_some() {
            return Err(BidiError::invalid_argument(
                "context and userContexts are mutually exclusive",
            ));
        }
        let update = |config: &mut crate::config::ContextConfig| {
            if let Some(viewport) = params.viewport.clone() {
                config.viewport = Some(viewport);
            }
            if let Some(dpr) = params.device_pixel_ratio {
                config.device_pixel_ratio = Some(dpr);
            }
        };

        if let Some(context) = &params.context {
            self.require_top_level(context).await?;
            self.configs.update_context(context, update).await;
            let only = vec![context.clone()];
            self.manager.reapply_config(Some(&only)).await;
        } else if let Some(user_contexts) = &params.user_contexts {
            for user_context in user_contexts {
                self.configs
                    .update_user_context(user_context, |config| update(config))
                    .await;
            }
            self.manager.reapply_config(None).await;
        } else {
            self.configs.update_global(update).await;
            self.manager.reapply_config(None).await;
        }
        Ok(empty_result())
    }

    fn manager_now(&self) -> u64 {
        self.manager.clock().now_ms()
    }

    async fn emit(&self, emissions: Vec<crate::navigation::NavigationEmission>) {
        for emission in emissions {
            let context = emission.info.context.clone();
            self.manager
                .events()
                .emit(
                    emission.method,
                    serde_json::to_value(&emission.info).unwrap_or(Value::Null),
                    Some(context),
                )
                .await;
        }
    }
}
