//! Target attachment and per-session event dispatch.
//!
//! The manager listens on the browser root session for target
//! attach/detach, builds the browsing-context / realm graph from what it
//! sees, and runs one dispatch task per attached session so every CDP
//! event handler observes its session's events in CDP order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crosswire_bidi::browsing_context as bidi_bc;
use crosswire_bidi::log as bidi_log;
use crosswire_bidi::script::RealmType;
use crosswire_cdp::protocol::browser as cdp_browser;
use crosswire_cdp::protocol::fetch as cdp_fetch;
use crosswire_cdp::protocol::page as cdp_page;
use crosswire_cdp::protocol::runtime as cdp_runtime;
use crosswire_cdp::protocol::target as cdp_target;
use crosswire_cdp::{CdpEvent, CdpMux, CdpSession};
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::{ContextConfigStorage, UserPromptHandler};
use crate::context::{BrowsingContextStorage, OpenPrompt};
use crate::events::EventManager;
use crate::input::InputStateManager;
use crate::navigation::NavigationEmission;
use crate::network::{BlockedRequest, NetworkEmission, NetworkStorage};
use crate::realm::{Realm, RealmStorage};
use crate::script::PreloadScriptStorage;

use super::CdpTarget;

struct TargetEntry {
    target: Arc<CdpTarget>,
    task: JoinHandle<()>,
}

/// Owns every attached target and the event dispatch around them.
pub struct CdpTargetManager {
    mux: Arc<CdpMux>,
    contexts: Arc<BrowsingContextStorage>,
    realms: Arc<RealmStorage>,
    network: Arc<NetworkStorage>,
    preloads: Arc<PreloadScriptStorage>,
    configs: Arc<ContextConfigStorage>,
    events: Arc<EventManager>,
    input: Arc<InputStateManager>,
    clock: Arc<dyn Clock>,
    targets: Mutex<HashMap<String, TargetEntry>>,
    is_macos: AtomicBool,
}

impl CdpTargetManager {
    /// Build the manager over the shared storages.
    pub fn new(
        mux: Arc<CdpMux>,
        contexts: Arc<BrowsingContextStorage>,
        realms: Arc<RealmStorage>,
        network: Arc<NetworkStorage>,
        preloads: Arc<PreloadScriptStorage>,
        configs: Arc<ContextConfigStorage>,
        events: Arc<EventManager>,
        input: Arc<InputStateManager>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            mux,
            contexts,
            realms,
            network,
            preloads,
            configs,
            events,
            input,
            clock,
            targets: Mutex::new(HashMap::new()),
            is_macos: AtomicBool::new(false),
        })
    }

    /// Whether the driven browser runs on macOS (affects key commands).
    pub fn is_macos(&self) -> bool {
        self.is_macos.load(Ordering::Relaxed)
    }

    /// The mux this manager drives.
    pub fn mux(&self) -> &Arc<CdpMux> {
        &self.mux
    }

    /// The event manager events are published through.
    pub fn events(&self) -> &Arc<EventManager> {
        &self.events
    }

    /// The clock emissions are stamped with.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The target serving a browsing context, via the context's current
    /// session binding.
    pub async fn target_for_context(&self, context_id: &str) -> Option<Arc<CdpTarget>> {
        let session = self.contexts.session_of(context_id).await.ok()??;
        let targets = self.targets.lock().await;
        targets.get(&session).map(|entry| Arc::clone(&entry.target))
    }

    /// The target of a session id.
    pub async fn target_for_session(&self, session_id: &str) -> Option<Arc<CdpTarget>> {
        let targets = self.targets.lock().await;
        targets
            .get(session_id)
            .map(|entry| Arc::clone(&entry.target))
    }

    /// The target with the given target id.
    pub async fn target_for_target_id(&self, target_id: &str) -> Option<Arc<CdpTarget>> {
        let targets = self.targets.lock().await;
        targets
            .values()
            .find(|entry| entry.target.target_id == target_id)
            .map(|entry| Arc::clone(&entry.target))
    }

    /// Every target bound to a browsing context (page and iframe
    /// targets).
    pub async fn page_targets(&self) -> Vec<Arc<CdpTarget>> {
        let targets = self.targets.lock().await;
        targets
            .values()
            .filter(|entry| entry.target.context_id.is_some())
            .map(|entry| Arc::clone(&entry.target))
            .collect()
    }

    /// Re-run Fetch reconciliation on every page target.
    ///
    /// # Errors
    ///
    /// Returns the first per-target failure (the failing target keeps
    /// its previous pattern set).
    pub async fn reconcile_targets(&self) -> Result<(), crosswire_bidi::BidiError> {
        let wanted = self.network.fetch_enable_params().await;
        let mut first_error = None;
        for target in self.page_targets().await {
            if let Err(err) = target.reconcile_fetch(wanted.clone()).await {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Re-apply the effective configuration to every target serving one
    /// of the given top-level contexts (or all, when `None`).
    pub async fn reapply_config(&self, only_contexts: Option<&[String]>) {
        for target in self.page_targets().await {
            let Some(context_id) = &target.context_id else {
                continue;
            };
            let Some((top_level, user_context)) = self.contexts.scope_of(context_id).await else {
                continue;
            };
            if let Some(only) = only_contexts {
                if !only.contains(&top_level) {
                    continue;
                }
            }
            let config = self.configs.effective(&user_context, Some(&top_level)).await;
            if let Err(err) = target.apply_config(&config).await {
                warn!(target = %target.target_id, error = %err, "config re-apply failed");
            }
        }
    }

    /// Install a freshly added preload script on every qualifying
    /// target.
    pub async fn install_preload_everywhere(&self) {
        for target in self.page_targets().await {
            let Some(context_id) = &target.context_id else {
                continue;
            };
            let Some((top_level, _)) = self.contexts.scope_of(context_id).await else {
                continue;
            };
            if let Err(err) = target
                .install_preload_scripts(&self.preloads, &top_level)
                .await
            {
                warn!(target = %target.target_id, error = %err, "preload install failed");
            }
        }
    }

    /// Attach to the browser and start dispatching.
    ///
    /// # Errors
    ///
    /// Fails when the initial auto-attach setup fails.
    pub async fn start(
        self: &Arc<Self>,
        reconcile_rx: mpsc::UnboundedReceiver<()>,
    ) -> Result<(), crosswire_cdp::CdpError> {
        let root = self.mux.session(None);

        if let Ok(version) = root
            .send_command::<Option<Value>, cdp_browser::GetVersionResult>("Browser.getVersion", None)
            .await
        {
            let mac = version.user_agent.contains("Mac OS") || version.user_agent.contains("Macintosh");
            self.is_macos.store(mac, Ordering::Relaxed);
        }

        root.send_command::<_, Value>(
            "Target.setAutoAttach",
            Some(cdp_target::SetAutoAttachParams {
                auto_attach: true,
                wait_for_debugger_on_start: true,
                flatten: Some(true),
                filter: None,
            }),
        )
        .await?;

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.root_loop(root).await;
        });

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.reconcile_loop(reconcile_rx).await;
        });

        Ok(())
    }

    async fn reconcile_loop(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<()>) {
        while rx.recv().await.is_some() {
            // Collapse bursts of subscription changes into one pass.
            while rx.try_recv().is_ok() {}
            if let Err(err) = self.reconcile_targets().await {
                warn!(error = %err, "domain reconciliation failed");
            }
        }
    }

    async fn root_loop(self: Arc<Self>, root: CdpSession) {
        let mut events = root.subscribe_events().await;
        while let Some(event) = events.recv().await {
            match event.method.as_str() {
                "Target.attachedToTarget" => match event.parse_params() {
                    Ok(params) => self.handle_attach(params).await,
                    Err(err) => warn!(error = %err, "bad attachedToTarget payload"),
                },
                "Target.detachedFromTarget" => {
                    if let Ok(params) = event.parse_params::<cdp_target::DetachedFromTargetEvent>() {
                        self.handle_detach(&params.session_id).await;
                    }
                }
                "Target.targetInfoChanged" => {
                    if let Ok(params) = event.parse_params::<cdp_target::TargetInfoChangedEvent>() {
                        let info = params.target_info;
                        let _ = self
                            .contexts
                            .with(&info.target_id, |ctx| ctx.url = info.url.clone())
                            .await;
                    }
                }
                _ => {}
            }
        }
        debug!("root session event loop ended");
    }

    async fn handle_attach(self: &Arc<Self>, params: cdp_target::AttachedToTargetEvent) {
        let info = &params.target_info;
        let session = self.mux.session(Some(params.session_id.clone()));
        debug!(target = %info.target_id, session = %params.session_id,
            target_type = %info.target_type, "target attached");

        match info.target_type.as_str() {
            "page" | "iframe" => self.attach_page(params.clone(), session).await,
            "worker" | "service_worker" | "shared_worker" => {
                self.attach_worker(params.clone(), session).await;
            }
            _ => {
                // Not a target the mapper models: release and detach.
                if let Err(err) = session.send_raw("Runtime.runIfWaitingForDebugger", None).await {
                    debug!(error = %err, "debugger release on ignored target failed");
                }
                let root = self.mux.session(None);
                if let Err(err) = root
                    .send_command::<_, Value>(
                        "Target.detachFromTarget",
                        Some(cdp_target::DetachFromTargetParams {
                            session_id: Some(params.session_id.clone()),
                        }),
                    )
                    .await
                {
                    debug!(error = %err, "detach of ignored target failed");
                }
            }
        }
    }

    async fn attach_page(self: &Arc<Self>, params: cdp_target::AttachedToTargetEvent, session: CdpSession) {
        let info = params.target_info;
        let user_context = info
            .browser_context_id
            .clone()
            .unwrap_or_else(|| crate::context::DEFAULT_USER_CONTEXT.to_string());

        let is_new = self
            .contexts
            .create(&info.target_id, None, Some(&user_context))
            .await;
        let _ = self
            .contexts
            .with(&info.target_id, |ctx| {
                ctx.session_id = Some(params.session_id.clone());
                if !info.url.is_empty() {
                    ctx.url = info.url.clone();
                }
            })
            .await;

        let target = CdpTarget::new(
            info.target_id.clone(),
            params.session_id.clone(),
            info.browser_context_id.clone(),
            Some(info.target_id.clone()),
            session.clone(),
        );

        let task = {
            let manager = Arc::clone(self);
            let target = Arc::clone(&target);
            tokio::spawn(async move {
                manager.target_loop(target).await;
            })
        };
        self.targets.lock().await.insert(
            params.session_id.clone(),
            TargetEntry {
                target: Arc::clone(&target),
                task,
            },
        );

        let top_level = self
            .contexts
            .top_level_of(&info.target_id)
            .await
            .unwrap_or_else(|_| info.target_id.clone());
        let config = self.configs.effective(&user_context, Some(&top_level)).await;
        let fetch_params = self.network.fetch_enable_params().await;

        if let Err(err) = target
            .init(&config, &self.preloads, &top_level, fetch_params)
            .await
        {
            warn!(target = %info.target_id, error = %err, "target init failed, closing");
            let _ = self
                .contexts
                .with(&info.target_id, |ctx| ctx.failed = true)
                .await;
            let root = self.mux.session(None);
            let _ = root
                .send_command::<_, Value>(
                    "Target.detachFromTarget",
                    Some(cdp_target::DetachFromTargetParams {
                        session_id: Some(params.session_id.clone()),
                    }),
                )
                .await;
            return;
        }

        if is_new {
            if let Ok(tree) = self.contexts.tree_info(&info.target_id, Some(0), true).await {
                self.events
                    .emit(
                        "browsingContext.contextCreated",
                        serde_json::to_value(tree).unwrap_or(Value::Null),
                        Some(info.target_id.clone()),
                    )
                    .await;
            }
        }
    }

    async fn attach_worker(self: &Arc<Self>, params: cdp_target::AttachedToTargetEvent, session: CdpSession) {
        let info = params.target_info;
        let kind = match info.target_type.as_str() {
            "service_worker" => RealmType::ServiceWorker,
            "shared_worker" => RealmType::SharedWorker,
            _ => RealmType::DedicatedWorker,
        };

        let target = CdpTarget::new(
            info.target_id.clone(),
            params.session_id.clone(),
            info.browser_context_id.clone(),
            None,
            session.clone(),
        );
        let task = {
            let manager = Arc::clone(self);
            let session = session.clone();
            let session_id = params.session_id.clone();
            tokio::spawn(async move {
                manager.worker_loop(session, session_id, kind).await;
            })
        };
        self.targets.lock().await.insert(
            params.session_id.clone(),
            TargetEntry { target, task },
        );

        if let Err(err) = session.send_raw("Runtime.enable", None).await {
            debug!(error = %err, "worker Runtime.enable failed");
        }
        if let Err(err) = session.send_raw("Runtime.runIfWaitingForDebugger", None).await {
            debug!(error = %err, "worker debugger release failed");
        }
    }

    async fn handle_detach(&self, session_id: &str) {
        let entry = self.targets.lock().await.remove(session_id);
        let Some(entry) = entry else {
            return;
        };
        entry.task.abort();
        debug!(target = %entry.target.target_id, session = %session_id, "target detached");

        for realm in self.realms.remove_by_session(Some(session_id)).await {
            self.emit_realm_destroyed(&realm).await;
        }
        self.preloads.forget_target(&entry.target.target_id).await;

        // A detached top-level page target takes its context tree with
        // it, unless an OOPIF swap already rebound the context.
        if let Some(context_id) = &entry.target.context_id {
            let still_bound = self
                .contexts
                .session_of(context_id)
                .await
                .ok()
                .flatten()
                .is_some_and(|s| s == session_id);
            if still_bound {
                self.destroy_context_tree(context_id).await;
            }
        }
    }

    /// Destroy a context subtree, emitting contextDestroyed bottom-up.
    ///
    /// Events go out while the contexts are still in storage so scoped
    /// subscriptions can resolve them; the records are removed last.
    pub async fn destroy_context_tree(&self, context_id: &str) {
        let mut order = self.contexts.subtree_ids(&[context_id.to_string()]).await;
        // Leaves before parents.
        order.reverse();
        for id in &order {
            for realm in self.realms.remove_by_context(id).await {
                self.emit_realm_destroyed(&realm).await;
            }
            if let Ok(info) = self.contexts.tree_info(id, Some(0), true).await {
                self.events
                    .emit(
                        "browsingContext.contextDestroyed",
                        serde_json::to_value(info).unwrap_or(Value::Null),
                        Some(id.clone()),
                    )
                    .await;
            }
        }
        self.contexts.delete_subtree(context_id).await;
        for id in &order {
            self.events.forget_context(id).await;
            self.configs.remove_context(id).await;
            self.input.remove(id).await;
        }
    }

    async fn emit_realm_destroyed(&self, realm: &Realm) {
        if realm.is_hidden {
            return;
        }
        self.events
            .emit(
                "script.realmDestroyed",
                serde_json::to_value(crosswire_bidi::script::RealmDestroyedParams {
                    realm: realm.id.clone(),
                })
                .unwrap_or(Value::Null),
                realm.context_id.clone(),
            )
            .await;
    }

    async fn worker_loop(self: Arc<Self>, session: CdpSession, session_id: String, kind: RealmType) {
        let mut events = session.subscribe_events().await;
        while let Some(event) = events.recv().await {
            if event.method == "Runtime.executionContextCreated" {
                let Ok(params) = event.parse_params::<cdp_runtime::ExecutionContextCreatedEvent>()
                else {
                    continue;
                };
                let realm = Realm {
                    id: params.context.unique_id.clone(),
                    execution_context_id: params.context.id,
                    origin: params.context.origin.clone(),
                    kind,
                    context_id: None,
                    sandbox: None,
                    session_id: Some(session_id.clone()),
                    is_hidden: false,
                    handles: Default::default(),
                };
                let info = realm.info();
                if self.realms.insert(realm).await {
                    self.events
                        .emit(
                            "script.realmCreated",
                            serde_json::to_value(info).unwrap_or(Value::Null),
                            None,
                        )
                        .await;
                }
            }
        }
    }

    async fn target_loop(self: Arc<Self>, target: Arc<CdpTarget>) {
        let session = target.session().clone();
        let mut events = session.subscribe_events().await;
        while let Some(event) = events.recv().await {
            self.dispatch_target_event(&target, &session, event).await;
        }
        debug!(target = %target.target_id, "target event loop ended");
    }

    async fn dispatch_target_event(&self, target: &Arc<CdpTarget>, session: &CdpSession, event: CdpEvent) {
        let now = self.clock.now_ms();
        match event.method.as_str() {
            "Page.frameAttached" => {
                if let Ok(params) = event.parse_params::<cdp_page::FrameAttachedEvent>() {
                    let is_new = self
                        .contexts
                        .create(&params.frame_id, Some(&params.parent_frame_id), None)
                        .await;
                    let _ = self
                        .contexts
                        .with(&params.frame_id, |ctx| {
                            ctx.session_id = Some(target.session_id.clone());
                        })
                        .await;
                    if is_new {
                        if let Ok(info) = self.contexts.tree_info(&params.frame_id, Some(0), true).await {
                            self.events
                                .emit(
                                    "browsingContext.contextCreated",
                                    serde_json::to_value(info).unwrap_or(Value::Null),
                                    Some(params.frame_id.clone()),
                                )
                                .await;
                        }
                    }
                }
            }
            "Page.frameDetached" => {
                if let Ok(params) = event.parse_params::<cdp_page::FrameDetachedEvent>() {
                    // "swap" means the frame moves to another target.
                    if params.reason.as_deref() != Some("swap") {
                        self.destroy_context_tree(&params.frame_id).await;
                    }
                }
            }
            "Page.frameNavigated" => {
                if let Ok(params) = event.parse_params::<cdp_page::FrameNavigatedEvent>() {
                    let frame = params.frame;
                    let _ = self
                        .contexts
                        .with(&frame.id, |ctx| {
                            ctx.url = frame.url.clone();
                            ctx.navigable_id = Some(frame.loader_id.clone());
                            ctx.navigation.frame_navigated(&frame.url);
                        })
                        .await;
                }
            }
            "Page.frameRequestedNavigation" => {
                if let Ok(params) = event.parse_params::<cdp_page::FrameRequestedNavigationEvent>() {
                    let _ = self
                        .contexts
                        .with(&params.frame_id, |ctx| {
                            ctx.navigation.frame_requested_navigation(&params.url);
                        })
                        .await;
                }
            }
            "Page.frameStartedNavigating" => {
                if let Ok(params) = event.parse_params::<cdp_page::FrameStartedNavigatingEvent>() {
                    let emissions = self
                        .contexts
                        .with(&params.frame_id, |ctx| {
                            ctx.navigation
                                .frame_started_navigating(&params.url, &params.loader_id, now)
                        })
                        .await
                        .unwrap_or_default();
                    self.emit_navigation(emissions).await;
                }
            }
            "Page.navigatedWithinDocument" => {
                if let Ok(params) = event.parse_params::<cdp_page::NavigatedWithinDocumentEvent>() {
                    let emissions = self
                        .contexts
                        .with(&params.frame_id, |ctx| {
                            ctx.url = params.url.clone();
                            ctx.navigation.navigated_within_document(
                                &params.url,
                                params.navigation_type.as_deref(),
                                now,
                            )
                        })
                        .await
                        .unwrap_or_default();
                    self.emit_navigation(emissions).await;
                }
            }
            "Page.lifecycleEvent" => {
                if let Ok(params) = event.parse_params::<cdp_page::LifecycleEvent>() {
                    let emissions = match params.name.as_str() {
                        "DOMContentLoaded" => self
                            .contexts
                            .with(&params.frame_id, |ctx| {
                                ctx.navigation.dom_content_loaded(&params.loader_id, now)
                            })
                            .await
                            .unwrap_or_default(),
                        "load" => self
                            .contexts
                            .with(&params.frame_id, |ctx| {
                                ctx.navigation.load(&params.loader_id, now)
                            })
                            .await
                            .unwrap_or_default(),
                        _ => Vec::new(),
                    };
                    self.emit_navigation(emissions).await;
                }
            }
            "Page.javascriptDialogOpening" => {
                if let Ok(params) = event.parse_params::<cdp_page::JavascriptDialogOpeningEvent>() {
                    self.handle_prompt_opening(target, session, params).await;
                }
            }
            "Page.javascriptDialogClosed" => {
                if let Ok(params) = event.parse_params::<cdp_page::JavascriptDialogClosedEvent>() {
                    self.handle_prompt_closed(target, params).await;
                }
            }
            "Runtime.executionContextCreated" => {
                if let Ok(params) = event.parse_params::<cdp_runtime::ExecutionContextCreatedEvent>() {
                    self.handle_execution_context_created(target, params).await;
                }
            }
            "Runtime.executionContextDestroyed" => {
                if let Ok(params) =
                    event.parse_params::<cdp_runtime::ExecutionContextDestroyedEvent>()
                {
                    let removed = self
                        .realms
                        .remove_by_execution_context(
                            Some(&target.session_id),
                            params.execution_context_id,
                        )
                        .await;
                    if let Some(realm) = removed {
                        self.emit_realm_destroyed(&realm).await;
                    }
                }
            }
            "Runtime.executionContextsCleared" => {
                for realm in self.realms.remove_by_session(Some(&target.session_id)).await {
                    self.emit_realm_destroyed(&realm).await;
                }
            }
            "Runtime.consoleAPICalled" => {
                if let Ok(params) = event.parse_params::<cdp_runtime::ConsoleApiCalledEvent>() {
                    self.handle_console_api(target, params).await;
                }
            }
            "Runtime.exceptionThrown" => {
                if let Ok(params) = event.parse_params::<cdp_runtime::ExceptionThrownEvent>() {
                    self.handle_exception_thrown(target, params).await;
                }
            }
            "Log.entryAdded" => {
                if let Ok(params) = event.parse_params::<crosswire_cdp::protocol::log::EntryAddedEvent>() {
                    self.handle_log_entry(target, params).await;
                }
            }
            "Inspector.targetCrashed" => {
                if let Some(context_id) = &target.context_id {
                    let _ = self.contexts.with(context_id, |ctx| ctx.failed = true).await;
                }
            }
            method if method.starts_with("Network.") || method.starts_with("Fetch.") => {
                self.dispatch_network_event(session, &event).await;
            }
            _ => {}
        }
    }

    async fn emit_navigation(&self, emissions: Vec<NavigationEmission>) {
        for emission in emissions {
            let context = emission.info.context.clone();
            self.events
                .emit(
                    emission.method,
                    serde_json::to_value(&emission.info).unwrap_or(Value::Null),
                    Some(context),
                )
                .await;
        }
    }

    async fn handle_prompt_opening(
        &self,
        target: &Arc<CdpTarget>,
        session: &CdpSession,
        params: cdp_page::JavascriptDialogOpeningEvent,
    ) {
        let Some(context_id) = target.context_id.clone() else {
            return;
        };
        let Some((top_level, user_context)) = self.contexts.scope_of(&context_id).await else {
            return;
        };
        let handler = self
            .configs
            .effective(&user_context, Some(&top_level))
            .await
            .user_prompt_handler
            .unwrap_or_default();

        let _ = self
            .contexts
            .with(&context_id, |ctx| {
                ctx.open_prompt = Some(OpenPrompt {
                    prompt_type: params.dialog_type.clone(),
                    message: params.message.clone(),
                });
            })
            .await;

        self.events
            .emit(
                "browsingContext.userPromptOpened",
                serde_json::to_value(bidi_bc::UserPromptOpenedParams {
                    context: context_id.clone(),
                    handler: handler.as_str().to_string(),
                    message: params.message.clone(),
                    prompt_type: params.dialog_type.clone(),
                    default_value: params.default_prompt.clone(),
                })
                .unwrap_or(Value::Null),
                Some(context_id.clone()),
            )
            .await;

        let accept = match handler {
            UserPromptHandler::Accept => Some(true),
            UserPromptHandler::Dismiss => Some(false),
            UserPromptHandler::Ignore => None,
        };
        if let Some(accept) = accept {
            let result = session
                .send_command::<_, Value>(
                    "Page.handleJavaScriptDialog",
                    Some(cdp_page::HandleJavaScriptDialogParams {
                        accept,
                        prompt_text: None,
                    }),
                )
                .await;
            if let Err(err) = result {
                debug!(error = %err, "automatic prompt handling failed");
            }
        }
    }

    async fn handle_prompt_closed(
        &self,
        target: &Arc<CdpTarget>,
        params: cdp_page::JavascriptDialogClosedEvent,
    ) {
        let Some(context_id) = target.context_id.clone() else {
            return;
        };
        let prompt = self
            .contexts
            .with(&context_id, |ctx| ctx.open_prompt.take())
            .await
            .ok()
            .flatten();
        let prompt_type = prompt.map_or_else(|| "alert".to_string(), |p| p.prompt_type);
        self.events
            .emit(
                "browsingContext.userPromptClosed",
                serde_json::to_value(bidi_bc::UserPromptClosedParams {
                    context: context_id.clone(),
                    accepted: params.result,
                    prompt_type,
                    user_text: if params.user_input.is_empty() {
                        None
                    } else {
                        Some(params.user_input.clone())
                    },
                })
                .unwrap_or(Value::Null),
                Some(context_id),
            )
            .await;
    }

    async fn handle_execution_context_created(
        &self,
        target: &Arc<CdpTarget>,
        params: cdp_runtime::ExecutionContextCreatedEvent,
    ) {
        let description = params.context;
        let aux = description.aux_data.as_ref();
        let frame_id = aux
            .and_then(|a| a.frame_id.clone())
            .or_else(|| target.context_id.clone());
        let is_isolated = aux
            .and_then(|a| a.context_type.as_deref())
            .is_some_and(|t| t == "isolated");
        let realm = Realm {
            id: description.unique_id.clone(),
            execution_context_id: description.id,
            origin: description.origin.clone(),
            kind: RealmType::Window,
            context_id: frame_id.clone(),
            sandbox: if is_isolated {
                Some(description.name.clone())
            } else {
                None
            },
            session_id: Some(target.session_id.clone()),
            is_hidden: false,
            handles: Default::default(),
        };
        let info = realm.info();
        if self.realms.insert(realm).await {
            self.events
                .emit(
                    "script.realmCreated",
                    serde_json::to_value(info).unwrap_or(Value::Null),
                    frame_id,
                )
                .await;
        }
    }

    async fn handle_console_api(
        &self,
        target: &Arc<CdpTarget>,
        params: cdp_runtime::ConsoleApiCalledEvent,
    ) {
        let realm = self
            .realms
            .by_execution_context(Some(&target.session_id), params.execution_context_id)
            .await;
        let context = realm
            .as_ref()
            .and_then(|r| r.context_id.clone())
            .or_else(|| target.context_id.clone());

        let args: Vec<_> = params
            .args
            .iter()
            .map(|arg| crate::script::values::remote_object_fallback(arg))
            .collect();
        let text = args
            .iter()
            .filter_map(|value| value.value.as_ref())
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");

        let level = match params.call_type.as_str() {
            "assert" | "error" => "error",
            "warning" => "warn",
            "debug" | "trace" => "debug",
            _ => "info",
        };

        let entry = bidi_log::LogEntry {
            entry_type: "console".to_string(),
            level: level.to_string(),
            source: bidi_log::Source {
                realm: realm.as_ref().map(|r| r.id.clone()),
                context: context.clone(),
            },
            text: Some(text),
            timestamp: params.timestamp as u64,
            stack_trace: None,
            method: Some(params.call_type.clone()),
            args: Some(args),
        };
        self.events
            .emit(
                "log.entryAdded",
                serde_json::to_value(entry).unwrap_or(Value::Null),
                context,
            )
            .await;
    }

    async fn handle_exception_thrown(
        &self,
        target: &Arc<CdpTarget>,
        params: cdp_runtime::ExceptionThrownEvent,
    ) {
        let details = params.exception_details;
        let realm = match details.execution_context_id {
            Some(id) => {
                self.realms
                    .by_execution_context(Some(&target.session_id), id)
                    .await
            }
            None => None,
        };
        let context = realm
            .as_ref()
            .and_then(|r| r.context_id.clone())
            .or_else(|| target.context_id.clone());

        let text = details
            .exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .unwrap_or_else(|| details.text.clone());

        let entry = bidi_log::LogEntry {
            entry_type: "javascript".to_string(),
            level: "error".to_string(),
            source: bidi_log::Source {
                realm: realm.as_ref().map(|r| r.id.clone()),
                context: context.clone(),
            },
            text: Some(text),
            timestamp: params.timestamp as u64,
            stack_trace: None,
            method: None,
            args: None,
        };
        self.events
            .emit(
                "log.entryAdded",
                serde_json::to_value(entry).unwrap_or(Value::Null),
                context,
            )
            .await;
    }

    async fn handle_log_entry(
        &self,
        target: &Arc<CdpTarget>,
        params: crosswire_cdp::protocol::log::EntryAddedEvent,
    ) {
        let entry = params.entry;
        let level = match entry.level.as_str() {
            "error" => "error",
            "warning" => "warn",
            "verbose" => "debug",
            _ => "info",
        };
        let context = target.context_id.clone();
        let log_entry = bidi_log::LogEntry {
            entry_type: entry.source.clone(),
            level: level.to_string(),
            source: bidi_log::Source {
                realm: None,
                context: context.clone(),
            },
            text: Some(entry.text.clone()),
            timestamp: entry.timestamp as u64,
            stack_trace: None,
            method: None,
            args: None,
        };
        self.events
            .emit(
                "log.entryAdded",
                serde_json::to_value(log_entry).unwrap_or(Value::Null),
                context,
            )
            .await;
    }

    async fn dispatch_network_event(&self, session: &CdpSession, event: &CdpEvent) {
        use crosswire_cdp::protocol::network as cdp_net;

        let now = self.clock.now_ms();
        match event.method.as_str() {
            "Network.requestWillBeSent" => {
                let Ok(params) = event.parse_params::<cdp_net::RequestWillBeSentEvent>() else {
                    return;
                };
                let id = params.request_id.clone();
                let (emissions, is_nav) = self
                    .network
                    .with_request(&id, |request, snapshot| {
                        let emissions = request.on_request_will_be_sent(params, snapshot);
                        (emissions, request.is_navigation_request())
                    })
                    .await;
                self.publish_network(emissions, is_nav).await;
            }
            "Network.requestWillBeSentExtraInfo" => {
                let Ok(params) = event.parse_params::<cdp_net::RequestWillBeSentExtraInfoEvent>()
                else {
                    return;
                };
                let id = params.request_id.clone();
                let (emissions, is_nav) = self
                    .network
                    .with_request(&id, |request, snapshot| {
                        let emissions = request.on_request_will_be_sent_extra_info(params, snapshot);
                        (emissions, request.is_navigation_request())
                    })
                    .await;
                self.publish_network(emissions, is_nav).await;
            }
            "Network.responseReceived" => {
                let Ok(params) = event.parse_params::<cdp_net::ResponseReceivedEvent>() else {
                    return;
                };
                let id = params.request_id.clone();
                let (emissions, is_nav) = self
                    .network
                    .with_request(&id, |request, snapshot| {
                        let emissions = request.on_response_received(params, snapshot);
                        (emissions, request.is_navigation_request())
                    })
                    .await;
                self.publish_network(emissions, is_nav).await;
            }
            "Network.responseReceivedExtraInfo" => {
                let Ok(params) = event.parse_params::<cdp_net::ResponseReceivedExtraInfoEvent>()
                else {
                    return;
                };
                let id = params.request_id.clone();
                let (emissions, is_nav) = self
                    .network
                    .with_request(&id, |request, snapshot| {
                        let emissions = request.on_response_received_extra_info(params, snapshot);
                        (emissions, request.is_navigation_request())
                    })
                    .await;
                self.publish_network(emissions, is_nav).await;
            }
            "Network.loadingFinished" => {
                let Ok(params) = event.parse_params::<cdp_net::LoadingFinishedEvent>() else {
                    return;
                };
                let (emissions, is_nav) = self
                    .network
                    .with_request(&params.request_id, |request, snapshot| {
                        let emissions = request.on_loading_finished(snapshot);
                        (emissions, request.is_navigation_request())
                    })
                    .await;
                self.publish_network(emissions, is_nav).await;
            }
            "Network.requestServedFromCache" => {
                let Ok(params) = event.parse_params::<cdp_net::RequestServedFromCacheEvent>() else {
                    return;
                };
                self.network
                    .with_request(&params.request_id, |request, _| request.on_served_from_cache())
                    .await;
            }
            "Network.loadingFailed" => {
                let Ok(params) = event.parse_params::<cdp_net::LoadingFailedEvent>() else {
                    return;
                };
                let (emissions, is_nav, context) = self
                    .network
                    .with_request(&params.request_id, |request, snapshot| {
                        let emissions = request.on_loading_failed(&params, snapshot);
                        (
                            emissions,
                            request.is_navigation_request(),
                            request.context_id.clone(),
                        )
                    })
                    .await;
                // A failing document load fails its navigation.
                if let Some(context_id) = context {
                    let nav_emissions = self
                        .contexts
                        .with(&context_id, |ctx| {
                            ctx.navigation
                                .loading_failed(&params.request_id, &params.error_text, now)
                        })
                        .await
                        .unwrap_or_default();
                    self.emit_navigation(nav_emissions).await;
                }
                self.publish_network(emissions, is_nav).await;
            }
            "Fetch.requestPaused" => {
                let Ok(params) = event.parse_params::<cdp_fetch::RequestPausedEvent>() else {
                    return;
                };
                let request_id = params
                    .network_id
                    .clone()
                    .unwrap_or_else(|| params.request_id.clone());
                let matches = self
                    .network
                    .with_request(&request_id, |request, snapshot| {
                        request.on_request_paused(&params, snapshot)
                    })
                    .await;
                if matches.is_empty() {
                    // Nothing wants this pause: release it.
                    let result = session
                        .send_command::<_, Value>(
                            "Fetch.continueRequest",
                            Some(cdp_fetch::ContinueRequestParams {
                                request_id: params.request_id.clone(),
                                ..Default::default()
                            }),
                        )
                        .await;
                    if let Err(err) = result {
                        debug!(error = %err, "releasing unwanted pause failed");
                    }
                } else {
                    let phase = self
                        .network
                        .with_request(&request_id, |request, _| {
                            request.paused.as_ref().map(|p| p.phase)
                        })
                        .await;
                    if let Some(phase) = phase {
                        self.network
                            .mark_blocked(
                                &request_id,
                                BlockedRequest {
                                    fetch_id: params.request_id.clone(),
                                    phase,
                                    session: session.clone(),
                                },
                            )
                            .await;
                    }
                }
            }
            "Fetch.authRequired" => {
                let Ok(params) = event.parse_params::<cdp_fetch::AuthRequiredEvent>() else {
                    return;
                };
                let request_id = params.request_id.clone();
                let (emissions, is_nav) = self
                    .network
                    .with_request(&request_id, |request, snapshot| {
                        let emissions =
                            request.on_auth_required(&params, snapshot, now as f64 / 1000.0);
                        (emissions, request.is_navigation_request())
                    })
                    .await;
                self.network
                    .mark_blocked(
                        &request_id,
                        BlockedRequest {
                            fetch_id: params.request_id.clone(),
                            phase: crosswire_bidi::network::InterceptPhase::AuthRequired,
                            session: session.clone(),
                        },
                    )
                    .await;
                self.publish_network(emissions, is_nav).await;
            }
            _ => {}
        }
    }

    async fn publish_network(&self, emissions: Vec<NetworkEmission>, is_navigation: bool) {
        for mut emission in emissions {
            // Skip assembling frames nobody subscribed to.
            if !self.events.is_subscribed(emission.method()).await {
                continue;
            }
            let context = emission.base().context.clone();
            if is_navigation {
                if let Some(context_id) = &context {
                    let navigation = self
                        .contexts
                        .with(context_id, |ctx| {
                            ctx.navigation
                                .current_navigation_id()
                                .map(ToString::to_string)
                        })
                        .await
                        .ok()
                        .flatten();
                    emission.base_mut().navigation = navigation;
                }
            }
            let params = emission.params();
            self.events.emit(emission.method(), params, context).await;
        }
    }
}
