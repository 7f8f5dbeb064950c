//! script.* command processor.

use std::sync::Arc;
use std::time::Duration;

use crosswire_bidi::script as bidi_script;
use crosswire_bidi::{BidiError, Command, ErrorCode};
use crosswire_cdp::protocol::dom as cdp_dom;
use crosswire_cdp::protocol::page as cdp_page;
use crosswire_cdp::protocol::runtime as cdp_runtime;
use crosswire_cdp::{CdpMux, CdpSession};
use serde_json::Value;

use crate::context::BrowsingContextStorage;
use crate::error::{cdp_to_bidi, Result};
use crate::realm::{Realm, RealmStorage};
use crate::script::shared_id::parse_shared_id;
use crate::script::values::{
    assemble_arguments, exception_to_bidi, prepare_typed, remote_object_to_value,
    wrap_function_declaration, NodeContext, PreparedValue,
};
use crate::script::PreloadScriptStorage;
use crate::target::manager::CdpTargetManager;

use super::{empty_result, parse_params, unknown_operation};

/// Handles script.* commands.
pub struct ScriptProcessor {
    realms: Arc<RealmStorage>,
    contexts: Arc<BrowsingContextStorage>,
    preloads: Arc<PreloadScriptStorage>,
    manager: Arc<CdpTargetManager>,
    mux: Arc<CdpMux>,
}

impl ScriptProcessor {
    /// New processor.
    pub fn new(
        realms: Arc<RealmStorage>,
        contexts: Arc<BrowsingContextStorage>,
        preloads: Arc<PreloadScriptStorage>,
        manager: Arc<CdpTargetManager>,
        mux: Arc<CdpMux>,
    ) -> Self {
        Self {
            realms,
            contexts,
            preloads,
            manager,
            mux,
        }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "evaluate" => self.evaluate(parse_params(&command)?).await,
            "callFunction" => self.call_function(parse_params(&command)?).await,
            "disown" => self.disown(parse_params(&command)?).await,
            "getRealms" => self.get_realms(parse_params(&command)?).await,
            "addPreloadScript" => self.add_preload_script(parse_params(&command)?).await,
            "removePreloadScript" => self.remove_preload_script(parse_params(&command)?).await,
            other => Err(unknown_operation("script", other)),
        }
    }

    /// Resolve a script target to a realm, creating the sandbox world on
    /// demand.
    async fn resolve_realm(&self, target: &bidi_script::Target) -> Result<Realm> {
        match target {
            bidi_script::Target::Realm { realm } => self.realms.get(realm).await,
            bidi_script::Target::Context { context, sandbox } => {
                if !self.contexts.has(context).await {
                    return Err(BidiError::no_such_frame(context));
                }
                if let Some(realm) = self.realms.window_realm(context, sandbox.as_deref()).await {
                    return Ok(realm);
                }
                if let Some(sandbox) = sandbox {
                    self.create_sandbox(context, sandbox).await?;
                    // The realm registers through the session event loop.
                    for _ in 0..50u32 {
                        if let Some(realm) =
                            self.realms.window_realm(context, Some(sandbox)).await
                        {
                            return Ok(realm);
                        }
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
                Err(BidiError::invalid_argument(format!(
                    "no realm for context {context}"
                )))
            }
        }
    }

    async fn create_sandbox(&self, context: &str, sandbox: &str) -> Result<()> {
        let session = self.session_for_context(context).await?;
        session
            .send_command::<_, cdp_page::CreateIsolatedWorldResult>(
                "Page.createIsolatedWorld",
                Some(cdp_page::CreateIsolatedWorldParams {
                    frame_id: context.to_string(),
                    world_name: Some(sandbox.to_string()),
                    grant_univeral_access: Some(false),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        Ok(())
    }

    async fn session_for_context(&self, context: &str) -> Result<CdpSession> {
        let target = self
            .manager
            .target_for_context(context)
            .await
            .ok_or_else(|| BidiError::no_such_frame(context))?;
        Ok(target.session().clone())
    }

    fn session_for_realm(&self, realm: &Realm) -> CdpSession {
        self.mux.session(realm.session_id.clone())
    }

    /// The node-id context of a realm, for sharedId minting.
    async fn node_context(&self, realm: &Realm) -> Option<NodeContext> {
        let context_id = realm.context_id.as_ref()?;
        let navigable = self
            .contexts
            .with(context_id, |ctx| ctx.navigable_id.clone())
            .await
            .ok()
            .flatten()?;
        Some(NodeContext {
            frame_id: context_id.clone(),
            document_id: navigable,
        })
    }

    async fn evaluate(&self, params: bidi_script::EvaluateParams) -> Result<Value> {
        let realm = self.resolve_realm(&params.target).await?;
        let session = self.session_for_realm(&realm);

        let result: cdp_runtime::EvaluateResult = session
            .send_command(
                "Runtime.evaluate",
                Some(cdp_runtime::EvaluateParams {
                    expression: params.expression.clone(),
                    context_id: Some(realm.execution_context_id),
                    return_by_value: None,
                    await_promise: Some(params.await_promise),
                    include_command_line_api: None,
                    user_gesture: Some(params.user_activation),
                    serialization_options: Some(cdp_runtime::SerializationOptions::deep(
                        params.serialization_options.max_object_depth,
                    )),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        self.finish_evaluation(
            &realm,
            result.result,
            result.exception_details,
            params.result_ownership,
        )
        .await
    }

    async fn call_function(&self, params: bidi_script::CallFunctionParams) -> Result<Value> {
        let realm = self.resolve_realm(&params.target).await?;
        let session = self.session_for_realm(&realm);

        let mut prepared_args = Vec::with_capacity(params.arguments.len());
        for argument in &params.arguments {
            prepared_args.push(self.prepare_local(&realm, &session, argument).await?);
        }
        let prepared_this = match &params.this {
            Some(this) => Some(self.prepare_local(&realm, &session, this).await?),
            None => None,
        };

        let declaration = wrap_function_declaration(&params.function_declaration);
        let arguments = assemble_arguments(prepared_this, prepared_args);

        let result: cdp_runtime::CallFunctionOnResult = session
            .send_command(
                "Runtime.callFunctionOn",
                Some(cdp_runtime::CallFunctionOnParams {
                    function_declaration: declaration,
                    object_id: None,
                    arguments: Some(arguments),
                    execution_context_id: Some(realm.execution_context_id),
                    return_by_value: None,
                    await_promise: Some(params.await_promise),
                    user_gesture: Some(params.user_activation),
                    serialization_options: Some(cdp_runtime::SerializationOptions::deep(
                        params.serialization_options.max_object_depth,
                    )),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        self.finish_evaluation(
            &realm,
            result.result,
            result.exception_details,
            params.result_ownership,
        )
        .await
    }

    async fn finish_evaluation(
        &self,
        realm: &Realm,
        result: cdp_runtime::RemoteObject,
        exception: Option<cdp_runtime::ExceptionDetails>,
        ownership: bidi_script::ResultOwnership,
    ) -> Result<Value> {
        let node_ctx = self.node_context(realm).await;
        let evaluate_result = match exception {
            Some(details) => bidi_script::EvaluateResult::Exception {
                exception_details: exception_to_bidi(&details, node_ctx.as_ref()),
                realm: realm.id.clone(),
            },
            None => {
                let mut value = remote_object_to_value(&result, node_ctx.as_ref());
                if ownership == bidi_script::ResultOwnership::Root {
                    if let Some(object_id) = &result.object_id {
                        self.realms.retain_handle(&realm.id, object_id).await;
                        value.handle = Some(object_id.clone());
                    }
                }
                bidi_script::EvaluateResult::Success {
                    result: value,
                    realm: realm.id.clone(),
                }
            }
        };
        Ok(serde_json::to_value(evaluate_result).unwrap_or(Value::Null))
    }

    /// Lower one BiDi argument to its prepared CDP form.
    async fn prepare_local(
        &self,
        realm: &Realm,
        session: &CdpSession,
        value: &bidi_script::LocalValue,
    ) -> Result<PreparedValue> {
        match value {
            bidi_script::LocalValue::Typed(typed) => prepare_typed(typed),
            bidi_script::LocalValue::Reference(reference) => {
                if let Some(handle) = &reference.handle {
                    let realm_record = self.realms.get(&realm.id).await?;
                    if !realm_record.handles.contains(handle) {
                        return Err(BidiError::new(
                            ErrorCode::NoSuchHandle,
                            format!("handle {handle} is not owned by realm {}", realm.id),
                        ));
                    }
                    return Ok(PreparedValue::Argument(cdp_runtime::CallArgument {
                        object_id: Some(handle.clone()),
                        ..cdp_runtime::CallArgument::default()
                    }));
                }
                let shared_id = reference.shared_id.as_deref().ok_or_else(|| {
                    BidiError::invalid_argument("reference carries neither handle nor sharedId")
                })?;
                let object_id = self.resolve_shared_id(realm, session, shared_id).await?;
                Ok(PreparedValue::Argument(cdp_runtime::CallArgument {
                    object_id: Some(object_id),
                    ..cdp_runtime::CallArgument::default()
                }))
            }
        }
    }

    /// Resolve a shared node id against the realm's current document.
    async fn resolve_shared_id(
        &self,
        realm: &Realm,
        session: &CdpSession,
        shared_id: &str,
    ) -> Result<String> {
        let node = parse_shared_id(shared_id)?;
        let Some(context_id) = &realm.context_id else {
            return Err(BidiError::new(
                ErrorCode::NoSuchNode,
                "realm has no browsing context",
            ));
        };
        if &node.frame_id != context_id {
            return Err(BidiError::new(
                ErrorCode::NoSuchNode,
                format!("node {shared_id} belongs to another context"),
            ));
        }
        let navigable = self
            .contexts
            .with(context_id, |ctx| ctx.navigable_id.clone())
            .await?
            .unwrap_or_default();
        if node.document_id != navigable {
            return Err(BidiError::new(
                ErrorCode::NoSuchNode,
                format!("node {shared_id} belongs to a previous document"),
            ));
        }

        let resolved: cdp_dom::ResolveNodeResult = session
            .send_command(
                "DOM.resolveNode",
                Some(cdp_dom::ResolveNodeParams {
                    backend_node_id: Some(node.backend_node_id),
                    execution_context_id: Some(realm.execution_context_id),
                }),
            )
            .await
            .map_err(|_| BidiError::new(ErrorCode::NoSuchNode, format!("cannot resolve {shared_id}")))?;
        resolved
            .object
            .object_id
            .ok_or_else(|| BidiError::new(ErrorCode::NoSuchNode, format!("cannot resolve {shared_id}")))
    }

    async fn disown(&self, params: bidi_script::DisownParams) -> Result<Value> {
        let realm = self.resolve_realm(&params.target).await?;
        let session = self.session_for_realm(&realm);
        for handle in &params.handles {
            if self.realms.release_handle(&realm.id, handle).await {
                let result = session
                    .send_command::<_, Value>(
                        "Runtime.releaseObject",
                        Some(cdp_runtime::ReleaseObjectParams {
                            object_id: handle.clone(),
                        }),
                    )
                    .await;
                if let Err(err) = result {
                    // The object may be gone with its context.
                    tracing::debug!(error = %err, "releaseObject skipped");
                }
            }
        }
        Ok(empty_result())
    }

    async fn get_realms(&self, params: bidi_script::GetRealmsParams) -> Result<Value> {
        if let Some(context) = &params.context {
            if !self.contexts.has(context).await {
                return Err(BidiError::no_such_frame(context));
            }
        }
        let realms = self
            .realms
            .list(params.context.as_deref(), params.realm_type)
            .await;
        Ok(serde_json::to_value(bidi_script::GetRealmsResult { realms })
            .unwrap_or(Value::Null))
    }

    async fn add_preload_script(
        &self,
        params: bidi_script::AddPreloadScriptParams,
    ) -> Result<Value> {
        if !params.arguments.is_empty() {
            return Err(BidiError::unsupported(
                "preload script channel arguments are not supported",
            ));
        }
        if let Some(contexts) = &params.contexts {
            for context in contexts {
                let is_top = self
                    .contexts
                    .with(context, |ctx| ctx.parent_id.is_none())
                    .await?;
                if !is_top {
                    return Err(BidiError::invalid_argument(format!(
                        "context {context} is not top-level"
                    )));
                }
            }
        }
        let script = self
            .preloads
            .add(
                params.function_declaration.clone(),
                params.sandbox.clone(),
                params.contexts.clone(),
                params.user_contexts.clone(),
            )
            .await;
        self.manager.install_preload_everywhere().await;
        Ok(
            serde_json::to_value(bidi_script::AddPreloadScriptResult { script })
                .unwrap_or(Value::Null),
        )
    }

    async fn remove_preload_script(
        &self,
        params: bidi_script::RemovePreloadScriptParams,
    ) -> Result<Value> {
        let script = self.preloads.remove(&params.script).await?;
        for (target_id, cdp_identifier) in &script.installed {
            if let Some(target) = self.manager.target_for_target_id(target_id).await {
                target.uninstall_preload_script(cdp_identifier).await;
            }
        }
        Ok(empty_result())
    }
}
