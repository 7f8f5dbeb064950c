//! input.* command processor.

use std::sync::Arc;

use crosswire_bidi::input as bidi_input;
use crosswire_bidi::{BidiError, Command, ErrorCode};
use crosswire_cdp::protocol::dom as cdp_dom;
use serde_json::Value;

use crate::context::BrowsingContextStorage;
use crate::error::Result;
use crate::input::dispatch::ActionDispatcher;
use crate::input::InputStateManager;
use crate::realm::RealmStorage;
use crate::script::shared_id::parse_shared_id;
use crate::target::manager::CdpTargetManager;

use super::{empty_result, parse_params, unknown_operation};

/// Handles input.* commands.
pub struct InputProcessor {
    contexts: Arc<BrowsingContextStorage>,
    realms: Arc<RealmStorage>,
    input: Arc<InputStateManager>,
    manager: Arc<CdpTargetManager>,
}

impl InputProcessor {
    /// New processor.
    pub fn new(
        contexts: Arc<BrowsingContextStorage>,
        realms: Arc<RealmStorage>,
        input: Arc<InputStateManager>,
        manager: Arc<CdpTargetManager>,
    ) -> Self {
        Self {
            contexts,
            realms,
            input,
            manager,
        }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "performActions" => self.perform_actions(parse_params(&command)?).await,
            "releaseActions" => self.release_actions(parse_params(&command)?).await,
            "setFiles" => self.set_files(parse_params(&command)?).await,
            other => Err(unknown_operation("input", other)),
        }
    }

    async fn dispatcher_for(&self, context: &str) -> Result<ActionDispatcher> {
        let top_level = self.contexts.top_level_of(context).await?;
        let target = self
            .manager
            .target_for_context(context)
            .await
            .ok_or_else(|| BidiError::no_such_frame(context))?;
        let state = self.input.state_for(&top_level).await;
        Ok(ActionDispatcher::new(
            target.session().clone(),
            context.to_string(),
            state,
            Arc::clone(&self.realms),
            Arc::clone(self.input.clock()),
            self.manager.is_macos(),
        ))
    }

    async fn perform_actions(&self, params: bidi_input::PerformActionsParams) -> Result<Value> {
        let dispatcher = self.dispatcher_for(&params.context).await?;
        dispatcher.perform(&params.actions).await?;
        Ok(empty_result())
    }

    async fn release_actions(&self, params: bidi_input::ReleaseActionsParams) -> Result<Value> {
        let top_level = self.contexts.top_level_of(&params.context).await?;
        let dispatcher = self.dispatcher_for(&params.context).await?;
        dispatcher.release().await?;
        self.input.remove(&top_level).await;
        Ok(empty_result())
    }

    async fn set_files(&self, params: bidi_input::SetFilesParams) -> Result<Value> {
        if !self.contexts.has(&params.context).await {
            return Err(BidiError::no_such_frame(&params.context));
        }
        let shared_id = params.element.shared_id.as_deref().ok_or_else(|| {
            BidiError::invalid_argument("element must be referenced by sharedId")
        })?;
        let node = parse_shared_id(shared_id)?;
        if node.frame_id != params.context {
            return Err(BidiError::new(
                ErrorCode::NoSuchNode,
                format!("node {shared_id} belongs to another context"),
            ));
        }

        let target = self
            .manager
            .target_for_context(&params.context)
            .await
            .ok_or_else(|| BidiError::no_such_frame(&params.context))?;
        target
            .session()
            .send_command::<_, Value>(
                "DOM.setFileInputFiles",
                Some(cdp_dom::SetFileInputFilesParams {
                    files: params.files.clone(),
                    backend_node_id: Some(node.backend_node_id),
                    object_id: None,
                }),
            )
            .await
            .map_err(|err| BidiError::new(ErrorCode::UnableToSetFileInput, err.to_string()))?;
        Ok(empty_result())
    }
}
