//! Command processing.
//!
//! The [`CommandProcessor`] is the front door: it parses each incoming
//! frame, reserves the channel's next reply slot so replies keep command
//! order, routes by method prefix to the owning module processor, and
//! classifies failures into the wire error taxonomy.

pub mod bluetooth;
pub mod browser;
pub mod browsing_context;
pub mod cdp;
pub mod input;
pub mod network;
pub mod permissions;
pub mod script;
pub mod session;
pub mod storage;

use std::sync::Arc;

use crosswire_bidi::{parse_command, BidiError, Command, ErrorCode, OutgoingFrame};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::events::OutgoingQueue;

/// The per-module processors, wired by the composition root.
pub struct Processors {
    /// session.* commands.
    pub session: session::SessionProcessor,
    /// browser.* commands.
    pub browser: browser::BrowserProcessor,
    /// browsingContext.* commands.
    pub browsing_context: browsing_context::BrowsingContextProcessor,
    /// script.* commands.
    pub script: script::ScriptProcessor,
    /// network.* commands.
    pub network: network::NetworkProcessor,
    /// input.* commands.
    pub input: input::InputProcessor,
    /// storage.* commands.
    pub storage: storage::StorageProcessor,
    /// permissions.* commands.
    pub permissions: permissions::PermissionsProcessor,
    /// bluetooth.* commands.
    pub bluetooth: bluetooth::BluetoothProcessor,
    /// cdp.* extension commands.
    pub cdp: cdp::CdpProcessor,
}

/// Parses, routes and replies to client commands.
pub struct CommandProcessor {
    queue: Arc<OutgoingQueue>,
    processors: Processors,
}

impl CommandProcessor {
    /// New processor replying through the given queue.
    pub fn new(queue: Arc<OutgoingQueue>, processors: Processors) -> Arc<Self> {
        Arc::new(Self { queue, processors })
    }

    /// Handle one raw frame from the transport.
    ///
    /// Must be called in wire order: the reply slot is reserved here,
    /// which is what keeps replies in command order.
    #[instrument(level = "debug", skip(self, frame))]
    pub async fn handle_frame(self: &Arc<Self>, frame: String) {
        let command = match parse_command(&frame) {
            Ok(command) => command,
            Err(parse_error) => {
                debug!(error = %parse_error.error, "command frame rejected");
                let reply = OutgoingFrame::error(
                    parse_error.id,
                    &parse_error.error,
                    parse_error.channel.clone(),
                );
                self.queue.enqueue_ready(parse_error.channel, reply).await;
                return;
            }
        };

        let reply_slot = self.queue.enqueue_pending(command.channel.clone()).await;
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let id = command.id;
            let channel = command.channel.clone();
            let reply = match this.route(command).await {
                Ok(result) => OutgoingFrame::success(id, result, channel),
                Err(error) => OutgoingFrame::error(Some(id), &error, channel),
            };
            let _ = reply_slot.send(reply);
        });
    }

    async fn route(&self, command: Command) -> Result<Value> {
        let method = command.method.clone();
        let Some((module, operation)) = method.split_once('.') else {
            return Err(BidiError::new(
                ErrorCode::UnknownCommand,
                format!("malformed method {method:?}"),
            ));
        };
        // The cdp extension module is also reachable under its vendor
        // prefix.
        let module = module.strip_prefix("goog:").unwrap_or(module);

        debug!(method = %method, id = command.id, "dispatching command");
        let p = &self.processors;
        match module {
            "session" => p.session.handle(operation, command).await,
            "browser" => p.browser.handle(operation, command).await,
            "browsingContext" => p.browsing_context.handle(operation, command).await,
            "script" => p.script.handle(operation, command).await,
            "network" => p.network.handle(operation, command).await,
            "input" => p.input.handle(operation, command).await,
            "storage" => p.storage.handle(operation, command).await,
            "permissions" => p.permissions.handle(operation, command).await,
            "bluetooth" => p.bluetooth.handle(operation, command).await,
            "cdp" => p.cdp.handle(operation, command).await,
            _ => Err(BidiError::new(
                ErrorCode::UnknownCommand,
                format!("unknown module {module:?}"),
            )),
        }
    }
}

/// Reject an unknown operation inside a known module.
pub(crate) fn unknown_operation(module: &str, operation: &str) -> BidiError {
    BidiError::new(
        ErrorCode::UnknownCommand,
        format!("unknown command {module}.{operation}"),
    )
}

/// Parse command params into their typed form. An absent `params` field
/// parses like an empty object.
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(command: &Command) -> Result<T> {
    let params = if command.params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        command.params.clone()
    };
    serde_json::from_value(params).map_err(crate::error::invalid_params)
}

/// The canonical empty result object.
pub(crate) fn empty_result() -> Value {
    Value::Object(serde_json::Map::new())
}
