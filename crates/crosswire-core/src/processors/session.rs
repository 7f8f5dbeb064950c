//! session.* command processor.

use std::sync::Arc;

use crosswire_bidi::session as bidi_session;
use crosswire_bidi::Command;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::Result;
use crate::events::EventManager;

use super::{empty_result, parse_params, unknown_operation};

/// Handles session.* commands.
pub struct SessionProcessor {
    events: Arc<EventManager>,
    shutdown: mpsc::UnboundedSender<()>,
}

impl SessionProcessor {
    /// New processor.
    pub fn new(events: Arc<EventManager>, shutdown: mpsc::UnboundedSender<()>) -> Self {
        Self { events, shutdown }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "status" => Ok(serde_json::to_value(bidi_session::StatusResult {
                // One gateway serves one session; it is already taken.
                ready: false,
                message: "already connected".to_string(),
            })
            .unwrap_or(Value::Null)),
            "new" => {
                let _params: bidi_session::NewParams = parse_params(&command)?;
                Ok(serde_json::to_value(bidi_session::NewResult {
                    session_id: Uuid::new_v4().to_string(),
                    capabilities: json!({
                        "acceptInsecureCerts": false,
                        "browserName": "chrome",
                        "proxy": {},
                        "setWindowRect": false,
                        "webSocketUrl": true,
                    }),
                })
                .unwrap_or(Value::Null))
            }
            "end" => {
                let _ = self.shutdown.send(());
                Ok(empty_result())
            }
            "subscribe" => {
                let params: bidi_session::SubscriptionRequest = parse_params(&command)?;
                let subscription = self
                    .events
                    .subscribe(
                        params.events,
                        params.contexts,
                        params.user_contexts,
                        command.channel.clone(),
                    )
                    .await?;
                Ok(
                    serde_json::to_value(bidi_session::SubscribeResult { subscription })
                        .unwrap_or(Value::Null),
                )
            }
            "unsubscribe" => {
                let params: bidi_session::UnsubscribeParams = parse_params(&command)?;
                match params {
                    bidi_session::UnsubscribeParams::ByIds { subscriptions } => {
                        self.events.unsubscribe_by_ids(&subscriptions).await?;
                    }
                    bidi_session::UnsubscribeParams::ByAttributes { events, .. } => {
                        self.events
                            .unsubscribe_by_attributes(&events, command.channel.as_deref())
                            .await?;
                    }
                }
                Ok(empty_result())
            }
            other => Err(unknown_operation("session", other)),
        }
    }
}
