//! CDP message framing types and the text-frame transport boundary.
//!
//! The mux does not care where frames come from; it consumes and produces
//! already-framed JSON text through a pair of channels. [`connect_websocket`]
//! bridges a `tokio-tungstenite` stream onto that boundary, and
//! [`pipe`] builds an in-memory counterpart for tests.

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use crate::error::CdpError;

/// A CDP request message.
#[derive(Debug, Clone, Serialize)]
pub struct CdpRequest {
    /// Unique message ID for matching responses.
    pub id: u64,
    /// CDP method name (e.g., "Target.setAutoAttach").
    pub method: String,
    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Session ID for target-specific commands.
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A CDP response message.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponse {
    /// Message ID matching the request.
    pub id: u64,
    /// Result on success.
    pub result: Option<Value>,
    /// Error on failure.
    pub error: Option<CdpResponseError>,
    /// Session ID if this was a session-specific response.
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Error details in a CDP response.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponseError {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
    /// Additional error data.
    pub data: Option<String>,
}

/// A CDP event message.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpEvent {
    /// Event method name (e.g., "Target.attachedToTarget").
    pub method: String,
    /// Event parameters.
    pub params: Option<Value>,
    /// Session ID if this event came from a specific session.
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

impl CdpEvent {
    /// Deserialize this event's parameters into a typed form.
    ///
    /// Missing parameters deserialize from JSON `null`, so event types with
    /// no mandatory fields still parse.
    pub fn parse_params<T: serde::de::DeserializeOwned>(&self) -> Result<T, CdpError> {
        let params = self.params.clone().unwrap_or(Value::Null);
        serde_json::from_value(params).map_err(CdpError::from)
    }
}

/// An incoming CDP message (either response or event).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CdpMessage {
    /// A response to a previous request.
    Response(CdpResponse),
    /// An event pushed by the browser.
    Event(CdpEvent),
}

/// The frame-level boundary between the mux and whatever carries the bytes.
///
/// `outgoing` receives frames the mux wants written; `incoming` is fed with
/// frames read off the wire. Dropping `incoming`'s sender signals
/// connection loss to the mux.
#[derive(Debug)]
pub struct FramePipe {
    /// Frames to be written to the browser.
    pub outgoing: mpsc::Receiver<String>,
    /// Frames read from the browser.
    pub incoming: mpsc::Sender<String>,
}

/// Channel capacity for frame queues.
const FRAME_QUEUE_SIZE: usize = 256;

/// Build the channel pair connecting a mux to a frame carrier.
///
/// Returns `(mux_side, carrier_side)`: the first tuple goes into
/// [`crate::CdpMux::new`], the second is handed to the I/O adapter (or kept
/// by a test to play the browser).
pub fn pipe() -> ((mpsc::Sender<String>, mpsc::Receiver<String>), FramePipe) {
    let (out_tx, out_rx) = mpsc::channel(FRAME_QUEUE_SIZE);
    let (in_tx, in_rx) = mpsc::channel(FRAME_QUEUE_SIZE);
    (
        (out_tx, in_rx),
        FramePipe {
            outgoing: out_rx,
            incoming: in_tx,
        },
    )
}

/// Connect to a CDP WebSocket endpoint and pump its frames through a pipe.
///
/// Spawns one task per direction; both end when the socket closes, which
/// drops the `incoming` sender and lets the mux observe the loss.
///
/// # Errors
///
/// Returns an error if the WebSocket handshake fails.
pub async fn connect_websocket(
    ws_url: &str,
) -> Result<(mpsc::Sender<String>, mpsc::Receiver<String>), CdpError> {
    info!(ws_url = %ws_url, "connecting to CDP WebSocket endpoint");
    let (ws_stream, response) = tokio_tungstenite::connect_async(ws_url).await?;
    debug!(status = %response.status(), "WebSocket connection established");

    let (mut write, mut read) = ws_stream.split();
    let (mux_side, mut carrier) = pipe();

    tokio::spawn(async move {
        while let Some(frame) = carrier.outgoing.recv().await {
            trace!(frame_len = frame.len(), "writing CDP frame");
            if write.send(Message::Text(frame.into())).await.is_err() {
                warn!("WebSocket sink closed, ending write loop");
                break;
            }
        }
        debug!("CDP write loop ended");
    });

    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(frame)) => {
                    info!(?frame, "WebSocket closed by remote");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "WebSocket error, ending read loop");
                    break;
                }
                Ok(_) => continue,
            };
            if carrier.incoming.send(text.to_string()).await.is_err() {
                break;
            }
        }
        debug!("CDP read loop ended");
    });

    Ok(mux_side)
}

#[cfg(test)]
mod tests;
