//! Frame multiplexer over one browser connection.
//!
//! A single duplex frame stream carries commands and events for the root
//! browser target and every auto-attached child target. [`CdpMux`] assigns
//! command ids, correlates responses, and fans events out; [`CdpSession`]
//! is a cheap view restricted to one `sessionId`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::{debug, error, trace, warn};

use crate::error::CdpError;
use crate::transport::{CdpEvent, CdpMessage, CdpRequest, CdpResponse};

/// Buffer size for the event broadcast channel.
const EVENT_CHANNEL_SIZE: usize = 1024;

/// Multiplexed CDP connection.
#[derive(Debug)]
pub struct CdpMux {
    /// Sender for outgoing requests.
    tx: mpsc::Sender<String>,
    /// Event fan-out; taken by the read loop on connection loss so
    /// subscribers observe a terminal close.
    event_tx: Arc<Mutex<Option<broadcast::Sender<CdpEvent>>>>,
    /// Pending responses waiting for completion.
    pending: Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>>,
    /// Atomic counter for message IDs.
    message_id: AtomicU64,
    /// Set once the read loop exits.
    closed: Arc<AtomicBool>,
}

impl CdpMux {
    /// Build a mux over a frame channel pair (see [`crate::transport::pipe`]).
    pub fn new(outgoing: mpsc::Sender<String>, incoming: mpsc::Receiver<String>) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let mux = Arc::new(Self {
            tx: outgoing,
            event_tx: Arc::new(Mutex::new(Some(event_tx))),
            pending: Arc::new(Mutex::new(HashMap::new())),
            message_id: AtomicU64::new(1),
            closed: Arc::new(AtomicBool::new(false)),
        });

        let reader = Arc::clone(&mux);
        tokio::spawn(reader.read_loop(incoming));
        mux
    }

    /// Background task that demultiplexes incoming frames.
    async fn read_loop(self: Arc<Self>, mut incoming: mpsc::Receiver<String>) {
        debug!("CDP mux read loop started");
        while let Some(frame) = incoming.recv().await {
            let msg: CdpMessage = match serde_json::from_str(&frame) {
                Ok(m) => m,
                Err(e) => {
                    error!(error = %e, "failed to parse CDP frame");
                    continue;
                }
            };

            match msg {
                CdpMessage::Response(resp) => {
                    trace!(id = resp.id, has_error = resp.error.is_some(), "CDP response");
                    let mut pending = self.pending.lock().await;
                    if let Some(sender) = pending.remove(&resp.id) {
                        let _ = sender.send(resp);
                    } else {
                        warn!(id = resp.id, "response for unknown request ID");
                    }
                }
                CdpMessage::Event(event) => {
                    trace!(method = %event.method, session_id = ?event.session_id, "CDP event");
                    let guard = self.event_tx.lock().await;
                    if let Some(tx) = guard.as_ref() {
                        // Ignore lagging/no receivers.
                        let _ = tx.send(event);
                    }
                }
            }
        }

        debug!("CDP mux read loop ended, failing pending commands");
        self.closed.store(true, Ordering::SeqCst);

        // Dropping the sinks resolves every in-flight command with
        // ConnectionLost on the caller side.
        self.pending.lock().await.clear();
        // Dropping the last broadcast sender terminates every subscriber.
        self.event_tx.lock().await.take();
    }

    /// Whether the underlying connection has been lost.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a raw CDP command and wait for its result value.
    ///
    /// # Errors
    ///
    /// Fails with [`CdpError::Protocol`] when the browser reports an error,
    /// and [`CdpError::ConnectionLost`] when the connection drops before
    /// the reply arrives.
    pub async fn send_raw(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        if self.is_closed() {
            return Err(CdpError::ConnectionLost);
        }

        let id = self.message_id.fetch_add(1, Ordering::Relaxed);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(ToString::to_string),
        };
        let frame = serde_json::to_string(&request)?;

        let (resp_tx, resp_rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id, resp_tx);
        }

        trace!(id = id, method = %method, session_id = ?session_id, "sending CDP command");
        if self.tx.send(frame).await.is_err() {
            self.pending.lock().await.remove(&id);
            return Err(CdpError::ConnectionLost);
        }

        let response = resp_rx.await.map_err(|_| CdpError::ConnectionLost)?;
        if let Some(err) = response.error {
            debug!(id = id, method = %method, code = err.code, message = %err.message,
                "CDP command failed");
            return Err(CdpError::Protocol {
                code: err.code,
                message: err.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Subscribe to every event on the connection.
    ///
    /// When the connection has already closed, the returned receiver
    /// reports `Closed` immediately.
    pub async fn subscribe_events(&self) -> broadcast::Receiver<CdpEvent> {
        let guard = self.event_tx.lock().await;
        match guard.as_ref() {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    /// A session-scoped view over this mux.
    ///
    /// `session_id: None` addresses the browser root target.
    pub fn session(self: &Arc<Self>, session_id: Option<String>) -> CdpSession {
        CdpSession {
            mux: Arc::clone(self),
            session_id,
        }
    }
}

/// View over [`CdpMux`] restricted to one CDP session.
#[derive(Debug, Clone)]
pub struct CdpSession {
    mux: Arc<CdpMux>,
    session_id: Option<String>,
}

impl CdpSession {
    /// The session id this view is bound to (`None` = browser root).
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The underlying mux.
    pub fn mux(&self) -> &Arc<CdpMux> {
        &self.mux
    }

    /// Send a typed command on this session.
    ///
    /// # Errors
    ///
    /// See [`CdpMux::send_raw`].
    pub async fn send_command<P, R>(&self, method: &str, params: Option<P>) -> Result<R, CdpError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params = params.map(serde_json::to_value).transpose()?;
        let result = self
            .mux
            .send_raw(method, params, self.session_id.as_deref())
            .await?;
        serde_json::from_value(result).map_err(CdpError::from)
    }

    /// Send a raw command on this session, keeping the result as JSON.
    ///
    /// # Errors
    ///
    /// See [`CdpMux::send_raw`].
    pub async fn send_raw(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.mux
            .send_raw(method, params, self.session_id.as_deref())
            .await
    }

    /// Subscribe to this session's events.
    ///
    /// The returned stream yields events in connection arrival order and
    /// terminates when the connection closes.
    pub async fn subscribe_events(&self) -> SessionEvents {
        SessionEvents {
            rx: self.mux.subscribe_events().await,
            session_id: self.session_id.clone(),
        }
    }
}

/// Event stream filtered down to one session.
#[derive(Debug)]
pub struct SessionEvents {
    rx: broadcast::Receiver<CdpEvent>,
    session_id: Option<String>,
}

impl SessionEvents {
    /// Receive the next event for this session.
    ///
    /// Returns `None` once the connection has closed. Events dropped by a
    /// lagging subscriber are skipped with a warning.
    pub async fn recv(&mut self) -> Option<CdpEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if event.session_id == self.session_id {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests;
