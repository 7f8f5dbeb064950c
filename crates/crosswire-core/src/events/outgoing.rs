//! Per-channel outgoing FIFO.
//!
//! Every channel drains its own queue in enqueue order, awaiting each
//! pending reply before sending the next message. Command replies are
//! enqueued (as pending slots) at the moment the command is read off
//! the wire, so clients observe replies in command order no matter how
//! the processors interleave.

use std::collections::HashMap;
use std::sync::Arc;

use crosswire_bidi::OutgoingFrame;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, warn};

/// One queue entry.
enum QueuedMessage {
    /// Already-complete frame.
    Ready(OutgoingFrame),
    /// A reply still being computed.
    Pending(oneshot::Receiver<OutgoingFrame>),
}

/// The per-channel outgoing queues of one mapper session.
#[derive(Debug)]
pub struct OutgoingQueue {
    transport: mpsc::Sender<String>,
    channels: Mutex<HashMap<Option<String>, mpsc::UnboundedSender<QueuedMessage>>>,
}

impl OutgoingQueue {
    /// Queue writing frames into the northbound transport.
    pub fn new(transport: mpsc::Sender<String>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            channels: Mutex::new(HashMap::new()),
        })
    }

    async fn channel_sender(
        &self,
        channel: &Option<String>,
    ) -> mpsc::UnboundedSender<QueuedMessage> {
        let mut channels = self.channels.lock().await;
        if let Some(sender) = channels.get(channel) {
            return sender.clone();
        }
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain(rx, self.transport.clone()));
        channels.insert(channel.clone(), tx.clone());
        tx
    }

    /// Enqueue a complete frame (an event, or a parse-error reply).
    pub async fn enqueue_ready(&self, channel: Option<String>, frame: OutgoingFrame) {
        let sender = self.channel_sender(&channel).await;
        let _ = sender.send(QueuedMessage::Ready(frame));
    }

    /// Reserve the next slot of a channel for a reply still being
    /// computed. The returned sender resolves the slot.
    pub async fn enqueue_pending(&self, channel: Option<String>) -> oneshot::Sender<OutgoingFrame> {
        let sender = self.channel_sender(&channel).await;
        let (tx, rx) = oneshot::channel();
        let _ = sender.send(QueuedMessage::Pending(rx));
        tx
    }
}

async fn drain(mut rx: mpsc::UnboundedReceiver<QueuedMessage>, transport: mpsc::Sender<String>) {
    while let Some(message) = rx.recv().await {
        let frame = match message {
            QueuedMessage::Ready(frame) => frame,
            QueuedMessage::Pending(pending) => match pending.await {
                Ok(frame) => frame,
                Err(_) => {
                    // The command was dropped (session teardown); keep
                    // the queue alive for what follows.
                    debug!("pending reply dropped before completion");
                    continue;
                }
            },
        };
        if transport.send(frame.to_frame()).await.is_err() {
            warn!("northbound transport closed, dropping outgoing queue");
            break;
        }
    }
}

#[cfg(test)]
mod tests;
