//! Event routing.
//!
//! The [`EventManager`] stamps every event with a session-wide ordinal,
//! fans it out to the channels whose subscriptions cover it, keeps the
//! bounded replay buffer for buffered event names, and nudges the
//! target layer to reconcile CDP domain enablement after every
//! subscribe/unsubscribe.

pub mod outgoing;
pub mod subscriptions;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crosswire_bidi::{BidiError, OutgoingFrame};
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::context::BrowsingContextStorage;
pub use outgoing::OutgoingQueue;
pub use subscriptions::{Subscription, SubscriptionManager};

/// Replay buffer size per (event, context) pair.
const BUFFER_CAP: usize = 100;

/// Event names that are buffered for replay to late subscribers.
fn is_buffered(method: &str) -> bool {
    method == "log.entryAdded"
}

#[derive(Debug, Clone)]
struct BufferedEvent {
    ordinal: u64,
    params: Value,
}

#[derive(Debug, Default)]
struct Inner {
    subscriptions: SubscriptionManager,
    buffers: HashMap<(String, Option<String>), VecDeque<BufferedEvent>>,
    last_sent: HashMap<(String, Option<String>, Option<String>), u64>,
}

/// The session-wide event router.
#[derive(Debug)]
pub struct EventManager {
    inner: Mutex<Inner>,
    ordinal: AtomicU64,
    queue: Arc<OutgoingQueue>,
    contexts: Arc<BrowsingContextStorage>,
    reconcile: Mutex<Option<mpsc::UnboundedSender<()>>>,
}

impl EventManager {
    /// New manager delivering through the given queue.
    pub fn new(queue: Arc<OutgoingQueue>, contexts: Arc<BrowsingContextStorage>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
            ordinal: AtomicU64::new(1),
            queue,
            contexts,
            reconcile: Mutex::new(None),
        })
    }

    /// Install the channel poked after each subscription change.
    pub async fn set_reconcile_notifier(&self, notifier: mpsc::UnboundedSender<()>) {
        *self.reconcile.lock().await = Some(notifier);
    }

    async fn notify_reconcile(&self) {
        if let Some(notifier) = self.reconcile.lock().await.as_ref() {
            let _ = notifier.send(());
        }
    }

    /// Whether any subscription names the event, regardless of scope.
    /// Publishers use this to skip producing events nobody wants.
    pub async fn is_subscribed(&self, event: &str) -> bool {
        self.inner.lock().await.subscriptions.is_subscribed(event)
    }

    /// Publish an event.
    pub async fn emit(&self, method: &str, params: Value, context: Option<String>) {
        let scope = match &context {
            Some(context_id) => self.contexts.scope_of(context_id).await,
            None => None,
        };
        let ordinal = self.ordinal.fetch_add(1, Ordering::Relaxed);

        let channels = {
            let mut inner = self.inner.lock().await;
            if is_buffered(method) {
                let buffer = inner
                    .buffers
                    .entry((method.to_string(), context.clone()))
                    .or_default();
                if buffer.len() == BUFFER_CAP {
                    buffer.pop_front();
                }
                buffer.push_back(BufferedEvent {
                    ordinal,
                    params: params.clone(),
                });
            }
            let channels = inner.subscriptions.channels_for(method, scope.as_ref());
            for channel in &channels {
                inner.last_sent.insert(
                    (method.to_string(), context.clone(), channel.clone()),
                    ordinal,
                );
            }
            channels
        };

        debug!(event = %method, context = ?context, channels = channels.len(), "emitting event");
        for channel in channels {
            let frame = OutgoingFrame::event(method, params.clone(), channel.clone());
            self.queue.enqueue_ready(channel, frame).await;
        }
    }

    /// Create a subscription, replaying buffered events the new
    /// subscription covers and the channel has not seen.
    ///
    /// # Errors
    ///
    /// `invalid argument` for unknown event names; `no such frame` for
    /// unknown context ids.
    pub async fn subscribe(
        &self,
        events: Vec<String>,
        contexts: Option<Vec<String>>,
        user_contexts: Option<Vec<String>>,
        channel: Option<String>,
    ) -> Result<String, BidiError> {
        // Normalize context restrictions to top-level ids up front.
        let contexts = match contexts {
            None => None,
            Some(ids) => {
                let mut top_level = Vec::with_capacity(ids.len());
                for id in &ids {
                    top_level.push(self.contexts.top_level_of(id).await?);
                }
                Some(top_level)
            }
        };

        // Scopes of every buffered context, resolved outside the lock.
        let buffered_contexts: Vec<Option<String>> = {
            let inner = self.inner.lock().await;
            inner.buffers.keys().map(|(_, ctx)| ctx.clone()).collect()
        };
        let mut scopes: HashMap<Option<String>, Option<(String, String)>> = HashMap::new();
        for context in buffered_contexts {
            let scope = match &context {
                Some(id) => self.contexts.scope_of(id).await,
                None => None,
            };
            scopes.insert(context, scope);
        }

        let (subscription_id, replay) = {
            let mut inner = self.inner.lock().await;
            let subscription = inner.subscriptions.add(
                events,
                contexts,
                user_contexts,
                channel.clone(),
            )?;

            // Collect buffered events the new subscription covers and the
            // channel has not been sent yet, in ordinal order.
            let mut replay: Vec<(String, BufferedEvent, Option<String>)> = Vec::new();
            for ((method, context), buffer) in &inner.buffers {
                let scope = scopes.get(context).cloned().flatten();
                if !subscription.covers(method, scope.as_ref()) {
                    continue;
                }
                let seen = inner
                    .last_sent
                    .get(&(method.clone(), context.clone(), channel.clone()))
                    .copied()
                    .unwrap_or(0);
                for event in buffer {
                    if event.ordinal > seen {
                        replay.push((method.clone(), event.clone(), context.clone()));
                    }
                }
            }
            replay.sort_by_key(|(_, event, _)| event.ordinal);
            for (method, event, context) in &replay {
                let key = (method.clone(), context.clone(), channel.clone());
                let entry = inner.last_sent.entry(key).or_insert(0);
                *entry = (*entry).max(event.ordinal);
            }
            (subscription.id, replay)
        };

        for (method, event, _) in replay {
            let frame = OutgoingFrame::event(method, event.params, channel.clone());
            self.queue.enqueue_ready(channel.clone(), frame).await;
        }

        self.notify_reconcile().await;
        Ok(subscription_id)
    }

    /// Remove subscriptions by id.
    pub async fn unsubscribe_by_ids(&self, ids: &[String]) -> Result<(), BidiError> {
        self.inner.lock().await.subscriptions.remove_by_ids(ids)?;
        self.notify_reconcile().await;
        Ok(())
    }

    /// Remove subscriptions by attributes (legacy form).
    pub async fn unsubscribe_by_attributes(
        &self,
        events: &[String],
        channel: Option<&str>,
    ) -> Result<(), BidiError> {
        self.inner
            .lock()
            .await
            .subscriptions
            .remove_by_attributes(events, channel)?;
        self.notify_reconcile().await;
        Ok(())
    }

    /// Drop buffered events of a destroyed context.
    pub async fn forget_context(&self, context_id: &str) {
        let mut inner = self.inner.lock().await;
        inner
            .buffers
            .retain(|(_, context), _| context.as_deref() != Some(context_id));
        inner
            .last_sent
            .retain(|(_, context, _), _| context.as_deref() != Some(context_id));
    }
}

#[cfg(test)]
mod tests;
