//! Subscription bookkeeping.
//!
//! Subscriptions are kept in creation order; channels are remembered in
//! the order they first subscribed, which is also the delivery order.
//! The same (events, contexts, channel) tuple may be subscribed several
//! times; removing one id leaves the overlapping ones intact.

use crosswire_bidi::{BidiError, ErrorCode};
use uuid::Uuid;

/// Event names the mapper can deliver, by module.
const KNOWN_EVENTS: &[&str] = &[
    "browsingContext.contextCreated",
    "browsingContext.contextDestroyed",
    "browsingContext.domContentLoaded",
    "browsingContext.fragmentNavigated",
    "browsingContext.load",
    "browsingContext.navigationAborted",
    "browsingContext.navigationFailed",
    "browsingContext.navigationStarted",
    "browsingContext.userPromptClosed",
    "browsingContext.userPromptOpened",
    "log.entryAdded",
    "network.authRequired",
    "network.beforeRequestSent",
    "network.fetchError",
    "network.responseCompleted",
    "network.responseStarted",
    "script.realmCreated",
    "script.realmDestroyed",
];

/// Module prefixes accepted as whole-module subscriptions.
const KNOWN_MODULES: &[&str] = &["browsingContext", "log", "network", "script"];

/// Whether a subscription entry (event name or module prefix) is valid.
pub fn is_known_subscription_name(name: &str) -> bool {
    KNOWN_EVENTS.contains(&name) || KNOWN_MODULES.contains(&name)
}

/// Whether a subscription entry covers a concrete event name.
fn entry_covers(entry: &str, event: &str) -> bool {
    entry == event || event.split('.').next() == Some(entry)
}

/// One subscription.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Subscription id.
    pub id: String,
    /// Channel the subscription delivers to.
    pub channel: Option<String>,
    /// Subscribed event names / module prefixes.
    pub events: Vec<String>,
    /// Top-level contexts the subscription is restricted to.
    pub contexts: Option<Vec<String>>,
    /// User contexts the subscription is restricted to.
    pub user_contexts: Option<Vec<String>>,
}

impl Subscription {
    /// Whether this subscription is global (unrestricted).
    pub fn is_global(&self) -> bool {
        self.contexts.is_none() && self.user_contexts.is_none()
    }

    /// Whether this subscription names the event.
    pub fn covers_event(&self, event: &str) -> bool {
        self.events.iter().any(|entry| entry_covers(entry, event))
    }

    /// Whether this subscription covers an event in the given scope.
    ///
    /// `scope` is the (top-level context, user context) pair of the
    /// event's originating context; `None` for events with no context,
    /// which only global subscriptions receive.
    pub fn covers(&self, event: &str, scope: Option<&(String, String)>) -> bool {
        if !self.covers_event(event) {
            return false;
        }
        if self.is_global() {
            return true;
        }
        let Some((top_level, user_context)) = scope else {
            return false;
        };
        if let Some(contexts) = &self.contexts {
            if contexts.iter().any(|c| c == top_level) {
                return true;
            }
        }
        if let Some(user_contexts) = &self.user_contexts {
            if user_contexts.iter().any(|uc| uc == user_context) {
                return true;
            }
        }
        false
    }
}

/// The subscription set of one mapper session.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    subscriptions: Vec<Subscription>,
    channel_order: Vec<Option<String>>,
}

impl SubscriptionManager {
    /// New empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription.
    ///
    /// # Errors
    ///
    /// `invalid argument` when an event name is unknown or the event
    /// list is empty.
    pub fn add(
        &mut self,
        events: Vec<String>,
        contexts: Option<Vec<String>>,
        user_contexts: Option<Vec<String>>,
        channel: Option<String>,
    ) -> Result<Subscription, BidiError> {
        if events.is_empty() {
            return Err(BidiError::invalid_argument("events must not be empty"));
        }
        for event in &events {
            if !is_known_subscription_name(event) {
                return Err(BidiError::invalid_argument(format!(
                    "unknown event name {event:?}"
                )));
            }
        }
        if !self.channel_order.contains(&channel) {
            self.channel_order.push(channel.clone());
        }
        let subscription = Subscription {
            id: Uuid::new_v4().to_string(),
            channel,
            events,
            contexts,
            user_contexts,
        };
        self.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    /// Remove subscriptions by id.
    ///
    /// # Errors
    ///
    /// `invalid argument` when any id is unknown; nothing is removed in
    /// that case.
    pub fn remove_by_ids(&mut self, ids: &[String]) -> Result<(), BidiError> {
        for id in ids {
            if !self.subscriptions.iter().any(|s| &s.id == id) {
                return Err(BidiError::invalid_argument(format!(
                    "no such subscription {id:?}"
                )));
            }
        }
        self.subscriptions.retain(|s| !ids.contains(&s.id));
        Ok(())
    }

    /// Remove subscriptions by the attributes they were created with
    /// (the legacy unsubscribe form). Matches whole subscriptions on the
    /// same channel whose event list intersects the request.
    ///
    /// # Errors
    ///
    /// `invalid argument` when an event has no matching subscription.
    pub fn remove_by_attributes(
        &mut self,
        events: &[String],
        channel: Option<&str>,
    ) -> Result<(), BidiError> {
        for event in events {
            if !is_known_subscription_name(event) {
                return Err(BidiError::invalid_argument(format!(
                    "unknown event name {event:?}"
                )));
            }
            let any = self
                .subscriptions
                .iter()
                .any(|s| s.channel.as_deref() == channel && s.events.iter().any(|e| e == event));
            if !any {
                return Err(BidiError::invalid_argument(format!(
                    "no subscription for event {event:?}"
                )));
            }
        }
        self.subscriptions.retain(|s| {
            !(s.channel.as_deref() == channel && s.events.iter().any(|e| events.contains(e)))
        });
        Ok(())
    }

    /// Channels to deliver an event to, in first-subscription order.
    pub fn channels_for(
        &self,
        event: &str,
        scope: Option<&(String, String)>,
    ) -> Vec<Option<String>> {
        self.channel_order
            .iter()
            .filter(|channel| {
                self.subscriptions
                    .iter()
                    .filter(|s| s.channel == **channel)
                    .any(|s| s.covers(event, scope))
            })
            .cloned()
            .collect()
    }

    /// Whether anything subscribes to the event at all, for publishers
    /// that want to skip producing it.
    pub fn is_subscribed(&self, event: &str) -> bool {
        self.subscriptions.iter().any(|s| s.covers_event(event))
    }
}

#[cfg(test)]
mod tests;
