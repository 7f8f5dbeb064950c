//! Browsing context storage.
//!
//! The live tree of navigables. Contexts reference each other by id only;
//! everything that needs a context looks it up here at use time.

use std::collections::HashMap;
use std::sync::Arc;

use crosswire_bidi::{browsing_context as bc, BidiError};
use tokio::sync::Mutex;
use tracing::debug;

use crate::navigation::NavigationTracker;

/// Browsing context identifier: the CDP target id for top-level contexts,
/// the CDP frame id for children (they coincide for top frames).
pub type ContextId = String;

/// The default user context id.
pub const DEFAULT_USER_CONTEXT: &str = "default";

/// One navigable frame.
#[derive(Debug)]
pub struct BrowsingContext {
    /// Context id.
    pub id: ContextId,
    /// Parent context, `None` for top-level.
    pub parent_id: Option<ContextId>,
    /// Child context ids, in attach order.
    pub children: Vec<ContextId>,
    /// Owning user context.
    pub user_context_id: String,
    /// Current document URL.
    pub url: String,
    /// Loader id of the current document.
    pub navigable_id: Option<String>,
    /// CDP session currently driving this context (swaps on OOPIF moves).
    pub session_id: Option<String>,
    /// Context that opened this one, for script-opened windows.
    pub original_opener: Option<ContextId>,
    /// Set when target initialization failed; commands against the context
    /// report `unknown error`.
    pub failed: bool,
    /// The user prompt currently open in this context, if any.
    pub open_prompt: Option<OpenPrompt>,
    /// Navigation state machine for this context.
    pub navigation: NavigationTracker,
}

/// A user prompt waiting to be handled.
#[derive(Debug, Clone)]
pub struct OpenPrompt {
    /// Prompt kind ("alert", "confirm", "prompt", "beforeunload").
    pub prompt_type: String,
    /// Prompt message.
    pub message: String,
}

impl BrowsingContext {
    fn new(id: ContextId, parent_id: Option<ContextId>, user_context_id: String) -> Self {
        let navigation = NavigationTracker::new(id.clone());
        Self {
            id,
            parent_id,
            children: Vec::new(),
            user_context_id,
            url: "about:blank".to_string(),
            navigable_id: None,
            session_id: None,
            original_opener: None,
            failed: false,
            open_prompt: None,
            navigation,
        }
    }
}

/// Arena of browsing contexts, keyed by id.
#[derive(Debug, Default)]
pub struct BrowsingContextStorage {
    contexts: Mutex<HashMap<ContextId, BrowsingContext>>,
    created: tokio::sync::Notify,
}

impl BrowsingContextStorage {
    /// New empty storage.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a context; returns false when it already existed.
    pub async fn create(
        &self,
        id: &str,
        parent_id: Option<&str>,
        user_context_id: Option<&str>,
    ) -> bool {
        let mut contexts = self.contexts.lock().await;
        if contexts.contains_key(id) {
            return false;
        }
        let user_context = match (user_context_id, parent_id) {
            (Some(uc), _) => uc.to_string(),
            // Children inherit the parent's user context.
            (None, Some(parent)) => contexts
                .get(parent)
                .map(|p| p.user_context_id.clone())
                .unwrap_or_else(|| DEFAULT_USER_CONTEXT.to_string()),
            (None, None) => DEFAULT_USER_CONTEXT.to_string(),
        };
        if let Some(parent) = parent_id {
            if let Some(parent_ctx) = contexts.get_mut(parent) {
                parent_ctx.children.push(id.to_string());
            }
        }
        debug!(context = %id, parent = ?parent_id, "browsing context created");
        contexts.insert(
            id.to_string(),
            BrowsingContext::new(id.to_string(), parent_id.map(ToString::to_string), user_context),
        );
        drop(contexts);
        self.created.notify_waiters();
        true
    }

    /// Wait until a context shows up in storage (it is created from the
    /// asynchronous `Target.attachedToTarget` path).
    pub async fn wait_for_context(&self, id: &str) -> bool {
        for _ in 0..100u32 {
            if self.has(id).await {
                return true;
            }
            let notified = self.created.notified();
            if self.has(id).await {
                return true;
            }
            let _ = tokio::time::timeout(std::time::Duration::from_millis(100), notified).await;
        }
        false
    }

    /// Whether the context exists.
    pub async fn has(&self, id: &str) -> bool {
        self.contexts.lock().await.contains_key(id)
    }

    /// Run a closure over the context, or fail with `no such frame`.
    pub async fn with<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut BrowsingContext) -> R,
    ) -> Result<R, BidiError> {
        let mut contexts = self.contexts.lock().await;
        contexts
            .get_mut(id)
            .map(f)
            .ok_or_else(|| BidiError::no_such_frame(id))
    }

    /// The top-level ancestor of a context.
    pub async fn top_level_of(&self, id: &str) -> Result<ContextId, BidiError> {
        let contexts = self.contexts.lock().await;
        let mut current = contexts
            .get(id)
            .ok_or_else(|| BidiError::no_such_frame(id))?;
        while let Some(parent) = &current.parent_id {
            current = contexts
                .get(parent)
                .ok_or_else(|| BidiError::no_such_frame(parent))?;
        }
        Ok(current.id.clone())
    }

    /// The (top-level id, user context id) pair for event scoping.
    pub async fn scope_of(&self, id: &str) -> Option<(ContextId, String)> {
        let contexts = self.contexts.lock().await;
        let mut current = contexts.get(id)?;
        let user_context = current.user_context_id.clone();
        while let Some(parent) = &current.parent_id {
            match contexts.get(parent) {
                Some(p) => current = p,
                None => break,
            }
        }
        Some((current.id.clone(), user_context))
    }

    /// The CDP session currently driving a context.
    pub async fn session_of(&self, id: &str) -> Result<Option<String>, BidiError> {
        self.with(id, |ctx| ctx.session_id.clone()).await
    }

    /// Ids of every top-level context, in no particular order.
    pub async fn top_level_ids(&self) -> Vec<ContextId> {
        let contexts = self.contexts.lock().await;
        contexts
            .values()
            .filter(|c| c.parent_id.is_none())
            .map(|c| c.id.clone())
            .collect()
    }

    /// All context ids under (and including) the given roots.
    pub async fn subtree_ids(&self, roots: &[ContextId]) -> Vec<ContextId> {
        let contexts = self.contexts.lock().await;
        let mut out = Vec::new();
        let mut stack: Vec<ContextId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if let Some(ctx) = contexts.get(&id) {
                stack.extend(ctx.children.iter().cloned());
                out.push(id);
            }
        }
        out
    }

    /// Delete a context and its descendants, children first.
    ///
    /// Returns the deleted ids in deletion order (leaves before roots),
    /// so callers can emit `contextDestroyed` bottom-up.
    pub async fn delete_subtree(&self, id: &str) -> Vec<ContextId> {
        let mut contexts = self.contexts.lock().await;
        let mut order = Vec::new();
        collect_subtree(&contexts, id, &mut order);
        // Leaves first.
        order.reverse();
        for ctx_id in &order {
            contexts.remove(ctx_id);
            debug!(context = %ctx_id, "browsing context deleted");
        }
        // Unlink from the parent's child list.
        for ctx in contexts.values_mut() {
            ctx.children.retain(|c| c != id);
        }
        order
    }

    /// Assemble the getTree info node for a context.
    pub async fn tree_info(
        &self,
        id: &str,
        max_depth: Option<u64>,
        include_parent: bool,
    ) -> Result<bc::Info, BidiError> {
        let contexts = self.contexts.lock().await;
        build_info(&contexts, id, max_depth, include_parent)
            .ok_or_else(|| BidiError::no_such_frame(id))
    }
}

fn collect_subtree(
    contexts: &HashMap<ContextId, BrowsingContext>,
    id: &str,
    out: &mut Vec<ContextId>,
) {
    let Some(ctx) = contexts.get(id) else {
        return;
    };
    out.push(ctx.id.clone());
    for child in &ctx.children {
        collect_subtree(contexts, child, out);
    }
}

fn build_info(
    contexts: &HashMap<ContextId, BrowsingContext>,
    id: &str,
    max_depth: Option<u64>,
    include_parent: bool,
) -> Option<bc::Info> {
    let ctx = contexts.get(id)?;
    let children = match max_depth {
        Some(0) => None,
        _ => Some(
            ctx.children
                .iter()
                .filter_map(|child| {
                    build_info(contexts, child, max_depth.map(|d| d - 1), false)
                })
                .collect(),
        ),
    };
    Some(bc::Info {
        context: ctx.id.clone(),
        url: ctx.url.clone(),
        children,
        parent: if include_parent {
            ctx.parent_id.clone()
        } else {
            None
        },
        user_context: ctx.user_context_id.clone(),
        original_opener: ctx.original_opener.clone(),
    })
}

#[cfg(test)]
mod tests;
