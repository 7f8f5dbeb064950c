//! Layered context configuration.
//!
//! Settings cascade from global through user context to top-level
//! browsing context; the effective config for a target is the field-wise
//! overlay of the three layers. One writer (the target reconciliation)
//! applies the result to CDP.

use std::collections::HashMap;
use std::sync::Arc;

use crosswire_bidi::browsing_context::Viewport;
use tokio::sync::Mutex;

/// How user prompts are handled when they open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserPromptHandler {
    /// Leave the prompt open for `browsingContext.handleUserPrompt`.
    #[default]
    Ignore,
    /// Accept immediately.
    Accept,
    /// Dismiss immediately.
    Dismiss,
}

impl UserPromptHandler {
    /// Wire name used in userPromptOpened events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Accept => "accept",
            Self::Dismiss => "dismiss",
        }
    }
}

/// One configuration layer; `None` fields defer to the layer below.
#[derive(Debug, Clone, Default)]
pub struct ContextConfig {
    /// Bypass the network cache.
    pub cache_bypass: Option<bool>,
    /// Viewport override; `Some(None)` clears an inherited override.
    pub viewport: Option<Option<Viewport>>,
    /// Device pixel ratio override.
    pub device_pixel_ratio: Option<Option<f64>>,
    /// User agent override.
    pub user_agent: Option<String>,
    /// Prompt handling policy.
    pub user_prompt_handler: Option<UserPromptHandler>,
}

impl ContextConfig {
    /// Overlay `upper` on top of `self`, field-wise.
    fn overlay(&self, upper: &ContextConfig) -> ContextConfig {
        ContextConfig {
            cache_bypass: upper.cache_bypass.or(self.cache_bypass),
            viewport: upper.viewport.clone().or_else(|| self.viewport.clone()),
            device_pixel_ratio: upper.device_pixel_ratio.or(self.device_pixel_ratio),
            user_agent: upper.user_agent.clone().or_else(|| self.user_agent.clone()),
            user_prompt_handler: upper.user_prompt_handler.or(self.user_prompt_handler),
        }
    }
}

/// Storage of the three configuration layers.
#[derive(Debug, Default)]
pub struct ContextConfigStorage {
    inner: Mutex<Layers>,
}

#[derive(Debug, Default)]
struct Layers {
    global: ContextConfig,
    per_user_context: HashMap<String, ContextConfig>,
    per_context: HashMap<String, ContextConfig>,
}

impl ContextConfigStorage {
    /// New empty storage.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Update the global layer.
    pub async fn update_global(&self, f: impl FnOnce(&mut ContextConfig)) {
        let mut layers = self.inner.lock().await;
        f(&mut layers.global);
    }

    /// Update one user context's layer.
    pub async fn update_user_context(&self, user_context: &str, f: impl FnOnce(&mut ContextConfig)) {
        let mut layers = self.inner.lock().await;
        f(layers
            .per_user_context
            .entry(user_context.to_string())
            .or_default());
    }

    /// Update one top-level context's layer.
    pub async fn update_context(&self, context: &str, f: impl FnOnce(&mut ContextConfig)) {
        let mut layers = self.inner.lock().await;
        f(layers.per_context.entry(context.to_string()).or_default());
    }

    /// Drop the layer of a destroyed context.
    pub async fn remove_context(&self, context: &str) {
        self.inner.lock().await.per_context.remove(context);
    }

    /// Drop the layer of a removed user context.
    pub async fn remove_user_context(&self, user_context: &str) {
        self.inner
            .lock()
            .await
            .per_user_context
            .remove(user_context);
    }

    /// The effective configuration for a top-level context.
    pub async fn effective(&self, user_context: &str, context: Option<&str>) -> ContextConfig {
        let layers = self.inner.lock().await;
        let mut config = layers.global.clone();
        if let Some(uc) = layers.per_user_context.get(user_context) {
            config = config.overlay(uc);
        }
        if let Some(ctx) = context.and_then(|c| layers.per_context.get(c)) {
            config = config.overlay(ctx);
        }
        config
    }
}

#[cfg(test)]
mod tests;
