//! Scripting support: preload scripts, shared node ids, and the value
//! bridge between BiDi and CDP representations.

pub mod shared_id;
pub mod values;

use std::collections::HashMap;
use std::sync::Arc;

use crosswire_bidi::{BidiError, ErrorCode};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// One registered preload script.
#[derive(Debug, Clone)]
pub struct PreloadScript {
    /// Script id.
    pub id: String,
    /// The function declaration to run at document start.
    pub function_declaration: String,
    /// Sandbox to run in, when isolated.
    pub sandbox: Option<String>,
    /// Restrict to these top-level contexts.
    pub contexts: Option<Vec<String>>,
    /// Restrict to these user contexts.
    pub user_contexts: Option<Vec<String>>,
    /// CDP script identifiers per target, for idempotent install and
    /// complete removal.
    pub installed: HashMap<String, String>,
}

impl PreloadScript {
    /// Whether this script applies to a target serving the given
    /// top-level context and user context.
    pub fn qualifies(&self, top_level_context: &str, user_context: &str) -> bool {
        if let Some(contexts) = &self.contexts {
            return contexts.iter().any(|c| c == top_level_context);
        }
        if let Some(user_contexts) = &self.user_contexts {
            return user_contexts.iter().any(|uc| uc == user_context);
        }
        true
    }

    /// The source text handed to Page.addScriptToEvaluateOnNewDocument.
    pub fn source(&self) -> String {
        format!("({})()", self.function_declaration)
    }
}

/// Storage of preload scripts.
#[derive(Debug, Default)]
pub struct PreloadScriptStorage {
    scripts: Mutex<HashMap<String, PreloadScript>>,
}

impl PreloadScriptStorage {
    /// New empty storage.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a script; returns its id.
    pub async fn add(
        &self,
        function_declaration: String,
        sandbox: Option<String>,
        contexts: Option<Vec<String>>,
        user_contexts: Option<Vec<String>>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        debug!(script = %id, "preload script added");
        self.scripts.lock().await.insert(
            id.clone(),
            PreloadScript {
                id: id.clone(),
                function_declaration,
                sandbox,
                contexts,
                user_contexts,
                installed: HashMap::new(),
            },
        );
        id
    }

    /// Remove a script, returning its per-target install records so the
    /// caller can uninstall from CDP.
    ///
    /// # Errors
    ///
    /// `no such script` when the id is unknown.
    pub async fn remove(&self, id: &str) -> Result<PreloadScript, BidiError> {
        self.scripts.lock().await.remove(id).ok_or_else(|| {
            BidiError::new(ErrorCode::NoSuchScript, format!("script {id} not found"))
        })
    }

    /// Scripts qualifying for a target, skipping already-installed ones.
    pub async fn pending_for_target(
        &self,
        target_id: &str,
        top_level_context: &str,
        user_context: &str,
    ) -> Vec<PreloadScript> {
        let scripts = self.scripts.lock().await;
        scripts
            .values()
            .filter(|s| s.qualifies(top_level_context, user_context))
            .filter(|s| !s.installed.contains_key(target_id))
            .cloned()
            .collect()
    }

    /// Record a completed install.
    pub async fn mark_installed(&self, script_id: &str, target_id: &str, cdp_identifier: String) {
        let mut scripts = self.scripts.lock().await;
        if let Some(script) = scripts.get_mut(script_id) {
            script
                .installed
                .insert(target_id.to_string(), cdp_identifier);
        }
    }

    /// Forget install records of a detached target.
    pub async fn forget_target(&self, target_id: &str) {
        let mut scripts = self.scripts.lock().await;
        for script in scripts.values_mut() {
            script.installed.remove(target_id);
        }
    }
}

#[cfg(test)]
mod tests;
