//! Realm storage.
//!
//! JavaScript execution contexts across every attached target, indexed by
//! the process-unique realm id. Window realms belong to a browsing
//! context (default world or a named sandbox); worker realms belong to
//! their target only.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crosswire_bidi::script::{RealmInfo, RealmType};
use crosswire_bidi::{BidiError, ErrorCode};
use tokio::sync::Mutex;
use tracing::debug;

/// Process-unique realm identifier (CDP `uniqueId`).
pub type RealmId = String;

/// One JavaScript realm.
#[derive(Debug, Clone)]
pub struct Realm {
    /// Realm id.
    pub id: RealmId,
    /// Numeric execution context id, scoped to its session.
    pub execution_context_id: i64,
    /// Realm origin.
    pub origin: String,
    /// Realm kind.
    pub kind: RealmType,
    /// Owning browsing context, for window realms.
    pub context_id: Option<String>,
    /// Sandbox name, for isolated-world realms.
    pub sandbox: Option<String>,
    /// CDP session the realm lives on (`None` = browser root).
    pub session_id: Option<String>,
    /// Internal realms are hidden from getRealms and realm events.
    pub is_hidden: bool,
    /// Object ids retained on behalf of the client.
    pub handles: HashSet<String>,
}

impl Realm {
    /// The wire description of this realm.
    pub fn info(&self) -> RealmInfo {
        RealmInfo {
            realm: self.id.clone(),
            origin: self.origin.clone(),
            realm_type: self.kind,
            context: self.context_id.clone(),
            sandbox: self.sandbox.clone(),
        }
    }
}

/// Arena of realms, keyed by realm id.
#[derive(Debug, Default)]
pub struct RealmStorage {
    realms: Mutex<HashMap<RealmId, Realm>>,
}

impl RealmStorage {
    /// New empty storage.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a realm; returns false if the id already existed.
    pub async fn insert(&self, realm: Realm) -> bool {
        let mut realms = self.realms.lock().await;
        if realms.contains_key(&realm.id) {
            return false;
        }
        debug!(realm = %realm.id, kind = ?realm.kind, context = ?realm.context_id, "realm created");
        realms.insert(realm.id.clone(), realm);
        true
    }

    /// Fetch a realm by id; unknown realms surface as `invalid argument`.
    pub async fn get(&self, id: &str) -> Result<Realm, BidiError> {
        self.realms
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BidiError::new(ErrorCode::InvalidArgument, format!("realm {id} not found")))
    }

    /// The visible window realm of a context, default world or sandbox.
    pub async fn window_realm(
        &self,
        context_id: &str,
        sandbox: Option<&str>,
    ) -> Option<Realm> {
        let realms = self.realms.lock().await;
        realms
            .values()
            .find(|r| {
                r.kind == RealmType::Window
                    && r.context_id.as_deref() == Some(context_id)
                    && r.sandbox.as_deref() == sandbox
                    && !r.is_hidden
            })
            .cloned()
    }

    /// Find by session and numeric execution context id.
    pub async fn by_execution_context(
        &self,
        session_id: Option<&str>,
        execution_context_id: i64,
    ) -> Option<Realm> {
        let realms = self.realms.lock().await;
        realms
            .values()
            .find(|r| {
                r.session_id.as_deref() == session_id
                    && r.execution_context_id == execution_context_id
            })
            .cloned()
    }

    /// All visible realms, optionally filtered by context and kind.
    pub async fn list(
        &self,
        context_id: Option<&str>,
        kind: Option<RealmType>,
    ) -> Vec<RealmInfo> {
        let realms = self.realms.lock().await;
        let mut infos: Vec<RealmInfo> = realms
            .values()
            .filter(|r| !r.is_hidden)
            .filter(|r| context_id.is_none() || r.context_id.as_deref() == context_id)
            .filter(|r| kind.is_none() || Some(r.kind) == kind)
            .map(Realm::info)
            .collect();
        infos.sort_by(|a, b| a.realm.cmp(&b.realm));
        infos
    }

    /// Add a retained handle to a realm.
    pub async fn retain_handle(&self, realm_id: &str, handle: &str) {
        let mut realms = self.realms.lock().await;
        if let Some(realm) = realms.get_mut(realm_id) {
            realm.handles.insert(handle.to_string());
        }
    }

    /// Release a handle; returns whether the realm owned it.
    pub async fn release_handle(&self, realm_id: &str, handle: &str) -> bool {
        let mut realms = self.realms.lock().await;
        realms
            .get_mut(realm_id)
            .is_some_and(|realm| realm.handles.remove(handle))
    }

    /// Remove one realm by session + numeric id; returns it when removed.
    pub async fn remove_by_execution_context(
        &self,
        session_id: Option<&str>,
        execution_context_id: i64,
    ) -> Option<Realm> {
        let mut realms = self.realms.lock().await;
        let id = realms
            .values()
            .find(|r| {
                r.session_id.as_deref() == session_id
                    && r.execution_context_id == execution_context_id
            })
            .map(|r| r.id.clone())?;
        debug!(realm = %id, "realm destroyed");
        realms.remove(&id)
    }

    /// Remove every realm of a session (target detach, context clear).
    pub async fn remove_by_session(&self, session_id: Option<&str>) -> Vec<Realm> {
        let mut realms = self.realms.lock().await;
        let ids: Vec<RealmId> = realms
            .values()
            .filter(|r| r.session_id.as_deref() == session_id)
            .map(|r| r.id.clone())
            .collect();
        ids.iter().filter_map(|id| realms.remove(id)).collect()
    }

    /// Remove every realm of a browsing context (context destroyed).
    pub async fn remove_by_context(&self, context_id: &str) -> Vec<Realm> {
        let mut realms = self.realms.lock().await;
        let ids: Vec<RealmId> = realms
            .values()
            .filter(|r| r.context_id.as_deref() == Some(context_id))
            .map(|r| r.id.clone())
            .collect();
        ids.iter().filter_map(|id| realms.remove(id)).collect()
    }
}

#[cfg(test)]
mod tests;
