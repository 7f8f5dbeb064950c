//! Per-context navigation tracking.
//!
//! One tracker per browsing context correlates command-initiated and
//! renderer-initiated navigations with their loader ids and produces the
//! BiDi navigation event sequence. The current navigation id only
//! advances when a navigation actually starts (gains a loader id);
//! fragment navigations never advance it. Every emission carries the URL
//! that was active at the moment of emission.

use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crosswire_bidi::browsing_context::NavigationInfo;
use crosswire_bidi::{BidiError, ErrorCode};

/// Progress of one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationStatus {
    /// Requested, no loader assigned yet.
    Pending,
    /// Gained a loader; navigationStarted emitted.
    Started,
    /// The document reached DOMContentLoaded.
    DomContentLoaded,
    /// The document reached load.
    Load,
    /// Resolved as a same-document fragment navigation.
    FragmentDone,
    /// Failed with a network error.
    Failed(String),
    /// Superseded by a newer navigation.
    Aborted,
}

impl NavigationStatus {
    fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Started => 1,
            Self::DomContentLoaded => 2,
            Self::Load | Self::FragmentDone => 3,
            Self::Failed(_) | Self::Aborted => 4,
        }
    }

    /// Whether no further progress can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Load | Self::FragmentDone | Self::Failed(_) | Self::Aborted
        )
    }
}

/// Readiness a caller can wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The navigation started.
    Started,
    /// DOMContentLoaded fired.
    Interactive,
    /// load fired.
    Complete,
}

#[derive(Debug)]
struct NavigationRecord {
    id: String,
    url: String,
    status: watch::Sender<NavigationStatus>,
}

impl NavigationRecord {
    fn new(url: String) -> Self {
        let (status, _) = watch::channel(NavigationStatus::Pending);
        Self {
            id: Uuid::new_v4().to_string(),
            url,
            status,
        }
    }

    fn advance(&self, next: NavigationStatus) {
        let stale = {
            let current = self.status.borrow();
            current.is_terminal() || current.rank() >= next.rank()
        };
        if !stale {
            let _ = self.status.send(next);
        }
    }

    fn handle(&self) -> NavigationHandle {
        NavigationHandle {
            id: self.id.clone(),
            url: self.url.clone(),
            rx: self.status.subscribe(),
        }
    }
}

/// Waiter handle for a command-initiated navigation.
#[derive(Debug)]
pub struct NavigationHandle {
    /// Navigation id, surfaced in the command result.
    pub id: String,
    /// Requested URL.
    pub url: String,
    rx: watch::Receiver<NavigationStatus>,
}

impl NavigationHandle {
    /// Wait until the navigation reaches the given readiness.
    ///
    /// # Errors
    ///
    /// Fails with `unknown error` when the navigation fails, is aborted,
    /// or the tracker goes away.
    pub async fn wait_for(&mut self, readiness: Readiness) -> Result<(), BidiError> {
        let needed = match readiness {
            Readiness::Started => 1,
            Readiness::Interactive => 2,
            Readiness::Complete => 3,
        };
        loop {
            let status = self.rx.borrow().clone();
            match status {
                NavigationStatus::Failed(reason) => {
                    return Err(BidiError::new(
                        ErrorCode::UnknownError,
                        format!("navigation failed: {reason}"),
                    ));
                }
                NavigationStatus::Aborted => {
                    return Err(BidiError::new(ErrorCode::UnknownError, "navigation aborted"));
                }
                // Fragment completion satisfies any readiness.
                NavigationStatus::FragmentDone => return Ok(()),
                other if other.rank() >= needed => return Ok(()),
                _ => {}
            }
            if self.rx.changed().await.is_err() {
                return Err(BidiError::new(
                    ErrorCode::UnknownError,
                    "navigation tracker closed",
                ));
            }
        }
    }
}

/// One BiDi event produced by a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationEmission {
    /// Dotted event name.
    pub method: &'static str,
    /// Event payload.
    pub info: NavigationInfo,
}

#[derive(Debug)]
struct ActiveNavigation {
    record: NavigationRecord,
    loader_id: String,
}

/// Navigation state machine of one browsing context.
#[derive(Debug)]
pub struct NavigationTracker {
    context_id: String,
    /// Requested navigation that has not gained a loader yet.
    pending: Option<NavigationRecord>,
    /// The navigation that currently owns the context's loader.
    active: Option<ActiveNavigation>,
    /// Id of the last navigation that actually started.
    current_navigation_id: Option<String>,
}

impl NavigationTracker {
    /// Tracker for a context, starting idle.
    pub fn new(context_id: String) -> Self {
        Self {
            context_id,
            pending: None,
            active: None,
            current_navigation_id: None,
        }
    }

    /// Id of the current (last started) navigation.
    pub fn current_navigation_id(&self) -> Option<&str> {
        self.current_navigation_id.as_deref()
    }

    fn info(&self, navigation: Option<String>, url: String, now: u64) -> NavigationInfo {
        NavigationInfo {
            context: self.context_id.clone(),
            navigation,
            timestamp: now,
            url,
        }
    }

    /// A `browsingContext.navigate` command was issued.
    pub fn start_command_navigation(&mut self, url: &str) -> NavigationHandle {
        if let Some(prev) = self.pending.take() {
            // Superseded before it ever started; no event was emitted for
            // it, so none is emitted now.
            prev.advance(NavigationStatus::Aborted);
        }
        let record = NavigationRecord::new(url.to_string());
        debug!(context = %self.context_id, navigation = %record.id, url = %url,
            "command navigation pending");
        let handle = record.handle();
        self.pending = Some(record);
        handle
    }

    /// `Page.frameRequestedNavigation`: the renderer wants to navigate.
    pub fn frame_requested_navigation(&mut self, url: &str) {
        if self.pending.is_none() {
            self.pending = Some(NavigationRecord::new(url.to_string()));
        } else if let Some(pending) = &mut self.pending {
            pending.url = url.to_string();
        }
    }

    /// `Page.frameStartedNavigating`: a navigation gained a loader.
    pub fn frame_started_navigating(
        &mut self,
        url: &str,
        loader_id: &str,
        now: u64,
    ) -> Vec<NavigationEmission> {
        let mut emissions = Vec::new();

        if let Some(active) = &self.active {
            if active.loader_id == loader_id {
                // Duplicate signal for the running navigation.
                return emissions;
            }
            let status = active.record.status.borrow().clone();
            if !status.is_terminal() {
                active.record.advance(NavigationStatus::Aborted);
                emissions.push(NavigationEmission {
                    method: "browsingContext.navigationAborted",
                    info: self.info(
                        Some(active.record.id.clone()),
                        active.record.url.clone(),
                        now,
                    ),
                });
            }
        }

        let mut record = self
            .pending
            .take()
            .unwrap_or_else(|| NavigationRecord::new(url.to_string()));
        record.url = url.to_string();
        record.advance(NavigationStatus::Started);
        self.current_navigation_id = Some(record.id.clone());
        emissions.push(NavigationEmission {
            method: "browsingContext.navigationStarted",
            info: self.info(Some(record.id.clone()), url.to_string(), now),
        });
        debug!(context = %self.context_id, navigation = %record.id, loader = %loader_id,
            "navigation started");
        self.active = Some(ActiveNavigation {
            record,
            loader_id: loader_id.to_string(),
        });
        emissions
    }

    /// `Page.navigatedWithinDocument`.
    pub fn navigated_within_document(
        &mut self,
        url: &str,
        navigation_type: Option<&str>,
        now: u64,
    ) -> Vec<NavigationEmission> {
        if navigation_type.unwrap_or("fragment") != "fragment" {
            // History API updates adopt the URL without any BiDi event.
            return Vec::new();
        }
        let navigation = match self.pending.take() {
            Some(record) => {
                record.advance(NavigationStatus::FragmentDone);
                record.id
            }
            None => Uuid::new_v4().to_string(),
        };
        vec![NavigationEmission {
            method: "browsingContext.fragmentNavigated",
            info: self.info(Some(navigation), url.to_string(), now),
        }]
    }

    /// `Page.lifecycleEvent` with name "DOMContentLoaded".
    pub fn dom_content_loaded(&mut self, loader_id: &str, now: u64) -> Vec<NavigationEmission> {
        match &self.active {
            Some(active) if active.loader_id == loader_id => {
                active.record.advance(NavigationStatus::DomContentLoaded);
                vec![NavigationEmission {
                    method: "browsingContext.domContentLoaded",
                    info: self.info(Some(active.record.id.clone()), active.record.url.clone(), now),
                }]
            }
            _ => Vec::new(),
        }
    }

    /// `Page.lifecycleEvent` with name "load".
    pub fn load(&mut self, loader_id: &str, now: u64) -> Vec<NavigationEmission> {
        match &self.active {
            Some(active) if active.loader_id == loader_id => {
                active.record.advance(NavigationStatus::Load);
                vec![NavigationEmission {
                    method: "browsingContext.load",
                    info: self.info(Some(active.record.id.clone()), active.record.url.clone(), now),
                }]
            }
            _ => Vec::new(),
        }
    }

    /// `Page.frameNavigated`: adopt the committed URL.
    pub fn frame_navigated(&mut self, url: &str) {
        if let Some(active) = &mut self.active {
            active.record.url = url.to_string();
        }
    }

    /// `Network.loadingFailed` for a request whose id equals the loader id
    /// of the running navigation.
    pub fn loading_failed(
        &mut self,
        request_id: &str,
        error_text: &str,
        now: u64,
    ) -> Vec<NavigationEmission> {
        match &self.active {
            Some(active)
                if active.loader_id == request_id
                    && !active.record.status.borrow().is_terminal() =>
            {
                active
                    .record
                    .advance(NavigationStatus::Failed(error_text.to_string()));
                vec![NavigationEmission {
                    method: "browsingContext.navigationFailed",
                    info: self.info(Some(active.record.id.clone()), active.record.url.clone(), now),
                }]
            }
            _ => Vec::new(),
        }
    }

    /// Fail a command navigation that the browser rejected outright.
    pub fn fail_navigation(&mut self, navigation_id: &str, reason: &str, now: u64) -> Vec<NavigationEmission> {
        let mut emissions = Vec::new();
        if let Some(pending) = &self.pending {
            if pending.id == navigation_id {
                pending.advance(NavigationStatus::Failed(reason.to_string()));
                emissions.push(NavigationEmission {
                    method: "browsingContext.navigationFailed",
                    info: self.info(Some(pending.id.clone()), pending.url.clone(), now),
                });
                self.pending = None;
                return emissions;
            }
        }
        if let Some(active) = &self.active {
            if active.record.id == navigation_id && !active.record.status.borrow().is_terminal() {
                active
                    .record
                    .advance(NavigationStatus::Failed(reason.to_string()));
                emissions.push(NavigationEmission {
                    method: "browsingContext.navigationFailed",
                    info: self.info(Some(active.record.id.clone()), active.record.url.clone(), now),
                });
            }
        }
        emissions
    }
}

#[cfg(test)]
mod tests;
