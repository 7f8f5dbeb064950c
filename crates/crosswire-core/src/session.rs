//! Session composition root.
//!
//! [`MapperSession`] wires the whole mapper together: one CDP mux, the
//! storages, the event plumbing, the target manager and the command
//! processors, all connected by explicit constructor arguments. It then
//! pumps the northbound transport until the client goes away or the
//! session is ended.

use std::sync::Arc;

use crosswire_cdp::{CdpError, CdpMux};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::ContextConfigStorage;
use crate::context::BrowsingContextStorage;
use crate::events::{EventManager, OutgoingQueue};
use crate::input::InputStateManager;
use crate::network::NetworkStorage;
use crate::processors::{
    bluetooth::BluetoothProcessor, browser::BrowserProcessor,
    browsing_context::BrowsingContextProcessor, cdp::CdpProcessor, input::InputProcessor,
    network::NetworkProcessor, permissions::PermissionsProcessor, script::ScriptProcessor,
    session::SessionProcessor, storage::StorageProcessor, CommandProcessor, Processors,
};
use crate::realm::RealmStorage;
use crate::script::PreloadScriptStorage;
use crate::target::manager::CdpTargetManager;

/// One running mapper session: one client transport, one browser.
pub struct MapperSession {
    contexts: Arc<BrowsingContextStorage>,
    realms: Arc<RealmStorage>,
    network: Arc<NetworkStorage>,
    preloads: Arc<PreloadScriptStorage>,
    configs: Arc<ContextConfigStorage>,
    events: Arc<EventManager>,
    input: Arc<InputStateManager>,
    manager: Arc<CdpTargetManager>,
    mux: Arc<CdpMux>,
}

impl MapperSession {
    /// Start a session over the given frame channels with the system
    /// clock.
    ///
    /// # Errors
    ///
    /// Fails when the initial CDP auto-attach setup fails.
    pub async fn start(
        bidi_outgoing: mpsc::Sender<String>,
        bidi_incoming: mpsc::Receiver<String>,
        cdp_outgoing: mpsc::Sender<String>,
        cdp_incoming: mpsc::Receiver<String>,
    ) -> Result<Arc<Self>, CdpError> {
        Self::start_with_clock(
            bidi_outgoing,
            bidi_incoming,
            cdp_outgoing,
            cdp_incoming,
            Arc::new(SystemClock),
        )
        .await
    }

    /// Start a session with an injected clock (tests).
    ///
    /// # Errors
    ///
    /// Fails when the initial CDP auto-attach setup fails.
    pub async fn start_with_clock(
        bidi_outgoing: mpsc::Sender<String>,
        mut bidi_incoming: mpsc::Receiver<String>,
        cdp_outgoing: mpsc::Sender<String>,
        cdp_incoming: mpsc::Receiver<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>, CdpError> {
        let mux = CdpMux::new(cdp_outgoing, cdp_incoming);

        let contexts = BrowsingContextStorage::new();
        let realms = RealmStorage::new();
        let network = NetworkStorage::new();
        let preloads = PreloadScriptStorage::new();
        let configs = ContextConfigStorage::new();
        let input = InputStateManager::new(Arc::clone(&clock));

        let queue = OutgoingQueue::new(bidi_outgoing);
        let events = EventManager::new(Arc::clone(&queue), Arc::clone(&contexts));
        let (reconcile_tx, reconcile_rx) = mpsc::unbounded_channel();
        events.set_reconcile_notifier(reconcile_tx).await;

        let manager = CdpTargetManager::new(
            Arc::clone(&mux),
            Arc::clone(&contexts),
            Arc::clone(&realms),
            Arc::clone(&network),
            Arc::clone(&preloads),
            Arc::clone(&configs),
            Arc::clone(&events),
            Arc::clone(&input),
            Arc::clone(&clock),
        );
        manager.start(reconcile_rx).await?;

        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel();
        let processors = Processors {
            session: SessionProcessor::new(Arc::clone(&events), shutdown_tx.clone()),
            browser: BrowserProcessor::new(
                Arc::clone(&mux),
                Arc::clone(&configs),
                shutdown_tx.clone(),
            ),
            browsing_context: BrowsingContextProcessor::new(
                Arc::clone(&contexts),
                Arc::clone(&configs),
                Arc::clone(&manager),
            ),
            script: ScriptProcessor::new(
                Arc::clone(&realms),
                Arc::clone(&contexts),
                Arc::clone(&preloads),
                Arc::clone(&manager),
                Arc::clone(&mux),
            ),
            network: NetworkProcessor::new(
                Arc::clone(&network),
                Arc::clone(&contexts),
                Arc::clone(&configs),
                Arc::clone(&manager),
            ),
            input: InputProcessor::new(
                Arc::clone(&contexts),
                Arc::clone(&realms),
                Arc::clone(&input),
                Arc::clone(&manager),
            ),
            storage: StorageProcessor::new(Arc::clone(&mux), Arc::clone(&contexts)),
            permissions: PermissionsProcessor::new(Arc::clone(&mux)),
            bluetooth: BluetoothProcessor::new(Arc::clone(&manager)),
            cdp: CdpProcessor::new(
                Arc::clone(&mux),
                Arc::clone(&contexts),
                Arc::clone(&realms),
            ),
        };
        let command_processor = CommandProcessor::new(Arc::clone(&queue), processors);

        // The northbound read loop: one frame at a time, in wire order.
        tokio::spawn(async move {
            info!("mapper session started");
            loop {
                tokio::select! {
                    frame = bidi_incoming.recv() => {
                        match frame {
                            Some(frame) => command_processor.handle_frame(frame).await,
                            None => {
                                debug!("client transport closed");
                                break;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("session end requested");
                        break;
                    }
                }
            }
            info!("mapper session ended");
        });

        Ok(Arc::new(Self {
            contexts,
            realms,
            network,
            preloads,
            configs,
            events,
            input,
            manager,
            mux,
        }))
    }

    /// The browsing context storage.
    pub fn contexts(&self) -> &Arc<BrowsingContextStorage> {
        &self.contexts
    }

    /// The realm storage.
    pub fn realms(&self) -> &Arc<RealmStorage> {
        &self.realms
    }

    /// The network storage.
    pub fn network(&self) -> &Arc<NetworkStorage> {
        &self.network
    }

    /// The preload script storage.
    pub fn preloads(&self) -> &Arc<PreloadScriptStorage> {
        &self.preloads
    }

    /// The context configuration storage.
    pub fn configs(&self) -> &Arc<ContextConfigStorage> {
        &self.configs
    }

    /// The event manager.
    pub fn events(&self) -> &Arc<EventManager> {
        &self.events
    }

    /// The input state manager.
    pub fn input(&self) -> &Arc<InputStateManager> {
        &self.input
    }

    /// The target manager.
    pub fn manager(&self) -> &Arc<CdpTargetManager> {
        &self.manager
    }

    /// The CDP mux.
    pub fn mux(&self) -> &Arc<CdpMux> {
        &self.mux
    }
}

#[cfg(test)]
mod tests;
