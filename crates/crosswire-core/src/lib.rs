//! # Crosswire Core - the WebDriver BiDi to CDP mapper
//!
//! The protocol state machine of the crosswire gateway. One
//! [`MapperSession`] serves one client transport and drives one browser
//! over a single multiplexed CDP connection: every incoming BiDi command
//! is translated into CDP calls, and spontaneous CDP events are
//! correlated back into BiDi events fanned out to subscribed channels.
//!
//! ## Shape
//!
//! The session owns a set of id-keyed storages (browsing contexts,
//! realms, network requests, preload scripts, subscriptions, layered
//! configuration); everything cross-references by id and looks entries
//! up at use time. Mutation happens from the per-session CDP event loops
//! and from command processors, all coordinated through `tokio::sync`
//! primitives, so the mapper is happy on a current-thread runtime.
//!
//! ```no_run
//! use crosswire_core::MapperSession;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), crosswire_cdp::CdpError> {
//! // Southbound: a connected browser WebSocket.
//! let (cdp_outgoing, cdp_incoming) =
//!     crosswire_cdp::connect_websocket("ws://localhost:9222/devtools/browser/...").await?;
//!
//! // Northbound: the frames of one accepted client connection.
//! let (to_client, mut client_rx) = mpsc::channel::<String>(64);
//! let (client_tx, from_client) = mpsc::channel::<String>(64);
//!
//! let session =
//!     MapperSession::start(to_client, from_client, cdp_outgoing, cdp_incoming).await?;
//! # let _ = (session, client_rx, client_tx);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - the composition root
//! - [`processors`] - command parsing, routing and the per-module
//!   processors
//! - [`context`], [`realm`], [`network`], [`script`], [`config`] - the
//!   session's storages
//! - [`navigation`] - the per-context navigation state machine
//! - [`input`] - input source state and the action dispatcher
//! - [`events`] - subscriptions, buffered replay and the outgoing queue
//! - [`target`] - per-target CDP bookkeeping and event dispatch
//! - [`clock`] - injectable wall clock
//! - [`error`] - error conversion helpers

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod input;
pub mod navigation;
pub mod network;
pub mod processors;
pub mod realm;
pub mod script;
pub mod session;
pub mod target;

pub use clock::{Clock, ManualClock, SystemClock};
pub use session::MapperSession;
