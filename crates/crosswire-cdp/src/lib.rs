//! # Crosswire CDP - Chrome DevTools Protocol plumbing
//!
//! Frame-level Chrome DevTools Protocol (CDP) multiplexer used by the
//! crosswire mapper. One duplex frame stream carries commands and events
//! for the browser root target *and* every auto-attached child target;
//! this crate correlates responses, demultiplexes events by session id,
//! and exposes typed domain definitions for the protocol surface the
//! mapper drives.
//!
//! This crate handles:
//! - Frame transport: a channel boundary plus a `tokio-tungstenite`
//!   WebSocket adapter and an in-memory pipe for tests
//! - Command/response correlation with monotonically assigned ids
//! - Session-scoped views ([`CdpSession`]) with per-session event streams
//! - Typed CDP domains (Target, Page, Runtime, Network, Fetch, Input, ...)
//!
//! ## Quick Start
//!
//! ```no_run
//! use crosswire_cdp::{connect_websocket, CdpMux};
//! use crosswire_cdp::protocol::target::SetAutoAttachParams;
//!
//! # async fn example() -> Result<(), crosswire_cdp::CdpError> {
//! let (outgoing, incoming) = connect_websocket("ws://localhost:9222/devtools/browser/...").await?;
//! let mux = CdpMux::new(outgoing, incoming);
//!
//! // The browser root is the session with no id.
//! let root = mux.session(None);
//! let _: serde_json::Value = root
//!     .send_command(
//!         "Target.setAutoAttach",
//!         Some(SetAutoAttachParams {
//!             auto_attach: true,
//!             wait_for_debugger_on_start: true,
//!             flatten: Some(true),
//!             filter: None,
//!         }),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Sessions
//!
//! Once `Target.attachedToTarget` reports a flat session, a view scoped to
//! it sends commands with that `sessionId` and observes only that
//! session's events:
//!
//! ```no_run
//! # async fn example(mux: std::sync::Arc<crosswire_cdp::CdpMux>) {
//! let session = mux.session(Some("ABCDEF".to_string()));
//! let mut events = session.subscribe_events().await;
//! while let Some(event) = events.recv().await {
//!     println!("{}", event.method);
//! }
//! // recv() returning None means the connection closed.
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`mux`] - frame multiplexer and session views
//! - [`transport`] - message types and the frame boundary
//! - [`protocol`] - CDP domain type definitions
//! - [`error`] - error types

pub mod error;
pub mod mux;
pub mod protocol;
pub mod transport;

pub use error::CdpError;
pub use mux::{CdpMux, CdpSession, SessionEvents};
pub use transport::{connect_websocket, pipe, CdpEvent, CdpMessage, CdpRequest, CdpResponse};
