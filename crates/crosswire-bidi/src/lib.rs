//! # Crosswire BiDi - WebDriver BiDi wire model
//!
//! Typed model of the WebDriver BiDi protocol as it crosses the wire:
//! command/reply/event envelopes, the error taxonomy, and per-module
//! parameter, result and event types.
//!
//! The mapper core consumes these types; nothing here talks to a browser.
//! Payload shapes the gateway does not interpret stay [`serde_json::Value`].
//!
//! ## Envelopes
//!
//! ```
//! use crosswire_bidi::message::{parse_command, OutgoingFrame};
//!
//! let cmd = parse_command(r#"{"id":1,"method":"session.status","params":{}}"#).unwrap();
//! assert_eq!(cmd.method, "session.status");
//!
//! let reply = OutgoingFrame::success(cmd.id, serde_json::json!({"ready": false}), cmd.channel);
//! assert!(reply.to_frame().contains(r#""type":"success""#));
//! ```
//!
//! ## Module Organization
//!
//! - [`message`] - command parsing and outgoing frames
//! - [`error`] - the error taxonomy ([`ErrorCode`], [`BidiError`])
//! - [`session`], [`browser`], [`browsing_context`], [`script`],
//!   [`network`], [`input`], [`storage`], [`log`], [`permissions`],
//!   [`bluetooth`], [`cdp`] - per-module protocol types

pub mod bluetooth;
pub mod browser;
pub mod browsing_context;
pub mod cdp;
pub mod error;
pub mod input;
pub mod log;
pub mod message;
pub mod network;
pub mod permissions;
pub mod script;
pub mod session;
pub mod storage;

pub use error::{BidiError, ErrorCode};
pub use message::{parse_command, Command, CommandParseError, OutgoingFrame};
