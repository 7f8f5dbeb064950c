//! Typed CDP domain definitions.
//!
//! Hand-written subsets of the Chrome DevTools Protocol: exactly the
//! commands and events the mapper drives, nothing generated.

pub mod bluetooth;
pub mod browser;
pub mod dom;
pub mod emulation;
pub mod fetch;
pub mod input;
pub mod log;
pub mod network;
pub mod page;
pub mod runtime;
pub mod storage;
pub mod target;
