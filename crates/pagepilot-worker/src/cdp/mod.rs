//! Minimal Chrome DevTools Protocol client.
//!
//! Speaks to the browser-level WebSocket and attaches page targets as flat
//! sessions; requests are correlated by id, unsolicited events are dropped.

mod client;
mod error;
mod wire;

pub use client::CdpClient;
pub use error::CdpError;
pub use wire::{BrowserVersion, CdpCommand, CdpFailure, CdpReply, PageTarget};
