//! PagePilot execution worker.
//!
//! One worker process owns one live browser page. It claims its session
//! entry in the shared store, drives Chrome over the DevTools protocol,
//! and runs the publish/consume loop: screenshot out, instruction in,
//! until a Finish instruction or a fatal page error ends the session.

pub mod cdp;
pub mod chrome;
pub mod driver;
pub mod error;
pub mod page;
pub mod runloop;

pub use chrome::{ChromeError, ChromeHandle, LaunchOptions};
pub use driver::PageDriver;
pub use error::{PageError, WorkerError};
pub use page::CdpDriver;
pub use runloop::{RunConfig, SessionRunner};
