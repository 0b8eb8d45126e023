//! The page-interaction boundary.

use async_trait::async_trait;

use crate::error::PageError;

/// Capability surface the run loop needs from a live page.
///
/// Labels are the numeric markers assigned by the most recent
/// [`mark_page`](PageDriver::mark_page) call; they are only meaningful
/// until the page changes under them.
#[async_trait]
pub trait PageDriver: Send {
    /// Load `url` and wait for the document to become ready.
    async fn navigate(&mut self, url: &str) -> Result<(), PageError>;

    /// Enumerate interactive elements, overlay numbered markers, and
    /// return how many were labeled.
    async fn mark_page(&mut self) -> Result<u32, PageError>;

    /// Remove the marker overlays from a previous [`mark_page`](PageDriver::mark_page).
    /// Must tolerate markers that have already vanished.
    async fn clear_markers(&mut self, count: u32) -> Result<(), PageError>;

    /// Click the element carrying `label`.
    async fn click(&mut self, label: u32) -> Result<(), PageError>;

    /// Replace the text content of the element carrying `label`, then
    /// press Enter.
    async fn fill(&mut self, label: u32, content: &str) -> Result<(), PageError>;

    /// Capture the current viewport as a base64-encoded PNG.
    async fn screenshot(&mut self) -> Result<String, PageError>;

    /// Tear the page down. Best effort; never fails.
    async fn close(&mut self);
}
