//! Published action results.

use serde::{Deserialize, Serialize};

/// The worker's published outcome of one iteration.
///
/// A screenshot is always attached, including on failure, so the agent can
/// re-orient from the page as it actually is. Screenshots are base64 PNG as
/// captured off the wire; nothing between the browser and the reasoning
/// client decodes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionResult {
    /// The previous instruction applied cleanly (or this is the initial load).
    Success { screenshot: String },
    /// The previous instruction failed recoverably; the session continues.
    Error { message: String, screenshot: String },
}

impl ActionResult {
    pub fn success(screenshot: impl Into<String>) -> Self {
        ActionResult::Success {
            screenshot: screenshot.into(),
        }
    }

    pub fn error(message: impl Into<String>, screenshot: impl Into<String>) -> Self {
        ActionResult::Error {
            message: message.into(),
            screenshot: screenshot.into(),
        }
    }

    pub fn screenshot(&self) -> &str {
        match self {
            ActionResult::Success { screenshot } => screenshot,
            ActionResult::Error { screenshot, .. } => screenshot,
        }
    }

    /// The attached failure message, if this is an error result.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ActionResult::Success { .. } => None,
            ActionResult::Error { message, .. } => Some(message),
        }
    }
}
