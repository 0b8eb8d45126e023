//! CDP client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to reach the DevTools endpoint.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// WebSocket transport error.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Error reply from the browser.
    #[error("cdp error: {message} (code {code})")]
    Protocol { code: i64, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error during target discovery.
    #[error("http error: {0}")]
    Http(String),

    /// In-page JavaScript threw.
    #[error("javascript error: {0}")]
    JavaScript(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// The receive loop is gone; the browser connection is dead.
    #[error("browser connection closed")]
    ChannelClosed,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}
