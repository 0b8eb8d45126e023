//! Chrome-backed [`PageDriver`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cdp::{CdpClient, CdpError};
use crate::chrome::{ChromeHandle, LaunchOptions};
use crate::driver::PageDriver;
use crate::error::PageError;

/// Helper script installed into every document before use.
const MARKER_SCRIPT: &str = include_str!("marker.js");

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives one Chrome tab over CDP.
pub struct CdpDriver {
    chrome: ChromeHandle,
    client: CdpClient,
    session_id: String,
}

impl CdpDriver {
    /// Launch a dedicated Chrome and attach to its initial tab.
    pub async fn launch(options: &LaunchOptions) -> Result<Self, PageError> {
        let mut chrome = ChromeHandle::launch(options).await?;

        let attached = async {
            let client = CdpClient::connect(&chrome.endpoint()).await?;
            let session_id = client.attach_page(&chrome.endpoint()).await?;
            Ok::<_, CdpError>((client, session_id))
        }
        .await;

        let (client, session_id) = match attached {
            Ok(pair) => pair,
            Err(err) => {
                chrome.kill().await;
                return Err(err.into());
            }
        };

        let driver = Self {
            chrome,
            client,
            session_id,
        };
        driver.enable_domains().await?;
        Ok(driver)
    }

    async fn enable_domains(&self) -> Result<(), CdpError> {
        self.client
            .call("Page.enable", None, Some(&self.session_id))
            .await?;
        self.client
            .call("Runtime.enable", None, Some(&self.session_id))
            .await?;
        Ok(())
    }

    /// Evaluate a JavaScript expression and return its value.
    async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .client
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
                Some(&self.session_id),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Install the marker helpers. Safe to call repeatedly; the script
    /// bails out when already present in the current document.
    async fn ensure_helpers(&self) -> Result<(), CdpError> {
        self.evaluate(MARKER_SCRIPT).await?;
        Ok(())
    }

    async fn wait_until_ready(&self) -> Result<(), CdpError> {
        let start = std::time::Instant::now();
        loop {
            let state = self.evaluate("document.readyState").await?;
            if let Some(state) = state.as_str() {
                if state == "complete" || state == "interactive" {
                    return Ok(());
                }
            }
            if start.elapsed() > LOAD_TIMEOUT {
                return Err(CdpError::Timeout("page load".to_string()));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn press_enter(&self) -> Result<(), CdpError> {
        for event_type in ["keyDown", "keyUp"] {
            self.client
                .call(
                    "Input.dispatchKeyEvent",
                    Some(json!({
                        "type": event_type,
                        "key": "Enter",
                        "windowsVirtualKeyCode": 13,
                    })),
                    Some(&self.session_id),
                )
                .await?;
        }
        Ok(())
    }
}

// The click/fill expressions guard on the helper object: after an
// instruction-triggered navigation the helpers are gone, which must read
// as a recoverable miss rather than a thrown ReferenceError.
fn click_expression(label: u32) -> String {
    format!("!!(window.__pagepilot && window.__pagepilot.click({label}))")
}

fn fill_expression(label: u32, content: &str) -> String {
    // serde_json string encoding doubles as a JS string literal.
    let literal = serde_json::to_string(content).unwrap_or_else(|_| "\"\"".to_string());
    format!("!!(window.__pagepilot && window.__pagepilot.fill({label}, {literal}))")
}

fn clear_expression(count: u32) -> String {
    format!("window.__pagepilot ? window.__pagepilot.clear({count}) : true")
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        let result = self
            .client
            .call(
                "Page.navigate",
                Some(json!({"url": url})),
                Some(&self.session_id),
            )
            .await
            .map_err(PageError::Cdp)?;

        if let Some(error) = result.get("errorText").and_then(|v| v.as_str()) {
            return Err(PageError::Navigation(error.to_string()));
        }

        self.wait_until_ready().await?;
        debug!("navigated to {}", url);
        Ok(())
    }

    async fn mark_page(&mut self) -> Result<u32, PageError> {
        self.ensure_helpers().await?;
        let count = self.evaluate("window.__pagepilot.mark()").await?;
        let count = count
            .as_u64()
            .ok_or_else(|| PageError::Script(format!("mark returned {count}")))?;
        debug!("marked {} interactive elements", count);
        Ok(count as u32)
    }

    async fn clear_markers(&mut self, count: u32) -> Result<(), PageError> {
        if count == 0 {
            return Ok(());
        }
        self.evaluate(&clear_expression(count)).await?;
        Ok(())
    }

    async fn click(&mut self, label: u32) -> Result<(), PageError> {
        let hit = self.evaluate(&click_expression(label)).await?;
        if hit.as_bool() != Some(true) {
            return Err(PageError::NotClickable { label });
        }
        debug!("clicked element {}", label);
        Ok(())
    }

    async fn fill(&mut self, label: u32, content: &str) -> Result<(), PageError> {
        let hit = self.evaluate(&fill_expression(label, content)).await?;
        if hit.as_bool() != Some(true) {
            return Err(PageError::NotTypeable { label });
        }
        self.press_enter().await?;
        debug!("filled element {} with {} chars", label, content.len());
        Ok(())
    }

    async fn screenshot(&mut self) -> Result<String, PageError> {
        let result = self
            .client
            .call(
                "Page.captureScreenshot",
                Some(json!({"format": "png"})),
                Some(&self.session_id),
            )
            .await
            .map_err(PageError::Cdp)?;

        result["data"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                PageError::Cdp(CdpError::InvalidResponse("missing screenshot data".to_string()))
            })
    }

    async fn close(&mut self) {
        // Browser-level command, no session scope.
        if let Err(e) = self.client.call("Browser.close", None, None).await {
            warn!("browser close failed: {}", e);
        }
        self.chrome.kill().await;
    }
}
