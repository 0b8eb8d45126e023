//! CDP message framing and DevTools HTTP endpoint types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound command. `session_id` scopes the call to an attached target;
/// browser-level commands leave it unset.
#[derive(Debug, Serialize)]
pub struct CdpCommand {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Inbound message. A reply carries `id`; an event carries `method`.
#[derive(Debug, Deserialize)]
pub struct CdpReply {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpFailure>,
    pub method: Option<String>,
}

/// Error payload inside a reply.
#[derive(Debug, Deserialize)]
pub struct CdpFailure {
    pub code: i64,
    pub message: String,
}

/// One entry from the `/json/list` discovery endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTarget {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

/// Reply from `/json/version`.
///
/// Chrome uses PascalCase names on this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
