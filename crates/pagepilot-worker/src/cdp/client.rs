//! CDP WebSocket client speaking the flat session protocol.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::wire::{BrowserVersion, CdpCommand, CdpReply, PageTarget};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the browser-level DevTools WebSocket.
///
/// Page targets are attached with `Target.attachToTarget` in flat mode, and
/// page-scoped commands carry the returned session id on the same socket.
/// Command ids come from one counter, so replies correlate by id alone no
/// matter which session they belong to. Events are not routed anywhere and
/// get dropped in the receive loop.
pub struct CdpClient {
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    request_id: AtomicU64,
    pending: Pending,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to the browser WebSocket behind a DevTools endpoint
    /// (e.g. `http://127.0.0.1:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let endpoint = endpoint.trim_end_matches('/');

        let version: BrowserVersion = reqwest::get(format!("{}/json/version", endpoint))
            .await?
            .json()
            .await?;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("websocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending).await;
            })
        };

        debug!("cdp client connected to {}", version.browser);

        Ok(Self {
            ws_tx: Arc::new(tokio::sync::Mutex::new(ws_sink)),
            request_id: AtomicU64::new(1),
            pending,
            recv_task,
        })
    }

    /// Attach to a page target and return its session id.
    ///
    /// Prefers an already-open tab, which a fresh browser always has; creates
    /// one over the HTTP surface otherwise.
    pub async fn attach_page(&self, endpoint: &str) -> Result<String, CdpError> {
        let target = Self::find_page(endpoint).await?;

        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target.id, "flatten": true})),
                None,
            )
            .await?;

        result["sessionId"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| CdpError::InvalidResponse("attach reply missing sessionId".to_string()))
    }

    /// Find an open page target via the DevTools HTTP surface.
    async fn find_page(endpoint: &str) -> Result<PageTarget, CdpError> {
        let endpoint = endpoint.trim_end_matches('/');

        let targets: Vec<PageTarget> = reqwest::get(format!("{}/json/list", endpoint))
            .await?
            .json()
            .await?;

        if let Some(target) = targets.into_iter().find(|t| t.target_type == "page") {
            return Ok(target);
        }

        // No open tab; ask for one. Chrome requires PUT on /json/new.
        let client = reqwest::Client::new();
        let created: PageTarget = client
            .put(format!("{}/json/new", endpoint))
            .send()
            .await?
            .json()
            .await?;

        Ok(created)
    }

    async fn receive_loop(mut ws_source: WsSource, pending: Pending) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("cdp recv: {}", text);
                    let reply: CdpReply = match serde_json::from_str(&text) {
                        Ok(reply) => reply,
                        Err(e) => {
                            warn!("unparseable cdp message: {}", e);
                            continue;
                        }
                    };
                    if let Some(id) = reply.id {
                        if let Some(tx) = pending.lock().remove(&id) {
                            let result = match reply.error {
                                Some(failure) => Err(CdpError::Protocol {
                                    code: failure.code,
                                    message: failure.message,
                                }),
                                None => Ok(reply.result.unwrap_or(Value::Null)),
                            };
                            let _ = tx.send(result);
                        }
                    }
                    // Replies without an id are events; nothing here consumes them.
                }
                Ok(Message::Close(_)) => {
                    debug!("cdp websocket closed");
                    break;
                }
                Err(e) => {
                    error!("cdp websocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Send a command and wait for its reply. Page-scoped commands pass the
    /// session id from [`attach_page`](Self::attach_page); browser-level
    /// commands pass `None`.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let command = CdpCommand {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(String::from),
        };
        let json = serde_json::to_string(&command)?;
        trace!("cdp send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await?;
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::ChannelClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("{} timed out", method)))
            }
        }
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
