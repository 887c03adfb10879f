//! DevTools-protocol client for a headless Chrome on a local control port.
//!
//! One render is one short-lived page target:
//!
//! ```text
//! PUT /json/new ──▶ ws://…/devtools/page/<id>
//!                     Page.enable
//!                     Page.navigate { url }
//!                     … Page.loadEventFired
//!                     Page.printToPDF ──▶ base64 PDF
//! GET /json/close/<id>
//! ```
//!
//! A fresh target per document keeps state (scroll position, injected
//! styles, crashed renderers) from leaking between pages. The browser
//! process itself is owned by [`crate::engine::EngineHandle`].

use crate::error::DocumentError;
use crate::pipeline::render::{PdfArtifact, RenderEngine};
use async_trait::async_trait;
use base64::Engine as _;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

/// Upper bound for one request to the control port's HTTP endpoints.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser identification returned by `GET /json/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,
}

#[derive(Debug, Deserialize)]
struct TargetInfo {
    id: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    ws_url: String,
}

/// [`RenderEngine`] backed by Chrome's DevTools protocol.
#[derive(Debug, Clone)]
pub struct CdpEngine {
    port: u16,
    http: reqwest::Client,
}

impl CdpEngine {
    pub fn new(port: u16) -> Self {
        Self::with_http_timeout(port, HTTP_TIMEOUT)
    }

    /// Like [`CdpEngine::new`], bounding every control-port HTTP request by
    /// `timeout`. The websocket session is bounded by the render timeout.
    pub fn with_http_timeout(port: u16, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap_or_default();
        Self { port, http }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn endpoint(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    fn unreachable(&self, e: impl std::fmt::Display) -> DocumentError {
        DocumentError::EngineUnreachable {
            port: self.port,
            detail: e.to_string(),
        }
    }

    /// Ask the control port who is listening. Used as a readiness probe.
    pub async fn version(&self) -> Result<BrowserVersion, reqwest::Error> {
        self.http
            .get(self.endpoint("/json/version"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn open_target(&self) -> Result<TargetGuard, DocumentError> {
        let info: TargetInfo = self
            .http
            .put(self.endpoint("/json/new?about:blank"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.unreachable(e))?
            .json()
            .await
            .map_err(|e| self.unreachable(e))?;

        Ok(TargetGuard {
            http: self.http.clone(),
            close_url: self.endpoint(&format!("/json/close/{}", info.id)),
            info,
            closed: false,
        })
    }

    async fn print_target(&self, target: &TargetInfo, url: &Url) -> Result<PdfArtifact, String> {
        let mut session = CdpSession::connect(&target.ws_url).await?;

        session.call("Page.enable", json!({})).await?;
        let nav = session
            .call("Page.navigate", json!({ "url": url.as_str() }))
            .await?;
        if let Some(err) = nav.get("errorText").and_then(Value::as_str) {
            return Err(format!("navigation failed: {err}"));
        }
        // Anything buffered so far belongs to about:blank.
        session.pending_events.clear();
        session.wait_for_event("Page.loadEventFired").await?;

        let printed = session
            .call("Page.printToPDF", json!({ "printBackground": true }))
            .await?;
        let _ = session.ws.close(None).await;

        decode_pdf(&printed)
    }
}

#[async_trait]
impl RenderEngine for CdpEngine {
    async fn render(&self, url: &Url) -> Result<PdfArtifact, DocumentError> {
        let target = self.open_target().await?;
        debug!("Opened target {} for {}", target.info.id, url);

        let result = self.print_target(&target.info, url).await;
        target.close().await;

        result.map_err(|detail| DocumentError::RenderFailed {
            url: url.to_string(),
            detail,
        })
    }
}

/// An open page target. Closed explicitly after a render, or on drop when
/// the render future is cancelled (e.g. by the render timeout).
struct TargetGuard {
    http: reqwest::Client,
    close_url: String,
    info: TargetInfo,
    closed: bool,
}

impl TargetGuard {
    async fn close(mut self) {
        close_target(&self.http, &self.close_url, &self.info.id).await;
        self.closed = true;
    }
}

impl Drop for TargetGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let http = self.http.clone();
        let close_url = std::mem::take(&mut self.close_url);
        let id = std::mem::take(&mut self.info.id);
        debug!("Render of target {} abandoned, closing it", id);
        runtime.spawn(async move { close_target(&http, &close_url, &id).await });
    }
}

/// Best effort: a target left open only costs memory until the browser exits.
async fn close_target(http: &reqwest::Client, close_url: &str, id: &str) {
    if let Err(e) = http.get(close_url).send().await {
        debug!("Closing target {} failed: {}", id, e);
    }
}

// ── Protocol session ─────────────────────────────────────────────────────

/// One incoming protocol message.
#[derive(Debug, PartialEq)]
enum Frame {
    /// Reply to a command we sent.
    Response { id: u64, result: Result<Value, String> },
    /// Unsolicited notification.
    Event { method: String },
}

fn parse_frame(text: &str) -> Result<Frame, String> {
    let v: Value = serde_json::from_str(text).map_err(|e| format!("bad protocol frame: {e}"))?;

    if let Some(id) = v.get("id").and_then(Value::as_u64) {
        let result = match v.get("error") {
            Some(err) => Err(err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown protocol error")
                .to_string()),
            None => Ok(v.get("result").cloned().unwrap_or(Value::Null)),
        };
        return Ok(Frame::Response { id, result });
    }

    match v.get("method").and_then(Value::as_str) {
        Some(method) => Ok(Frame::Event {
            method: method.to_string(),
        }),
        None => Err(format!("unrecognised protocol frame: {text}")),
    }
}

fn decode_pdf(result: &Value) -> Result<PdfArtifact, String> {
    let data = result
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| "Page.printToPDF returned no data".to_string())?;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map(PdfArtifact::new)
        .map_err(|e| format!("Page.printToPDF returned invalid base64: {e}"))
}

struct CdpSession {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
    /// Events that arrived while waiting for a command reply.
    pending_events: Vec<String>,
}

impl CdpSession {
    async fn connect(ws_url: &str) -> Result<Self, String> {
        let (ws, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| format!("websocket connect to {ws_url} failed: {e}"))?;
        Ok(Self {
            ws,
            next_id: 1,
            pending_events: Vec::new(),
        })
    }

    async fn call(&mut self, method: &str, params: Value) -> Result<Value, String> {
        let id = self.next_id;
        self.next_id += 1;

        let msg = json!({ "id": id, "method": method, "params": params });
        debug!("→ {}", msg);
        self.ws
            .send(Message::Text(msg.to_string()))
            .await
            .map_err(|e| format!("{method}: send failed: {e}"))?;

        loop {
            match self.next_frame().await? {
                Frame::Response { id: got, result } if got == id => {
                    return result.map_err(|e| format!("{method}: {e}"));
                }
                Frame::Response { .. } => {}
                Frame::Event { method } => self.pending_events.push(method),
            }
        }
    }

    async fn wait_for_event(&mut self, name: &str) -> Result<(), String> {
        if let Some(pos) = self.pending_events.iter().position(|m| m == name) {
            self.pending_events.remove(pos);
            return Ok(());
        }
        loop {
            if let Frame::Event { method } = self.next_frame().await? {
                if method == name {
                    return Ok(());
                }
            }
        }
    }

    async fn next_frame(&mut self) -> Result<Frame, String> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => return parse_frame(&text),
                Some(Ok(Message::Close(_))) | None => {
                    return Err("protocol connection closed by browser".to_string())
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(format!("protocol read failed: {e}")),
            }
        }
    }
}
