/**
 * Client Transports
 *
 * This module abstracts the message pipe a connection session drives, so the
 * same session state machine runs over a real WebSocket in production and
 * over in-process channels in tests and embedded single-process setups.
 *
 * - `WsConnector` / `WsTransport` - the production WebSocket transport
 *   (tokio-tungstenite)
 * - `MemoryConnector` / `MemoryTransport` - an in-process pair; the other
 *   end is driven through `MemoryControl` and `MemoryLink`
 *
 * A transport carries whole protocol messages. Framing errors and malformed
 * frames surface as `ClientError::Protocol` without closing the pipe;
 * transport failures surface as `ClientError::Connectivity`.
 */
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message as WsFrame;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::trace;

use crate::client::error::ClientError;
use crate::shared::error::ProtocolError;
use crate::shared::protocol::FormMessage;

/// An established, message-oriented duplex pipe
///
/// `recv` returns:
/// - `Some(Ok(message))` - a decoded inbound message
/// - `Some(Err(ClientError::Protocol(_)))` - a malformed frame; the pipe is
///   still usable and the caller should keep reading
/// - `Some(Err(_))` - a transport failure; the caller should treat the pipe
///   as dead
/// - `None` - the peer closed the pipe
#[async_trait]
pub trait Transport: Send {
    /// Transmit one message
    async fn send(&mut self, message: &FormMessage) -> Result<(), ClientError>;

    /// Wait for the next inbound message
    async fn recv(&mut self) -> Option<Result<FormMessage, ClientError>>;

    /// Close the pipe; best effort, idempotent
    async fn close(&mut self);
}

/// Establishes transports; one per (re)connect attempt
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a fresh transport
    async fn connect(&self) -> Result<Box<dyn Transport>, ClientError>;
}

// ---------------------------------------------------------------------------
// WebSocket transport
// ---------------------------------------------------------------------------

/// Connects to a WebSocket endpoint (`ws://` or `wss://`)
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// Create a connector for the given endpoint URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, ClientError> {
        let (stream, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            ClientError::connectivity(format!("connect to {} failed: {}", self.url, e))
        })?;
        trace!("[Transport] connected to {}", self.url);
        Ok(Box::new(WsTransport { stream }))
    }
}

/// One established WebSocket connection
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, message: &FormMessage) -> Result<(), ClientError> {
        let text = message.encode()?;
        self.stream
            .send(WsFrame::Text(text))
            .await
            .map_err(|e| ClientError::connectivity(format!("send failed: {}", e)))
    }

    async fn recv(&mut self) -> Option<Result<FormMessage, ClientError>> {
        loop {
            match self.stream.next().await? {
                Ok(WsFrame::Text(text)) => {
                    return Some(FormMessage::decode(&text).map_err(ClientError::from))
                }
                Ok(WsFrame::Binary(_)) => {
                    return Some(Err(ProtocolError::unexpected_frame("binary").into()))
                }
                // tungstenite answers pings itself; both are liveness-only
                Ok(WsFrame::Ping(_)) | Ok(WsFrame::Pong(_)) | Ok(WsFrame::Frame(_)) => continue,
                Ok(WsFrame::Close(_)) => return None,
                Err(e) => {
                    return Some(Err(ClientError::connectivity(format!(
                        "receive failed: {}",
                        e
                    ))))
                }
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

// ---------------------------------------------------------------------------
// In-process transport
// ---------------------------------------------------------------------------

/// Connector half of an in-process transport pair
///
/// Every `connect` call asks the paired [`MemoryControl`] to accept or
/// refuse, which makes connection failures and reconnect sequences fully
/// scriptable.
pub struct MemoryConnector {
    requests: mpsc::UnboundedSender<ConnectRequest>,
}

/// Control half of an in-process transport pair
pub struct MemoryControl {
    requests: mpsc::UnboundedReceiver<ConnectRequest>,
}

struct ConnectRequest {
    reply: oneshot::Sender<MemoryTransport>,
}

impl MemoryConnector {
    /// Create a connector and its control half
    pub fn pair() -> (Self, MemoryControl) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { requests: tx }, MemoryControl { requests: rx })
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send(ConnectRequest { reply: reply_tx })
            .map_err(|_| ClientError::connectivity("link control dropped"))?;
        let transport = reply_rx
            .await
            .map_err(|_| ClientError::connectivity("connection refused"))?;
        Ok(Box::new(transport))
    }
}

impl MemoryControl {
    /// Accept the next connect attempt, producing the control side's link
    ///
    /// Returns `None` once the connector half is gone.
    pub async fn accept(&mut self) -> Option<MemoryLink> {
        let request = self.requests.recv().await?;
        let (to_client_tx, to_client_rx) = mpsc::unbounded_channel();
        let (from_client_tx, from_client_rx) = mpsc::unbounded_channel();
        let transport = MemoryTransport {
            inbound: to_client_rx,
            outbound: Some(from_client_tx),
        };
        // If the connecting side gave up in the meantime the link is stillborn;
        // the caller notices through `sent()` returning None.
        let _ = request.reply.send(transport);
        Some(MemoryLink {
            from_client: from_client_rx,
            to_client: to_client_tx,
        })
    }

    /// Refuse the next connect attempt
    ///
    /// Returns `false` once the connector half is gone.
    pub async fn refuse(&mut self) -> bool {
        match self.requests.recv().await {
            // Dropping the reply sender fails the connect with a
            // connectivity error on the session side.
            Some(request) => {
                drop(request.reply);
                true
            }
            None => false,
        }
    }
}

/// The peer end of one accepted in-process connection
pub struct MemoryLink {
    from_client: mpsc::UnboundedReceiver<FormMessage>,
    to_client: mpsc::UnboundedSender<FormMessage>,
}

impl MemoryLink {
    /// Wait for the next message the client transmitted
    ///
    /// Returns `None` once the client side closed or dropped the transport.
    pub async fn sent(&mut self) -> Option<FormMessage> {
        self.from_client.recv().await
    }

    /// Take a transmitted message without waiting, if one is buffered
    pub fn try_sent(&mut self) -> Option<FormMessage> {
        self.from_client.try_recv().ok()
    }

    /// Deliver a message to the client side
    ///
    /// Returns `false` if the client side is gone.
    pub fn push(&self, message: FormMessage) -> bool {
        self.to_client.send(message).is_ok()
    }

    /// Sever the link, as if the connection dropped
    pub fn sever(self) {}
}

/// Client side of one in-process connection
pub struct MemoryTransport {
    inbound: mpsc::UnboundedReceiver<FormMessage>,
    outbound: Option<mpsc::UnboundedSender<FormMessage>>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, message: &FormMessage) -> Result<(), ClientError> {
        let outbound = self
            .outbound
            .as_ref()
            .ok_or_else(|| ClientError::connectivity("transport closed"))?;
        outbound
            .send(message.clone())
            .map_err(|_| ClientError::connectivity("link severed"))
    }

    async fn recv(&mut self) -> Option<Result<FormMessage, ClientError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.outbound = None;
        self.inbound.close();
    }
}
