/**
 * WebSocket Session Handler
 *
 * Accepts upgraded connections, wires each socket to the coordinator, and
 * pumps frames in both directions. One bounded channel per session carries
 * coordinator fan-out to the socket; the read loop decodes frames and
 * forwards them as coordinator commands.
 *
 * # Lifecycle
 *
 * 1. Upgrade, allocate a session id, register with the coordinator
 * 2. Spawn the send task (outbound channel to socket)
 * 3. Read frames until close or error, forwarding decoded messages
 * 4. Tell the coordinator the session is gone and abort the send task
 *
 * Malformed frames are reported separately so the coordinator can reply
 * with a protocol error without other sessions ever noticing.
 */
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};
use uuid::Uuid;

use crate::backend::coordinator::SessionId;
use crate::backend::server::state::AppState;
use crate::shared::error::ProtocolError;
use crate::shared::protocol::FormMessage;

/// Upgrade handler for `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one session's socket until it closes
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session: SessionId = Uuid::new_v4();
    debug!("[Ws] session {} opened", session);

    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel(state.config.session_buffer);
    state.coordinator.register(session, outbound_tx);

    // Outbound pump: coordinator fan-out to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let text = match message.encode() {
                Ok(text) => text,
                Err(e) => {
                    error!("[Ws] dropping unencodable frame: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Inbound pump: socket to the coordinator.
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match FormMessage::decode(text.as_str()) {
                Ok(message) => {
                    trace!("[Ws] {} sent {}", session, message.kind());
                    state.coordinator.inbound(session, message);
                }
                Err(error) => state.coordinator.malformed(session, error),
            },
            Ok(Message::Binary(_)) => state
                .coordinator
                .malformed(session, ProtocolError::unexpected_frame("binary")),
            // Protocol-level pings are answered by the socket layer itself.
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!("[Ws] session {} socket error: {}", session, e);
                break;
            }
        }
    }

    debug!("[Ws] session {} closed", session);
    state.coordinator.disconnect(session);
    send_task.abort();
}
