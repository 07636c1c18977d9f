//! `GET /ws/chat` WebSocket endpoint.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::events::OutboundEvent;
use super::session::{self, Inbound, SessionTransport};
use super::RealtimeHub;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;

/// WebSocket upgrade handler
pub async fn ws_chat(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ctx: Ctx,
) -> impl IntoResponse {
    let hub = state.realtime.clone();
    let identity = ctx.identity().map(str::to_string);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, identity))
}

async fn handle_socket(socket: WebSocket, hub: Arc<RealtimeHub>, identity: Option<String>) {
    let (ws_tx, ws_rx) = socket.split();
    let (handle, outbox) = hub.open_handle();
    let session_id = handle.id();

    let writer = tokio::spawn(forward_outbox(outbox, ws_tx));

    let mut transport = WsTransport { stream: ws_rx };
    let state = session::drive(&hub, &mut transport, identity, handle).await;

    info!("Session {} finished in state {:?}", session_id, state);
    writer.abort();
}

/// Drain one session's outbox into its socket
async fn forward_outbox(
    mut outbox: mpsc::Receiver<Arc<OutboundEvent>>,
    mut ws_tx: SplitSink<WebSocket, Message>,
) {
    while let Some(event) = outbox.recv().await {
        let Some(frame) = encode(event.as_ref()) else {
            continue;
        };

        if ws_tx.send(frame).await.is_err() {
            debug!("WebSocket send failed, client disconnected");
            break;
        }
    }
}

struct WsTransport {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl SessionTransport for WsTransport {
    async fn recv(&mut self) -> Inbound {
        loop {
            match self.stream.next().await {
                Some(Ok(message)) => {
                    if let Some(inbound) = classify(message) {
                        return inbound;
                    }
                }
                Some(Err(e)) => {
                    debug!("WebSocket error: {}", e);
                    return Inbound::Disconnected;
                }
                None => return Inbound::Disconnected,
            }
        }
    }
}

/// Map one socket message to a session input; `None` for control frames
fn classify(message: Message) -> Option<Inbound> {
    let frame = match message {
        Message::Text(text) => serde_json::from_str(text.as_str()),
        Message::Binary(bytes) => serde_json::from_slice(&bytes),
        Message::Close(_) => return Some(Inbound::Disconnected),
        // Ping/pong are answered by axum
        Message::Ping(_) | Message::Pong(_) => return None,
    };

    Some(match frame {
        Ok(value) => Inbound::Frame(value),
        Err(e) => Inbound::Undecodable(e.to_string()),
    })
}

fn encode(event: &OutboundEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            error!("Failed to serialize outbound event: {}", e);
            None
        }
    }
}
