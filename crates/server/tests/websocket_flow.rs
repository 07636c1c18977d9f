//! End-to-end tests of `/ws/chat` with a real WebSocket client.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pairchat_server::core::config::{AppState, ChatServerConfig};
use pairchat_server::{app, build_state};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Serve the full router on an ephemeral port
async fn boot_server() -> (TempDir, AppState, SocketAddr) {
    let dir = tempdir().unwrap();
    let mut config = ChatServerConfig::default();
    config.database_url = format!("sqlite://{}", dir.path().join("ws.db").display());
    config.ai.enabled = false;
    config.bcrypt_cost = 4;

    let (state, _worker) = build_state(config).await.unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (dir, state, addr)
}

async fn connect(addr: SocketAddr, identity: Option<&str>) -> WsStream {
    let mut request = format!("ws://{}/ws/chat", addr).into_client_request().unwrap();
    if let Some(identity) = identity {
        request.headers_mut().insert(
            "Cookie",
            HeaderValue::from_str(&format!("X-Authorization={}", identity)).unwrap(),
        );
    }
    let (ws, _) = connect_async(request).await.unwrap();
    ws
}

/// Next text frame as JSON
async fn read_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timeout waiting for message")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_presence_chat_and_leave_over_socket() {
    let (_dir, state, addr) = boot_server().await;
    let bob = state.auth.create_user("bob", "pw").await.unwrap();

    let mut alice_ws = connect(addr, Some("alice")).await;
    let joined = read_json(&mut alice_ws).await;
    assert_eq!(joined["sender"], "alice");
    assert_eq!(joined["message"], "got connected");

    let mut bob_ws = connect(addr, Some("bob")).await;
    let joined = read_json(&mut alice_ws).await;
    assert_eq!(joined["sender"], "bob");
    assert_eq!(joined["message"], "got connected");
    assert_eq!(read_json(&mut bob_ws).await["sender"], "bob");

    // Non-JSON is skipped; the binary frame after it still goes through
    bob_ws.send(Message::text("not json")).await.unwrap();
    let frame = json!({"chat_id": 1, "sender_id": bob.id, "message": "hi"});
    bob_ws
        .send(Message::binary(frame.to_string().into_bytes()))
        .await
        .unwrap();

    let chat = read_json(&mut alice_ws).await;
    assert_eq!(chat["sender"], "bob");
    assert_eq!(chat["message"], "hi");
    assert_eq!(chat["db_status"]["status"], true);

    bob_ws.close(None).await.unwrap();
    let left = read_json(&mut alice_ws).await;
    assert_eq!(left["sender"], "bob");
    assert_eq!(left["message"], "left");
}

#[tokio::test]
async fn test_socket_without_identity_never_joins() {
    let (_dir, state, addr) = boot_server().await;

    let mut anonymous = connect(addr, None).await;

    // The server drops the socket without a session ever registering
    let next = timeout(TIMEOUT, anonymous.next()).await.expect("timeout waiting for close");
    assert!(!matches!(next, Some(Ok(Message::Text(_)))));
    assert!(state.realtime.registry().is_empty());

    let mut carol = connect(addr, Some("carol")).await;
    assert_eq!(read_json(&mut carol).await["sender"], "carol");
    assert_eq!(state.realtime.registry().len(), 1);
}
