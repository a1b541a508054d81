//! Shared scaffolding: a minimal in-process hub speaking the bus protocol.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

pub type ServerSocket = WebSocketStream<TcpStream>;

/// Binds a listener on an ephemeral port and returns it with its URL.
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("ws://{addr}/api/websocket"))
}

/// Accepts one connection and walks it through a successful handshake,
/// asserting the client's auth frame is well-formed along the way.
pub async fn accept_and_auth(listener: &TcpListener, expected_token: &str) -> ServerSocket {
    let (tcp, _) = listener.accept().await.unwrap();
    let mut socket = accept_async(tcp).await.unwrap();

    let auth = read_json(&mut socket).await;
    assert_eq!(auth["type"], "auth");
    assert_eq!(auth["access_token"], expected_token);
    assert!(
        auth.get("id").is_none(),
        "auth frame must not carry a command ID, got: {auth}"
    );

    send_json(&mut socket, json!({"type": "auth_ok", "ha_version": "2026.8.1"})).await;
    socket
}

/// Reads frames until a text frame arrives and parses it.
pub async fn read_json(socket: &mut ServerSocket) -> Value {
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            other => panic!("expected a text frame, got: {other:?}"),
        }
    }
}

pub async fn send_json(socket: &mut ServerSocket, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}
