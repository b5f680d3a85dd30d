use super::*;

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use crate::infrastructure::{
    clock::SystemClock, settings::EngineSettings, telemetry::LogTelemetry,
};

pub(crate) type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub(crate) fn build_test_app(grace: Duration, allow_anonymous: bool) -> Arc<App> {
    let settings = EngineSettings {
        games_db: None,
        disconnect_grace: grace,
        allow_anonymous,
        ..EngineSettings::default()
    };
    Arc::new(App::new(
        settings,
        None,
        Arc::new(LogTelemetry::new()),
        Arc::new(SystemClock::new()),
    ))
}

pub(crate) async fn spawn_ws_server(app: Arc<App>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .with_state(app);

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, handle)
}

pub(crate) async fn ws_connect(addr: SocketAddr, query: &str) -> WsClient {
    let url = format!("ws://{}/ws?{}", addr, query);
    let (ws, _resp) = connect_async(url).await.unwrap();
    ws
}

pub(crate) async fn ws_send_client(ws: &mut WsClient, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).unwrap();
    ws_send_raw(ws, &json).await;
}

pub(crate) async fn ws_send_raw(ws: &mut WsClient, text: &str) {
    ws.send(WsMessage::Text(text.to_string())).await.unwrap();
}

pub(crate) async fn ws_recv_server(ws: &mut WsClient) -> ServerMessage {
    loop {
        let msg = ws.next().await.unwrap().unwrap();
        match msg {
            WsMessage::Text(text) => {
                return serde_json::from_str::<ServerMessage>(&text).unwrap();
            }
            WsMessage::Binary(bin) => {
                let text = String::from_utf8(bin).unwrap();
                return serde_json::from_str::<ServerMessage>(&text).unwrap();
            }
            _ => {}
        }
    }
}

pub(crate) async fn ws_expect_message<F>(
    ws: &mut WsClient,
    timeout: Duration,
    mut predicate: F,
) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws).await;
            if predicate(&msg) {
                return msg;
            }
        }
    })
    .await
    .unwrap()
}

pub(crate) async fn ws_expect_no_message_matching<F>(
    ws: &mut WsClient,
    timeout: Duration,
    mut predicate: F,
) where
    F: FnMut(&ServerMessage) -> bool,
{
    let result = tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws).await;
            if predicate(&msg) {
                panic!("unexpected message: {:?}", msg);
            }
        }
    })
    .await;

    // We only succeed if we timed out without seeing a matching message.
    assert!(result.is_err());
}

/// Wait until the server closes the socket, returning every frame seen first.
pub(crate) async fn ws_expect_close(ws: &mut WsClient, timeout: Duration) -> Vec<ServerMessage> {
    tokio::time::timeout(timeout, async {
        let mut frames = Vec::new();
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(WsMessage::Text(text)) => {
                    frames.push(serde_json::from_str::<ServerMessage>(&text).unwrap());
                }
                Ok(WsMessage::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        frames
    })
    .await
    .unwrap()
}

pub(crate) fn expect_update(msg: ServerMessage) -> fourinrow_shared::SessionSnapshot {
    match msg {
        ServerMessage::Update(snapshot) => snapshot,
        other => panic!("expected update, got {:?}", other),
    }
}

pub(crate) fn piece_count(snapshot: &fourinrow_shared::SessionSnapshot) -> usize {
    snapshot
        .board
        .iter()
        .flatten()
        .filter(|&&cell| cell != 0)
        .count()
}
