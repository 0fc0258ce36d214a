use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

/// `GET /ws`: anonymous clients connect here; no handshake parameters.
async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Drive one client connection until it closes.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    // Registration queues the `connected` event on `tx`.
    let coordinator = state.coordinator;
    let connection_id = coordinator.register(tx);

    // Forward outbound events to the socket. Dropping `rx` when the sink
    // fails is what marks the connection dead for the reaper.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sink.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            inbound = ws_stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => coordinator.handle_frame(connection_id, &text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(%connection_id, "websocket read error: {e}");
                    break;
                }
            },
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    coordinator.deregister(connection_id);
}
