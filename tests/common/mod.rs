#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tower::ServiceExt;

use tvo_coordinator::config::Config;
use tvo_coordinator::coordinator::Coordinator;
use tvo_coordinator::hub::{ConnectionHub, ConnectionId};
use tvo_coordinator::state::AppState;

/// Test helper: send a GET request to the app and return (status, body).
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap_or_default();

    let response = app.clone().oneshot(request).await.unwrap_or_default();

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let body_str = String::from_utf8(body.to_vec()).unwrap_or_default();

    (status, body_str)
}

/// App state with default configuration.
pub fn test_state() -> AppState {
    AppState::new(Config {
        log_level: "warn".to_string(),
        ..Config::default()
    })
}

/// A coordinator that does not auto-match on announce, so tests drive
/// matching explicitly.
pub fn coordinator() -> Coordinator {
    Coordinator::new(ConnectionHub::new(), false)
}

/// A registered test client: its id and the receiving end of its outbound
/// channel.
pub struct Client {
    pub id: ConnectionId,
    pub rx: UnboundedReceiver<String>,
}

impl Client {
    /// Every event queued for this client so far, decoded.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut events = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            events.push(serde_json::from_str(&frame).unwrap_or_default());
        }
        events
    }

    /// Events of one type, draining everything else.
    pub fn take(&mut self, event_type: &str) -> Vec<Value> {
        self.drain()
            .into_iter()
            .filter(|event| event["type"] == event_type)
            .collect()
    }
}

/// Register a client and discard its `connected` event.
pub fn connect(coordinator: &Coordinator) -> Client {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = coordinator.register(tx);
    let mut client = Client { id, rx };
    client.drain();
    client
}

/// Register and announce a client under `peer_id`.
pub fn connect_announced(coordinator: &Coordinator, peer_id: &str) -> Client {
    let client = connect(coordinator);
    let _ = coordinator.announce(client.id, peer_id);
    client
}
