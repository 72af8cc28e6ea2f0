use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use drivewatch_core::WatchError;
use drivewatch_model::{ClientRequest, WatchEvent};

use crate::state::AppState;
use crate::websocket::{Connection, messages};

/// Handle WebSocket upgrade request
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<WatchEvent>(100);

    let connection = Connection::new(tx);
    let conn_id = connection.id;
    info!(%conn_id, "observer connected");

    // Outgoing pump: per-connection channel -> socket
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Ok(ws_msg) = messages::event_to_websocket(&event) {
                if ws_sender.send(ws_msg).await.is_err() {
                    break;
                }
            }
        }
    });

    // Broadcast pump: engine event bus -> this connection
    {
        let mut events = state.engine.subscribe().await;
        let connection = connection.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if connection.send(event).await.is_err() {
                    break;
                }
            }
        });
    }

    // Initial snapshot so a fresh observer renders without waiting for the
    // next state change.
    let report = state.engine.listing_report().await;
    let _ = connection
        .send(WatchEvent::Listing {
            files: report.files,
            timestamp: report.timestamp,
            added: 0,
            modified: 0,
            deleted: 0,
            scan_folder_id: state.config.scan_folder_id.clone(),
            quarantine_folder_id: state.config.quarantine_folder_id.clone(),
        })
        .await;

    // Handle incoming requests
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(msg @ (Message::Text(_) | Message::Binary(_))) => {
                match messages::websocket_to_request(msg) {
                    Ok(request) => handle_request(request, &state, &connection).await,
                    Err(e) => debug!(%conn_id, "ignoring malformed request: {e}"),
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!(%conn_id, "WebSocket error: {e}");
                break;
            }
        }
    }

    info!(%conn_id, "observer disconnected");
}

/// Dispatch one observer request against the engine. Failures are answered on
/// the requesting connection as structured events, never as raw errors.
async fn handle_request(request: ClientRequest, state: &AppState, connection: &Connection) {
    match request {
        ClientRequest::Rescan { id } => {
            let engine = state.engine.clone();
            tokio::spawn(async move {
                engine.begin_scan(&id).await;
            });
        }
        ClientRequest::Move { id, target } => {
            if let Err(err) = state.engine.move_file(&id, target).await {
                let _ = connection
                    .send(WatchEvent::MoveFailed {
                        id,
                        error: reject_reason(&err),
                    })
                    .await;
            }
        }
        ClientRequest::Delete { id } => {
            if let Err(err) = state.engine.delete_file(&id).await {
                let _ = connection
                    .send(WatchEvent::DeleteFailed {
                        id,
                        error: reject_reason(&err),
                    })
                    .await;
            }
        }
    }
}

fn reject_reason(err: &WatchError) -> String {
    match err {
        WatchError::NotAuthorized => "not authorized".to_string(),
        other => other.to_string(),
    }
}
