use anyhow::Result;
use axum::extract::ws::{Message, Utf8Bytes};

use drivewatch_model::{ClientRequest, WatchEvent};

/// Convert a WatchEvent to a WebSocket message
pub fn event_to_websocket(event: &WatchEvent) -> Result<Message> {
    let json = serde_json::to_string(event)?;
    Ok(Message::Text(Utf8Bytes::from(json)))
}

/// Convert a WebSocket message to a ClientRequest
pub fn websocket_to_request(msg: Message) -> Result<ClientRequest> {
    match msg {
        Message::Text(text) => {
            let request: ClientRequest = serde_json::from_str(text.as_str())?;
            Ok(request)
        }
        Message::Binary(bin) => {
            let request: ClientRequest = serde_json::from_slice(bin.as_ref())?;
            Ok(request)
        }
        _ => Err(anyhow::anyhow!("Unsupported message type")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivewatch_model::FolderLocation;

    #[test]
    fn inbound_text_parses_to_request() {
        let msg = Message::Text(Utf8Bytes::from(
            r#"{"type":"rescan","id":"file-1"}"#.to_string(),
        ));
        let request = websocket_to_request(msg).unwrap();
        assert!(matches!(request, ClientRequest::Rescan { id } if id == "file-1"));
    }

    #[test]
    fn outbound_event_carries_type_tag() {
        let event = WatchEvent::MoveFailed {
            id: "f".into(),
            error: "not authorized".into(),
        };
        let msg = event_to_websocket(&event).unwrap();
        match msg {
            Message::Text(text) => assert!(text.as_str().contains("\"move_failed\"")),
            _ => panic!("expected a text frame"),
        }
    }

    #[test]
    fn binary_move_request_parses() {
        let msg = Message::Binary(
            r#"{"type":"move","id":"f","target":"scan"}"#.as_bytes().to_vec().into(),
        );
        let request = websocket_to_request(msg).unwrap();
        assert!(matches!(
            request,
            ClientRequest::Move {
                target: FolderLocation::Scan,
                ..
            }
        ));
    }
}
