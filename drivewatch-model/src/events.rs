//! WebSocket message types for the observer channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{FolderLocation, ScanStatus};
use crate::view::FileView;

/// Outbound events pushed to every connected observer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatchEvent {
    /// Full file-list snapshot with change counts from the latest pass.
    Listing {
        files: Vec<FileView>,
        timestamp: DateTime<Utc>,
        added: usize,
        modified: usize,
        deleted: usize,
        scan_folder_id: String,
        quarantine_folder_id: Option<String>,
    },
    /// Per-file scan status transition.
    ScanUpdate {
        id: String,
        status: ScanStatus,
        timestamp: DateTime<Utc>,
        message: String,
    },
    FileMoved {
        id: String,
        target: FolderLocation,
        timestamp: DateTime<Utc>,
        unchanged: bool,
    },
    FileDeleted {
        id: String,
        timestamp: DateTime<Utc>,
    },
    /// Non-fatal failure surfaced to observers.
    Alert {
        id: Option<String>,
        message: String,
    },
    MoveFailed {
        id: String,
        error: String,
    },
    DeleteFailed {
        id: String,
        error: String,
    },
}

/// Inbound requests from an observer connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    Rescan {
        id: String,
    },
    Move {
        id: String,
        target: FolderLocation,
    },
    Delete {
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = WatchEvent::FileDeleted {
            id: "abc".into(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "file_deleted");
        assert_eq!(value["id"], "abc");
    }

    #[test]
    fn move_request_parses_target_location() {
        let req: ClientRequest =
            serde_json::from_str(r#"{"type":"move","id":"f1","target":"quarantine"}"#).unwrap();
        match req {
            ClientRequest::Move { id, target } => {
                assert_eq!(id, "f1");
                assert_eq!(target, FolderLocation::Quarantine);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }
}
