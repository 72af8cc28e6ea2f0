//! Observer broadcast channel and the reporting-sink projection.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use drivewatch_model::{FileView, WatchEvent};

pub type EventReceiver = mpsc::UnboundedReceiver<WatchEvent>;
type EventSender = mpsc::UnboundedSender<WatchEvent>;

/// Fixed header row for the reporting sink.
pub const REPORT_HEADER: [&str; 6] = ["MD5", "Name", "Size", "Type", "Time", "Status"];

/// Fan-out bus for observer events. Subscribers receive every event published
/// after they join; closed channels are dropped on the next publish.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    senders: Arc<Mutex<Vec<EventSender>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().await.push(tx);
        rx
    }

    pub async fn publish(&self, event: WatchEvent) {
        let mut senders = self.senders.lock().await;
        senders.retain(|sender| sender.send(event.clone()).is_ok());
    }

    pub async fn observer_count(&self) -> usize {
        self.senders.lock().await.len()
    }
}

/// Flatten the merged view into the tabular projection the reporting sink
/// overwrites on every broadcast.
pub fn report_rows(views: &[FileView]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(views.len() + 1);
    rows.push(REPORT_HEADER.iter().map(|s| (*s).to_string()).collect());
    for view in views {
        rows.push(vec![
            view.content_digest.clone().unwrap_or_default(),
            view.name.clone(),
            view.size_bytes
                .map_or_else(|| "unknown".to_string(), |s| s.to_string()),
            view.mime_type.clone(),
            view.modified_at.to_rfc3339(),
            view.status.to_string(),
        ]);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drivewatch_model::{FolderLocation, ScanStatus};

    #[tokio::test]
    async fn publish_reaches_every_subscriber_and_drops_closed() {
        let bus = EventBus::new();
        let mut first = bus.subscribe().await;
        let second = bus.subscribe().await;
        drop(second);

        bus.publish(WatchEvent::Alert {
            id: None,
            message: "hello".into(),
        })
        .await;

        assert!(matches!(
            first.recv().await,
            Some(WatchEvent::Alert { .. })
        ));
        assert_eq!(bus.observer_count().await, 1);
    }

    #[test]
    fn rows_start_with_the_fixed_header() {
        let view = FileView {
            id: "f".into(),
            name: "a.txt".into(),
            mime_type: "text/plain".into(),
            size_bytes: None,
            modified_at: Utc::now(),
            view_link: None,
            download_link: None,
            content_digest: None,
            location: FolderLocation::Scan,
            status: ScanStatus::Pending,
            last_scanned_at: None,
        };
        let rows = report_rows(&[view]);
        assert_eq!(rows[0], ["MD5", "Name", "Size", "Type", "Time", "Status"]);
        assert_eq!(rows[1][1], "a.txt");
        assert_eq!(rows[1][2], "unknown");
        assert_eq!(rows[1][5], "pending");
    }
}
