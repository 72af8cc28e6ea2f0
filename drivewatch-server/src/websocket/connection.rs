use anyhow::Result;
use tokio::sync::mpsc;
use uuid::Uuid;

use drivewatch_model::WatchEvent;

/// One observer connection: an id for logging and the channel feeding its
/// outgoing socket half.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Unique connection ID
    pub id: Uuid,
    /// Channel to send events to this connection
    sender: mpsc::Sender<WatchEvent>,
}

impl Connection {
    pub fn new(sender: mpsc::Sender<WatchEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    /// Send an event to this connection
    pub async fn send(&self, event: WatchEvent) -> Result<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| anyhow::anyhow!("Failed to send event: channel closed"))
    }
}
