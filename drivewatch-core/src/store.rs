//! In-memory authoritative state: the known file list, scan records, and the
//! per-file activity lock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use drivewatch_model::{FileRecord, FolderLocation, ScanRecord};

/// Sole owner of the authoritative [`FileRecord`] list and the
/// [`ScanRecord`] map. All mutations are last-writer-wins; interleavings are
/// serialized by the `RwLock`s and, per file, by the activity lock.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    files: Arc<RwLock<Vec<FileRecord>>>,
    scans: Arc<RwLock<HashMap<String, ScanRecord>>>,
    active: Arc<RwLock<HashSet<String>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the authoritative list with a fresh snapshot.
    pub async fn replace(&self, snapshot: Vec<FileRecord>) {
        *self.files.write().await = snapshot;
    }

    pub async fn files(&self) -> Vec<FileRecord> {
        self.files.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<FileRecord> {
        self.files.read().await.iter().find(|f| f.id == id).cloned()
    }

    /// Insert or update a record in place, preserving list order for updates.
    pub async fn upsert(&self, record: FileRecord) {
        let mut files = self.files.write().await;
        match files.iter_mut().find(|f| f.id == record.id) {
            Some(existing) => *existing = record,
            None => files.push(record),
        }
    }

    pub async fn remove(&self, id: &str) -> bool {
        let mut files = self.files.write().await;
        let before = files.len();
        files.retain(|f| f.id != id);
        files.len() != before
    }

    pub async fn set_location(&self, id: &str, location: FolderLocation) -> bool {
        let mut files = self.files.write().await;
        match files.iter_mut().find(|f| f.id == id) {
            Some(record) => {
                record.location = location;
                true
            }
            None => false,
        }
    }

    pub async fn scan_of(&self, id: &str) -> Option<ScanRecord> {
        self.scans.read().await.get(id).copied()
    }

    pub async fn set_scan(&self, id: &str, record: ScanRecord) {
        self.scans.write().await.insert(id.to_string(), record);
    }

    pub async fn clear_scan(&self, id: &str) {
        self.scans.write().await.remove(id);
    }

    /// Drop scan records whose file no longer exists. Terminal writes against
    /// vanished records are harmless but must not accumulate.
    pub async fn prune_orphaned_scans(&self) {
        let known: HashSet<String> = {
            let files = self.files.read().await;
            files.iter().map(|f| f.id.clone()).collect()
        };
        self.scans.write().await.retain(|id, _| known.contains(id));
    }

    /// Claim the activity lock for `id`. Returns false when a scan sequence
    /// is already in flight for that id.
    pub async fn try_lock(&self, id: &str) -> bool {
        self.active.write().await.insert(id.to_string())
    }

    pub async fn unlock(&self, id: &str) {
        self.active.write().await.remove(id);
    }

    pub async fn is_locked(&self, id: &str) -> bool {
        self.active.read().await.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drivewatch_model::ScanStatus;

    fn record(id: &str) -> FileRecord {
        FileRecord {
            id: id.into(),
            name: format!("{id}.txt"),
            mime_type: "text/plain".into(),
            size_bytes: Some(1),
            modified_at: Utc::now(),
            view_link: None,
            download_link: None,
            content_digest: None,
            location: FolderLocation::Scan,
        }
    }

    #[tokio::test]
    async fn upsert_updates_in_place() {
        let store = StateStore::new();
        store.replace(vec![record("a"), record("b")]).await;

        let mut changed = record("a");
        changed.name = "renamed.txt".into();
        store.upsert(changed).await;

        let files = store.files().await;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "renamed.txt");
    }

    #[tokio::test]
    async fn prune_drops_scans_without_files() {
        let store = StateStore::new();
        store.replace(vec![record("kept")]).await;
        store
            .set_scan("kept", ScanRecord::new(ScanStatus::Clean))
            .await;
        store
            .set_scan("orphan", ScanRecord::new(ScanStatus::Pending))
            .await;

        store.prune_orphaned_scans().await;

        assert!(store.scan_of("kept").await.is_some());
        assert!(store.scan_of("orphan").await.is_none());
    }

    #[tokio::test]
    async fn lock_is_exclusive_per_id() {
        let store = StateStore::new();
        assert!(store.try_lock("x").await);
        assert!(!store.try_lock("x").await);
        assert!(store.is_locked("x").await);
        store.unlock("x").await;
        assert!(store.try_lock("x").await);
    }
}
