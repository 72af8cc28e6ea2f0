//! Reconciliation loop: periodic snapshot, diff, state update, scan launch.

use std::collections::HashMap;

use tracing::{debug, error, info};

use drivewatch_model::{FileRecord, FolderLocation, WatchEvent};

use crate::diff::detect_changes;
use crate::engine::Engine;
use crate::error::Result;

impl Engine {
    /// One reconciliation pass. Benign no-op when unauthorized. A listing
    /// failure aborts the pass without touching the authoritative list; the
    /// fixed poll period is the retry interval.
    pub async fn tick(&self) -> Result<()> {
        if !self.is_authorized() {
            debug!("skipping reconciliation pass: not authorized");
            return Ok(());
        }

        let snapshot = self.fetch_snapshot().await?;
        let previous = self.store.files().await;
        let changes = detect_changes(&previous, &snapshot);

        if changes.is_empty() {
            debug!(files = snapshot.len(), "no changes observed");
            return Ok(());
        }

        info!(
            added = changes.added.len(),
            modified = changes.modified.len(),
            deleted = changes.deleted.len(),
            "reconciling observed changes"
        );

        self.store.replace(snapshot).await;
        for file in &changes.modified {
            // A modified file needs a fresh verdict.
            self.store.clear_scan(&file.id).await;
        }
        for file in &changes.deleted {
            self.store.clear_scan(&file.id).await;
            self.store.unlock(&file.id).await;
        }
        self.store.prune_orphaned_scans().await;

        // Quarantine arrivals are assumed already adjudicated; only files
        // observed under the scan folder get an automatic sequence.
        for file in changes.added.iter().chain(changes.modified.iter()) {
            if file.location == FolderLocation::Scan {
                let engine = self.clone();
                let id = file.id.clone();
                tokio::spawn(async move {
                    engine.begin_scan(&id).await;
                });
            }
        }

        self.publish_listing(
            changes.added.len(),
            changes.modified.len(),
            changes.deleted.len(),
        )
        .await;

        Ok(())
    }

    /// Fetch and merge one snapshot of both monitored folders, quarantine
    /// winning on id collision, sorted by `modified_at` descending with name
    /// descending as the tie-break for presentation stability.
    async fn fetch_snapshot(&self) -> Result<Vec<FileRecord>> {
        let listed = self.provider.list(&self.options.scan_folder_id).await?;
        let mut merged: Vec<FileRecord> = listed
            .into_iter()
            .map(|f| f.into_record(FolderLocation::Scan))
            .collect();

        if let Some(quarantine) = &self.options.quarantine_folder_id {
            let quarantined = self.provider.list(quarantine).await?;
            let mut index: HashMap<String, usize> = merged
                .iter()
                .enumerate()
                .map(|(i, f)| (f.id.clone(), i))
                .collect();
            for remote in quarantined {
                let record = remote.into_record(FolderLocation::Quarantine);
                match index.get(&record.id) {
                    Some(&i) => merged[i] = record,
                    None => {
                        index.insert(record.id.clone(), merged.len());
                        merged.push(record);
                    }
                }
            }
        }

        merged.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(merged)
    }

    /// Drive [`Engine::tick`] forever: once immediately, then on the fixed
    /// poll period. Pass failures are reported and never stop the loop.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.options.poll_interval);
        loop {
            interval.tick().await;
            if let Err(err) = self.tick().await {
                error!("reconciliation pass failed: {err}");
                self.publish(WatchEvent::Alert {
                    id: None,
                    message: format!("poll failed: {err}"),
                })
                .await;
            }
        }
    }
}
