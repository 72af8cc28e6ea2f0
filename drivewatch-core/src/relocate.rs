//! Verdict-driven and manual relocation between the monitored folders, plus
//! remote deletion.
//!
//! Every move pre-checks the file's current remote parents: the activity lock
//! serializes scan sequences, not relocation requests, so a manual move can
//! race a verdict-triggered one. The pre-check turns the loser into a no-op.

use chrono::Utc;
use tracing::{info, warn};

use drivewatch_model::{FolderLocation, ScanRecord, ScanStatus, WatchEvent};

use crate::engine::Engine;
use crate::error::{Result, WatchError};
use crate::verdict::Verdict;

/// Result of a manual move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// True when the file was already at the target folder.
    pub unchanged: bool,
}

impl Engine {
    /// Apply a terminal scan verdict: infected files migrate toward
    /// quarantine, clean files previously quarantined migrate back.
    pub(crate) async fn apply_verdict(
        &self,
        id: &str,
        verdict: Verdict,
        prior_location: FolderLocation,
    ) {
        match verdict {
            Verdict::Infected if prior_location != FolderLocation::Quarantine => {
                self.quarantine_file(id).await;
            }
            Verdict::Clean if prior_location == FolderLocation::Quarantine => {
                self.restore_file(id).await;
            }
            // No relocation needed; the terminal status still has to reach
            // observers and the reporting sink.
            _ => self.publish_listing(0, 0, 0).await,
        }
    }

    /// Move an infected file into the quarantine folder. Failures alert and
    /// leave local state untouched; the next scan is the retry path.
    async fn quarantine_file(&self, id: &str) {
        let Some(quarantine) = self.options.quarantine_folder_id.clone() else {
            warn!(id, "infected file left in place: no quarantine folder configured");
            return;
        };

        let parents = match self.provider.parents(id).await {
            Ok(parents) => parents,
            Err(err) => {
                self.publish(WatchEvent::Alert {
                    id: Some(id.to_string()),
                    message: format!("quarantine move failed: {err}"),
                })
                .await;
                return;
            }
        };

        if parents.contains(&quarantine) {
            // Already adjudicated remotely, e.g. by a racing manual move.
            self.store
                .set_location(id, FolderLocation::Quarantine)
                .await;
            self.publish(WatchEvent::FileMoved {
                id: id.to_string(),
                target: FolderLocation::Quarantine,
                timestamp: Utc::now(),
                unchanged: true,
            })
            .await;
            return;
        }

        match self
            .provider
            .move_file(id, &quarantine, &parents.parents)
            .await
        {
            Ok(_) => {
                info!(id, "infected file moved to quarantine");
                self.store
                    .set_location(id, FolderLocation::Quarantine)
                    .await;
                self.publish(WatchEvent::FileMoved {
                    id: id.to_string(),
                    target: FolderLocation::Quarantine,
                    timestamp: Utc::now(),
                    unchanged: false,
                })
                .await;
                self.publish_listing(0, 0, 0).await;
            }
            Err(err) => {
                warn!(id, "quarantine move failed: {err}");
                self.publish(WatchEvent::Alert {
                    id: Some(id.to_string()),
                    message: format!("quarantine move failed: {err}"),
                })
                .await;
            }
        }
    }

    /// Move a clean file out of quarantine back to the scan folder and
    /// refresh its metadata from the provider.
    async fn restore_file(&self, id: &str) {
        let scan_folder = self.options.scan_folder_id.clone();

        let parents = match self.provider.parents(id).await {
            Ok(parents) => parents,
            Err(err) => {
                self.publish(WatchEvent::Alert {
                    id: Some(id.to_string()),
                    message: format!("restore move failed: {err}"),
                })
                .await;
                return;
            }
        };

        if !parents.contains(&scan_folder) {
            if let Err(err) = self
                .provider
                .move_file(id, &scan_folder, &parents.parents)
                .await
            {
                warn!(id, "restore move failed: {err}");
                self.publish(WatchEvent::Alert {
                    id: Some(id.to_string()),
                    message: format!("restore move failed: {err}"),
                })
                .await;
                return;
            }
        }

        // The move may have altered provider-side fields; refresh the record.
        match self.provider.metadata(id).await {
            Ok(remote) => {
                self.store
                    .upsert(remote.into_record(FolderLocation::Scan))
                    .await;
            }
            Err(err) => {
                warn!(id, "metadata refresh after restore failed: {err}");
                self.store.set_location(id, FolderLocation::Scan).await;
            }
        }
        let carried = self.store.scan_of(id).await.and_then(|s| s.last_scanned_at);
        self.store
            .set_scan(
                id,
                ScanRecord {
                    status: ScanStatus::Clean,
                    last_scanned_at: carried,
                },
            )
            .await;

        info!(id, "clean file restored to scan folder");
        self.publish(WatchEvent::FileMoved {
            id: id.to_string(),
            target: FolderLocation::Scan,
            timestamp: Utc::now(),
            unchanged: false,
        })
        .await;
        self.publish_listing(0, 0, 0).await;
    }

    /// Observer-initiated move. Requires authorization. A file already at the
    /// target folder is a no-op success with `unchanged = true`.
    pub async fn move_file(&self, id: &str, target: FolderLocation) -> Result<MoveOutcome> {
        if !self.is_authorized() {
            return Err(WatchError::NotAuthorized);
        }

        let target_folder = match target {
            FolderLocation::Scan => self.options.scan_folder_id.clone(),
            FolderLocation::Quarantine => self
                .options
                .quarantine_folder_id
                .clone()
                .ok_or(WatchError::QuarantineUnconfigured)?,
        };

        let parents = self.provider.parents(id).await?;
        if parents.contains(&target_folder) {
            self.publish(WatchEvent::FileMoved {
                id: id.to_string(),
                target,
                timestamp: Utc::now(),
                unchanged: true,
            })
            .await;
            return Ok(MoveOutcome { unchanged: true });
        }

        let new_parents = self
            .provider
            .move_file(id, &target_folder, &parents.parents)
            .await?;

        if new_parents.iter().any(|p| *p == self.options.scan_folder_id) {
            // Newly under the scan folder: (re)admit and trust the operator.
            match self.provider.metadata(id).await {
                Ok(remote) => {
                    self.store
                        .upsert(remote.into_record(FolderLocation::Scan))
                        .await;
                }
                Err(err) => {
                    warn!(id, "metadata refresh after move failed: {err}");
                    self.store.set_location(id, FolderLocation::Scan).await;
                }
            }
            let carried = self.store.scan_of(id).await.and_then(|s| s.last_scanned_at);
            self.store
                .set_scan(
                    id,
                    ScanRecord {
                        status: ScanStatus::Clean,
                        last_scanned_at: carried,
                    },
                )
                .await;
        } else {
            // No longer under the scan folder: drop from the authoritative
            // list. The next tick re-admits it if it landed in quarantine.
            self.store.remove(id).await;
            self.store.clear_scan(id).await;
        }

        self.publish(WatchEvent::FileMoved {
            id: id.to_string(),
            target,
            timestamp: Utc::now(),
            unchanged: false,
        })
        .await;
        self.publish_listing(0, 0, 0).await;

        Ok(MoveOutcome { unchanged: false })
    }

    /// Observer-initiated remote deletion. Requires authorization.
    pub async fn delete_file(&self, id: &str) -> Result<()> {
        if !self.is_authorized() {
            return Err(WatchError::NotAuthorized);
        }

        self.provider.delete(id).await?;

        self.store.remove(id).await;
        self.store.clear_scan(id).await;
        self.store.unlock(id).await;

        info!(id, "file deleted");
        self.publish(WatchEvent::FileDeleted {
            id: id.to_string(),
            timestamp: Utc::now(),
        })
        .await;
        self.publish_listing(0, 0, 1).await;

        Ok(())
    }
}
