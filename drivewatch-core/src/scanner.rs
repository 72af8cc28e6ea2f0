//! Per-file scan state machine.
//!
//! `pending → scanning → pending (queued) → clean | infected`. The two dwell
//! phases model provider-side queueing and run through the [`Scheduler`] seam
//! so tests can fast-forward instead of waiting real time. The activity lock
//! guarantees at most one in-flight sequence per file id.

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

use drivewatch_model::{FolderLocation, ScanRecord, ScanStatus, WatchEvent};

use crate::engine::Engine;
use crate::verdict::Verdict;

/// Dwell between entering `scanning` and the queued `pending` phase, seconds.
const SCAN_DWELL_SECS: RangeInclusive<u64> = 5..=15;
/// Dwell between the queued `pending` phase and the verdict, seconds.
const VERDICT_DWELL_SECS: RangeInclusive<u64> = 1..=10;

/// Time source for the dwell phases.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production scheduler backed by the tokio timer.
#[derive(Debug, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

fn dwell(range: RangeInclusive<u64>) -> Duration {
    Duration::from_secs(rand::rng().random_range(range))
}

impl Engine {
    /// Run one scan sequence for `id`, then hand the verdict to the
    /// relocation policy.
    ///
    /// No-op re-assert when a sequence for `id` is already in flight: the
    /// `scanning` status is rebroadcast and no second sequence starts. The
    /// caller decides whether to await the sequence or spawn it.
    pub async fn begin_scan(&self, id: &str) {
        if !self.store.try_lock(id).await {
            debug!(id, "scan already in flight, re-asserting status");
            self.store
                .set_scan(
                    id,
                    ScanRecord {
                        status: ScanStatus::Scanning,
                        last_scanned_at: self
                            .store
                            .scan_of(id)
                            .await
                            .and_then(|s| s.last_scanned_at),
                    },
                )
                .await;
            self.publish(WatchEvent::ScanUpdate {
                id: id.to_string(),
                status: ScanStatus::Scanning,
                timestamp: Utc::now(),
                message: "scan already in progress".into(),
            })
            .await;
            return;
        }

        let outcome = self.scan_sequence(id).await;
        self.store.unlock(id).await;

        if let Some((verdict, prior_location)) = outcome {
            self.apply_verdict(id, verdict, prior_location).await;
        }
    }

    /// The locked portion of the workflow. Returns the terminal verdict and
    /// the file's location at verdict time, or `None` when the sequence
    /// aborted (file vanished mid-scan, or the verdict engine failed).
    async fn scan_sequence(&self, id: &str) -> Option<(Verdict, FolderLocation)> {
        let Some(record) = self.store.get(id).await else {
            debug!(id, "scan requested for unknown file");
            return None;
        };

        let carried = self.store.scan_of(id).await.and_then(|s| s.last_scanned_at);
        self.store
            .set_scan(
                id,
                ScanRecord {
                    status: ScanStatus::Scanning,
                    last_scanned_at: carried,
                },
            )
            .await;
        self.publish(WatchEvent::ScanUpdate {
            id: id.to_string(),
            status: ScanStatus::Scanning,
            timestamp: Utc::now(),
            message: format!("scanning {}", record.name),
        })
        .await;

        self.scheduler.sleep(dwell(SCAN_DWELL_SECS)).await;

        // The store may have mutated during the dwell; re-check existence.
        if self.store.get(id).await.is_none() {
            info!(id, "file vanished mid-scan, aborting sequence");
            self.store.clear_scan(id).await;
            return None;
        }

        // Intermediate pending: provider-side queueing, observable as its own
        // state distinct from the initial `scanning`.
        self.store
            .set_scan(
                id,
                ScanRecord {
                    status: ScanStatus::Pending,
                    last_scanned_at: carried,
                },
            )
            .await;
        self.publish(WatchEvent::ScanUpdate {
            id: id.to_string(),
            status: ScanStatus::Pending,
            timestamp: Utc::now(),
            message: "queued for verdict".into(),
        })
        .await;

        self.scheduler.sleep(dwell(VERDICT_DWELL_SECS)).await;

        let Some(record) = self.store.get(id).await else {
            info!(id, "file vanished before verdict, aborting sequence");
            self.store.clear_scan(id).await;
            return None;
        };

        match self.verdicts.verdict(&record).await {
            Ok(verdict) => {
                let status = verdict.status();
                self.store
                    .set_scan(
                        id,
                        ScanRecord {
                            status,
                            last_scanned_at: Some(Utc::now()),
                        },
                    )
                    .await;
                info!(id, name = %record.name, %status, "scan verdict committed");
                self.publish(WatchEvent::ScanUpdate {
                    id: id.to_string(),
                    status,
                    timestamp: Utc::now(),
                    message: format!("verdict: {status}"),
                })
                .await;
                Some((verdict, record.location))
            }
            Err(err) => {
                // Abort without a terminal status; the file stays at the
                // intermediate pending state.
                warn!(id, "verdict computation failed: {err}");
                self.publish(WatchEvent::Alert {
                    id: Some(id.to_string()),
                    message: format!("scan aborted: {err}"),
                })
                .await;
                None
            }
        }
    }
}
