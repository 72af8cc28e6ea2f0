//! The engine: shared state, collaborator handles, and the broadcast gateway.
//!
//! The per-component logic lives in sibling modules as further `impl Engine`
//! blocks: `scanner` (scan sequences), `relocate` (verdict-driven and manual
//! moves), and `monitor` (the reconciliation loop).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use drivewatch_model::{FileView, ListingReport, ServiceStatus, WatchEvent};

use crate::events::{EventBus, EventReceiver, report_rows};
use crate::provider::{ReportingSink, StorageProvider};
use crate::scanner::{Scheduler, TokioScheduler};
use crate::store::StateStore;
use crate::verdict::{SignatureVerdict, VerdictEngine};

/// Static knobs the engine is constructed with.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub scan_folder_id: String,
    /// Without a quarantine folder, relocation moves are never attempted.
    pub quarantine_folder_id: Option<String>,
    pub poll_interval: Duration,
}

/// Reconciliation and scan-workflow engine.
///
/// Cheap to clone: every field is shared. Clones are handed to spawned scan
/// sequences and to the polling loop.
#[derive(Clone)]
pub struct Engine {
    pub(crate) provider: Arc<dyn StorageProvider>,
    pub(crate) sink: Option<Arc<dyn ReportingSink>>,
    pub(crate) verdicts: Arc<dyn VerdictEngine>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) store: StateStore,
    pub(crate) events: EventBus,
    authorized: Arc<AtomicBool>,
    pub(crate) options: EngineOptions,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("authorized", &self.is_authorized())
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(provider: Arc<dyn StorageProvider>, options: EngineOptions) -> Self {
        Self {
            provider,
            sink: None,
            verdicts: Arc::new(SignatureVerdict),
            scheduler: Arc::new(TokioScheduler),
            store: StateStore::new(),
            events: EventBus::new(),
            authorized: Arc::new(AtomicBool::new(false)),
            options,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportingSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_verdicts(mut self, verdicts: Arc<dyn VerdictEngine>) -> Self {
        self.verdicts = verdicts;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Flip the authorization signal. The polling loop and the manual
    /// move/delete operations consult this before acting.
    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Subscribe to the observer event stream.
    pub async fn subscribe(&self) -> EventReceiver {
        self.events.subscribe().await
    }

    pub async fn publish(&self, event: WatchEvent) {
        self.events.publish(event).await;
    }

    /// Merged client-facing view of every known file.
    pub async fn build_views(&self) -> Vec<FileView> {
        let files = self.store.files().await;
        let mut views = Vec::with_capacity(files.len());
        for file in &files {
            let scan = self.store.scan_of(&file.id).await;
            views.push(FileView::merge(file, scan.as_ref()));
        }
        views
    }

    pub async fn listing_report(&self) -> ListingReport {
        ListingReport {
            files: self.build_views().await,
            authorized: self.is_authorized(),
            timestamp: Utc::now(),
        }
    }

    pub async fn service_status(&self) -> ServiceStatus {
        ServiceStatus {
            authorized: self.is_authorized(),
            polling: self.is_authorized(),
            file_count: self.store.len().await,
            poll_interval_secs: self.options.poll_interval.as_secs(),
            scan_folder_id: self.options.scan_folder_id.clone(),
            quarantine_folder_id: self.options.quarantine_folder_id.clone(),
        }
    }

    /// Broadcast the current listing to every observer, then forward the flat
    /// projection to the reporting sink off the broadcast path. Sink failures
    /// degrade to an alert and never block the broadcast.
    pub(crate) async fn publish_listing(&self, added: usize, modified: usize, deleted: usize) {
        let views = self.build_views().await;
        self.events
            .publish(WatchEvent::Listing {
                files: views.clone(),
                timestamp: Utc::now(),
                added,
                modified,
                deleted,
                scan_folder_id: self.options.scan_folder_id.clone(),
                quarantine_folder_id: self.options.quarantine_folder_id.clone(),
            })
            .await;

        if let Some(sink) = &self.sink {
            let sink = Arc::clone(sink);
            let events = self.events.clone();
            let rows = report_rows(&views);
            tokio::spawn(async move {
                if let Err(err) = sink.write_rows(rows).await {
                    warn!("reporting sink write failed: {err}");
                    events
                        .publish(WatchEvent::Alert {
                            id: None,
                            message: format!("report update failed: {err}"),
                        })
                        .await;
                }
            });
        }
    }
}
