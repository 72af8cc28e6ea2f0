//! Drivewatch core: the reconciliation and scan-workflow engine.
//!
//! The engine observes two remote folders (scan and quarantine) through a
//! [`StorageProvider`], diffs each listing against known state, drives a
//! per-file scan workflow with randomized dwell times, relocates files on
//! verdict, and broadcasts every state change to subscribed observers.
//!
//! Transport (HTTP, WebSocket) and the concrete remote-storage adapters live
//! in `drivewatch-server`; everything here is policy behind trait seams.

pub mod diff;
pub mod engine;
pub mod error;
pub mod events;
pub mod monitor;
pub mod provider;
pub mod relocate;
pub mod scanner;
pub mod store;
pub mod verdict;

pub use diff::{ChangeSet, detect_changes};
pub use engine::{Engine, EngineOptions};
pub use error::{Result, WatchError};
pub use events::{EventBus, REPORT_HEADER, report_rows};
pub use provider::{FileParents, ProviderError, RemoteFile, ReportingSink, StorageProvider};
pub use relocate::MoveOutcome;
pub use scanner::{Scheduler, TokioScheduler};
pub use store::StateStore;
pub use verdict::{SignatureVerdict, Verdict, VerdictEngine, VerdictError, name_is_flagged};
