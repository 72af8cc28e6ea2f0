//! Core data model definitions shared across Drivewatch crates.
#![allow(missing_docs)]

pub mod events;
pub mod records;
pub mod view;

pub use events::{ClientRequest, WatchEvent};
pub use records::{FileRecord, FolderLocation, ScanRecord, ScanStatus};
pub use view::{FileView, ListingReport, ServiceStatus, default_status};
