//! Client-facing projections of the authoritative state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{FileRecord, FolderLocation, ScanRecord, ScanStatus};

/// Status assumed for a file that has no [`ScanRecord`] yet.
///
/// Quarantined files without a record are treated as already adjudicated
/// infected; everything else is awaiting its first scan.
pub fn default_status(location: FolderLocation) -> ScanStatus {
    match location {
        FolderLocation::Quarantine => ScanStatus::Infected,
        FolderLocation::Scan => ScanStatus::Pending,
    }
}

/// Merged view of a [`FileRecord`] and its resolved scan state, as shipped to
/// observers and the reporting sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileView {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: Option<u64>,
    pub modified_at: DateTime<Utc>,
    pub view_link: Option<String>,
    pub download_link: Option<String>,
    pub content_digest: Option<String>,
    pub location: FolderLocation,
    pub status: ScanStatus,
    pub last_scanned_at: Option<DateTime<Utc>>,
}

impl FileView {
    pub fn merge(record: &FileRecord, scan: Option<&ScanRecord>) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            mime_type: record.mime_type.clone(),
            size_bytes: record.size_bytes,
            modified_at: record.modified_at,
            view_link: record.view_link.clone(),
            download_link: record.download_link.clone(),
            content_digest: record.content_digest.clone(),
            location: record.location,
            status: scan.map_or_else(|| default_status(record.location), |s| s.status),
            last_scanned_at: scan.and_then(|s| s.last_scanned_at),
        }
    }
}

/// Response body for the files-listing query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingReport {
    pub files: Vec<FileView>,
    pub authorized: bool,
    pub timestamp: DateTime<Utc>,
}

/// Response body for the status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub authorized: bool,
    pub polling: bool,
    pub file_count: usize,
    pub poll_interval_secs: u64,
    pub scan_folder_id: String,
    pub quarantine_folder_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: FolderLocation) -> FileRecord {
        FileRecord {
            id: "f1".into(),
            name: "報告.txt".into(),
            mime_type: "text/plain".into(),
            size_bytes: Some(12),
            modified_at: Utc::now(),
            view_link: None,
            download_link: None,
            content_digest: Some("abc123".into()),
            location,
        }
    }

    #[test]
    fn view_defaults_status_by_location() {
        let scan = FileView::merge(&record(FolderLocation::Scan), None);
        assert_eq!(scan.status, ScanStatus::Pending);
        assert!(scan.last_scanned_at.is_none());

        let quarantined = FileView::merge(&record(FolderLocation::Quarantine), None);
        assert_eq!(quarantined.status, ScanStatus::Infected);
    }

    #[test]
    fn view_prefers_resolved_scan_record() {
        let mut scan = ScanRecord::new(ScanStatus::Clean);
        scan.last_scanned_at = Some(Utc::now());
        let view = FileView::merge(&record(FolderLocation::Quarantine), Some(&scan));
        assert_eq!(view.status, ScanStatus::Clean);
        assert!(view.last_scanned_at.is_some());
    }
}
