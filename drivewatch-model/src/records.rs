//! Authoritative record types for observed remote files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which monitored folder currently holds a file. Always exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderLocation {
    Scan,
    Quarantine,
}

impl FolderLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Quarantine => "quarantine",
        }
    }
}

impl std::fmt::Display for FolderLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry per remotely observed file.
///
/// `id` is the provider-assigned identifier and the unique key across the
/// merged scan + quarantine listing. When the same id shows up under both
/// folders in one pass, the quarantine copy wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Provider may not report a size for native document types.
    pub size_bytes: Option<u64>,
    pub modified_at: DateTime<Utc>,
    pub view_link: Option<String>,
    pub download_link: Option<String>,
    /// Opaque integrity hash as reported by the provider (MD5 for Drive).
    pub content_digest: Option<String>,
    pub location: FolderLocation,
}

/// Per-file scan workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Scanning,
    Clean,
    Infected,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scanning => "scanning",
            Self::Clean => "clean",
            Self::Infected => "infected",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan bookkeeping keyed by [`FileRecord::id`], with a lifecycle independent
/// of the record itself: created lazily on first observation or scan request,
/// cleared when the file disappears.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub status: ScanStatus,
    pub last_scanned_at: Option<DateTime<Utc>>,
}

impl ScanRecord {
    pub fn new(status: ScanStatus) -> Self {
        Self {
            status,
            last_scanned_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_status_serializes_lowercase() {
        let json = serde_json::to_string(&ScanStatus::Infected).unwrap();
        assert_eq!(json, "\"infected\"");
    }

    #[test]
    fn location_roundtrips_through_serde() {
        let json = serde_json::to_string(&FolderLocation::Quarantine).unwrap();
        assert_eq!(json, "\"quarantine\"");
        let back: FolderLocation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FolderLocation::Quarantine);
    }
}
