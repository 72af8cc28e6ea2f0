//! Trait seams for the remote-storage and reporting collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivewatch_model::{FileRecord, FolderLocation};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A file as reported by the provider, before the engine assigns it to one of
/// the monitored folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: Option<u64>,
    pub modified_at: DateTime<Utc>,
    pub view_link: Option<String>,
    pub download_link: Option<String>,
    pub content_digest: Option<String>,
}

impl RemoteFile {
    pub fn into_record(self, location: FolderLocation) -> FileRecord {
        FileRecord {
            id: self.id,
            name: self.name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            modified_at: self.modified_at,
            view_link: self.view_link,
            download_link: self.download_link,
            content_digest: self.content_digest,
            location,
        }
    }
}

/// Parent-folder membership for a single file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileParents {
    pub id: String,
    pub name: String,
    pub parents: Vec<String>,
}

impl FileParents {
    pub fn contains(&self, folder_id: &str) -> bool {
        self.parents.iter().any(|p| p == folder_id)
    }
}

/// Remote file-storage operations the engine depends on.
///
/// Implementations must filter listings to non-trashed direct children of the
/// requested folder.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    async fn list(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ProviderError>;

    async fn parents(&self, file_id: &str) -> Result<FileParents, ProviderError>;

    /// Re-parent a file; returns the file's new parent set.
    async fn move_file(
        &self,
        file_id: &str,
        add_parent: &str,
        remove_parents: &[String],
    ) -> Result<Vec<String>, ProviderError>;

    async fn delete(&self, file_id: &str) -> Result<(), ProviderError>;

    async fn metadata(&self, file_id: &str) -> Result<RemoteFile, ProviderError>;
}

/// Spreadsheet-style sink for the flattened file table. Overwrite semantics:
/// every write replaces the previous contents.
#[async_trait]
pub trait ReportingSink: Send + Sync {
    async fn write_rows(&self, rows: Vec<Vec<String>>) -> Result<(), ProviderError>;
}
