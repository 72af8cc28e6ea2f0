//! Drive v3 REST adapter for the [`StorageProvider`] seam.
//!
//! Thin by design: every call maps to one endpoint, all policy lives in
//! `drivewatch-core`. Listings are filtered server-side to non-trashed direct
//! children of the requested folder.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use drivewatch_core::{FileParents, ProviderError, RemoteFile, StorageProvider};

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const FILE_FIELDS: &str =
    "id,name,mimeType,size,modifiedTime,webViewLink,webContentLink,md5Checksum";

#[derive(Debug, Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl DriveClient {
    pub fn new(access_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    async fn get_json<T, Q>(&self, url: String, query: &Q) -> Result<T, ProviderError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let response = check_status(response)?;
        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    match response.status() {
        s if s.is_success() => Ok(response),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            Err(ProviderError::NotAuthorized)
        }
        reqwest::StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
        reqwest::StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
        s => Err(ProviderError::Api(format!("unexpected status {s}"))),
    }
}

/// Wire shape of one Drive file resource, limited to the fields we request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveFile {
    id: String,
    name: String,
    mime_type: String,
    /// Drive reports size as a decimal string, absent for native docs.
    size: Option<String>,
    modified_time: DateTime<Utc>,
    web_view_link: Option<String>,
    web_content_link: Option<String>,
    md5_checksum: Option<String>,
}

impl DriveFile {
    pub(crate) fn into_remote(self) -> RemoteFile {
        RemoteFile {
            id: self.id,
            name: self.name,
            mime_type: self.mime_type,
            size_bytes: self.size.and_then(|s| s.parse().ok()),
            modified_at: self.modified_time,
            view_link: self.web_view_link,
            download_link: self.web_content_link,
            content_digest: self.md5_checksum,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParentsResponse {
    id: String,
    name: String,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MoveResponse {
    #[serde(default)]
    parents: Vec<String>,
}

#[async_trait]
impl StorageProvider for DriveClient {
    async fn list(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ProviderError> {
        let q = format!("'{folder_id}' in parents and trashed = false");
        let fields = format!("nextPageToken,files({FILE_FIELDS})");
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        // Listings over one page would otherwise read as mass deletions to
        // the differ; follow the token until the folder is exhausted.
        loop {
            let mut query: Vec<(&str, &str)> = vec![
                ("q", &q),
                ("fields", &fields),
                ("pageSize", "1000"),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let page: FileList = self
                .get_json(format!("{}/files", self.base_url), &query)
                .await?;
            files.extend(page.files.into_iter().map(DriveFile::into_remote));
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(files)
    }

    async fn parents(&self, file_id: &str) -> Result<FileParents, ProviderError> {
        let response: ParentsResponse = self
            .get_json(
                format!("{}/files/{file_id}", self.base_url),
                &[("fields", "id,name,parents")],
            )
            .await?;
        Ok(FileParents {
            id: response.id,
            name: response.name,
            parents: response.parents,
        })
    }

    async fn move_file(
        &self,
        file_id: &str,
        add_parent: &str,
        remove_parents: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let response = self
            .http
            .patch(format!("{}/files/{file_id}", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[
                ("addParents", add_parent),
                ("removeParents", remove_parents.join(",").as_str()),
                ("fields", "parents"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let response = check_status(response)?;
        let moved: MoveResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(moved.parents)
    }

    async fn delete(&self, file_id: &str) -> Result<(), ProviderError> {
        let response = self
            .http
            .delete(format!("{}/files/{file_id}", self.base_url))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        check_status(response)?;
        Ok(())
    }

    async fn metadata(&self, file_id: &str) -> Result<RemoteFile, ProviderError> {
        let file: DriveFile = self
            .get_json(
                format!("{}/files/{file_id}", self.base_url),
                &[("fields", FILE_FIELDS)],
            )
            .await?;
        Ok(file.into_remote())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_file_parses_wire_shape() {
        let json = r#"{
            "id": "abc123",
            "name": "sample.pdf",
            "mimeType": "application/pdf",
            "size": "28381",
            "modifiedTime": "2024-03-01T12:30:00.000Z",
            "webViewLink": "https://drive.example/view/abc123",
            "md5Checksum": "9e107d9d372bb6826bd81d3542a419d6"
        }"#;
        let file: DriveFile = serde_json::from_str(json).unwrap();
        let remote = file.into_remote();
        assert_eq!(remote.id, "abc123");
        assert_eq!(remote.size_bytes, Some(28381));
        assert_eq!(remote.mime_type, "application/pdf");
        assert!(remote.download_link.is_none());
        assert_eq!(
            remote.content_digest.as_deref(),
            Some("9e107d9d372bb6826bd81d3542a419d6")
        );
    }

    #[test]
    fn file_list_parses_page_token_for_continuation() {
        let json = r#"{
            "nextPageToken": "token-2",
            "files": [{
                "id": "a",
                "name": "a.txt",
                "mimeType": "text/plain",
                "modifiedTime": "2024-03-01T12:30:00Z"
            }]
        }"#;
        let page: FileList = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("token-2"));
        assert_eq!(page.files.len(), 1);

        let last: FileList = serde_json::from_str(r#"{"files":[]}"#).unwrap();
        assert!(last.next_page_token.is_none());
    }

    #[test]
    fn size_absent_for_native_docs_maps_to_none() {
        let json = r#"{
            "id": "doc1",
            "name": "notes",
            "mimeType": "application/vnd.google-apps.document",
            "modifiedTime": "2024-03-01T12:30:00Z"
        }"#;
        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert!(file.into_remote().size_bytes.is_none());
    }
}
