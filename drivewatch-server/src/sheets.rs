//! Sheets values adapter for the [`ReportingSink`] seam.

use async_trait::async_trait;
use serde_json::json;

use drivewatch_core::{ProviderError, ReportingSink};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Writes the flattened file table into a single sheet, overwriting the
/// previous contents on every update.
#[derive(Debug, Clone)]
pub struct SheetsSink {
    http: reqwest::Client,
    access_token: String,
    sheet_id: String,
}

impl SheetsSink {
    pub fn new(access_token: String, sheet_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            sheet_id,
        }
    }
}

#[async_trait]
impl ReportingSink for SheetsSink {
    async fn write_rows(&self, rows: Vec<Vec<String>>) -> Result<(), ProviderError> {
        // Clear first so rows from a longer previous table do not linger.
        let clear = self
            .http
            .post(format!(
                "{SHEETS_API_BASE}/{}/values/Sheet1:clear",
                self.sheet_id
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if !clear.status().is_success() {
            return Err(ProviderError::Api(format!(
                "sheet clear failed with status {}",
                clear.status()
            )));
        }

        let update = self
            .http
            .put(format!(
                "{SHEETS_API_BASE}/{}/values/Sheet1!A1",
                self.sheet_id
            ))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": "Sheet1!A1",
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if !update.status().is_success() {
            return Err(ProviderError::Api(format!(
                "sheet update failed with status {}",
                update.status()
            )));
        }
        Ok(())
    }
}
