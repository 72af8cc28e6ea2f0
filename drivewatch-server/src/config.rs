use anyhow::Context;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Monitoring settings
    pub poll_interval_secs: u64,
    pub scan_folder_id: String,
    pub quarantine_folder_id: Option<String>,

    // Reporting settings
    pub report_sheet_id: Option<String>,

    // Provider credentials; presence doubles as the authorization signal
    pub drive_access_token: Option<String>,

    // CORS settings
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let poll_interval_secs = env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);
        anyhow::ensure!(poll_interval_secs > 0, "POLL_INTERVAL_SECS must be positive");

        Ok(Self {
            server_host: env::var("DRIVEWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("DRIVEWATCH_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),

            poll_interval_secs,
            scan_folder_id: env::var("SCAN_FOLDER_ID")
                .context("SCAN_FOLDER_ID must be set to the monitored folder id")?,
            quarantine_folder_id: env::var("QUARANTINE_FOLDER_ID").ok(),

            report_sheet_id: env::var("REPORT_SHEET_ID").ok(),

            drive_access_token: env::var("DRIVE_ACCESS_TOKEN").ok(),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the process environment; parallel env mutation would race.
    #[test]
    fn config_requires_scan_folder_and_applies_defaults() {
        unsafe { env::remove_var("SCAN_FOLDER_ID") };
        assert!(Config::from_env().is_err());

        unsafe { env::set_var("SCAN_FOLDER_ID", "folder-abc") };
        let config = Config::from_env().unwrap();
        assert_eq!(config.scan_folder_id, "folder-abc");
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.server_port, 3000);
        assert!(config.quarantine_folder_id.is_none());
        unsafe { env::remove_var("SCAN_FOLDER_ID") };
    }
}
