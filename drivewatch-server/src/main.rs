//! # Drivewatch Server
//!
//! Monitors a scan folder and a quarantine folder in a remote file-storage
//! service, drives a per-file scan workflow, relocates files on verdict, and
//! broadcasts every change to WebSocket observers and a reporting sheet.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drivewatch_core::{Engine, EngineOptions};
use drivewatch_server::{
    AppState, Config,
    drive::DriveClient,
    routes::create_router,
    sheets::SheetsSink,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drivewatch=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);
    info!(
        scan_folder = %config.scan_folder_id,
        quarantine_folder = ?config.quarantine_folder_id,
        poll_interval_secs = config.poll_interval_secs,
        "starting drivewatch"
    );

    let access_token = config.drive_access_token.clone();
    let provider = Arc::new(DriveClient::new(
        access_token.clone().unwrap_or_default(),
    ));

    let options = EngineOptions {
        scan_folder_id: config.scan_folder_id.clone(),
        quarantine_folder_id: config.quarantine_folder_id.clone(),
        poll_interval: Duration::from_secs(config.poll_interval_secs),
    };
    let mut engine = Engine::new(provider, options);

    match (&config.report_sheet_id, &access_token) {
        (Some(sheet_id), Some(token)) => {
            engine = engine.with_sink(Arc::new(SheetsSink::new(
                token.clone(),
                sheet_id.clone(),
            )));
        }
        (Some(_), None) => {
            warn!("REPORT_SHEET_ID set but no access token; reporting disabled");
        }
        _ => {}
    }

    let engine = Arc::new(engine);

    // Credential presence is the authorization signal; polling starts with
    // an immediate pass once authorized.
    if access_token.is_some() {
        engine.set_authorized(true);
        let poller = engine.clone();
        tokio::spawn(async move {
            poller.run().await;
        });
    } else {
        warn!("no DRIVE_ACCESS_TOKEN configured; polling idle until authorized");
    }

    let state = AppState::new(engine, config.clone());
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
