//! Drivewatch server: transport and adapter layer over `drivewatch-core`.

pub mod config;
pub mod drive;
pub mod handlers;
pub mod routes;
pub mod sheets;
pub mod state;
pub mod websocket;

pub use config::Config;
pub use state::AppState;
