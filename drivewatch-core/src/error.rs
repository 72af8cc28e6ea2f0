use thiserror::Error;

use crate::provider::ProviderError;

/// Errors surfaced by the engine. None of these are process-fatal; callers
/// report them to observers and continue on the next tick or request.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("not authorized")]
    NotAuthorized,

    #[error("quarantine folder is not configured")]
    QuarantineUnconfigured,
}

pub type Result<T> = std::result::Result<T, WatchError>;
