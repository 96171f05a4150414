//! Shared error types for the services crate.

use thiserror::Error;

use backend::GatewayError;
use vocab_core::model::{ConfigError, SummaryError};

/// Errors emitted by drill sessions and their orchestration services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DrillError {
    #[error("no items available for session")]
    EmptyQueue,

    #[error("session already ended")]
    Completed,

    #[error("session is still active")]
    StillActive,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Backend(#[from] GatewayError),
}

/// Errors emitted by `GameOptionsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptionsServiceError {
    #[error(transparent)]
    Backend(#[from] GatewayError),
}
