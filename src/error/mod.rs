//! Error types for the reminder engine.
//!
//! `AppError` is the top-level error returned by repositories, services and startup
//! code. Domain-specific errors (`ConfigError`, `InternalError`, `GameApiError`) convert
//! into it through `#[from]`. Delivery failures use the separate `DeliveryError` type
//! because the dispatcher routes on its retryable/terminal classification instead of
//! propagating it.

pub mod config;
pub mod delivery;
pub mod game_api;
pub mod internal;

use thiserror::Error;

use crate::error::{config::ConfigError, game_api::GameApiError, internal::InternalError};

/// Top-level application error type.
///
/// Scheduled jobs and bot event handlers never return this to their runtime; they
/// log it with `tracing::error!` and carry on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Game API request or decoding failure.
    #[error(transparent)]
    GameApiErr(#[from] GameApiError),

    /// HTTP client construction error from reqwest.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Unexpected internal state, e.g. a malformed stored value.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// Resource not found error.
    ///
    /// # Fields
    /// - Message describing what resource was not found
    #[error("{0}")]
    NotFound(String),

    /// Invalid input from the command layer.
    ///
    /// # Fields
    /// - Message describing what was invalid about the request
    #[error("{0}")]
    BadRequest(String),

    /// Internal error with custom message.
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
