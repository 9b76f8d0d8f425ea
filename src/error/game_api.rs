use thiserror::Error;

/// Failures talking to the Clash of Clans API.
///
/// The event window resolver treats every variant as "no active event"; the
/// renderer treats them as retryable.
#[derive(Error, Debug)]
pub enum GameApiError {
    /// Transport failure or undecodable body.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The API answered with an unexpected status code.
    #[error("Clash API returned {status} for {path}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Request path without the base URL
        path: String,
    },

    /// The API is under maintenance (503).
    #[error("Clash API is in maintenance")]
    Maintenance,

    /// The clan's war log is private (403 on currentwar).
    #[error("War log for clan {0} is private")]
    PrivateWarLog(String),

    /// A timestamp in the response does not match the API format.
    #[error("Invalid Clash API timestamp '{0}'")]
    InvalidTimestamp(String),
}
