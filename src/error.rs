use std::io;

use thiserror::Error;

/// Failure of a single dataset fetch.
///
/// The dashboard does not distinguish between the variants, it only shows the
/// message. They are kept apart so the log says what actually went wrong.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed. Reason: `{0}`.")]
    RequestError(#[from] reqwest::Error),
    #[error("Request failed with status code {0}.")]
    StatusError(u16),
    #[error("Unable to decode dataset payload. Reason: `{0}`.")]
    ResponseParseError(#[from] serde_json::Error),
    #[error("Invalid base url `{0}`. It must be an absolute http(s) url.")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that stop the dashboard itself.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Terminal error. Reason: `{0}`.")]
    Terminal(#[from] io::Error),
}
