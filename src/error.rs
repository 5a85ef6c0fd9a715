//! Error taxonomy shared by both REST clients and every view-model.

use thiserror::Error;

/// The crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything an operation against the API or the backing store can fail
/// with. View-models convert these into inline display state; nothing here is
/// allowed to escape as a panic.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure before any HTTP status was received.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status, carrying whatever message text the server
    /// put in the response body.
    #[error("{message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body text.
        message: String,
    },

    /// The session is missing or expired (HTTP 401). Views that require a
    /// session treat this as a login redirect, never as an inline error.
    #[error("session expired or missing")]
    Unauthorized,

    /// Client-side validation failed; no request was issued.
    #[error("{0}")]
    Validation(String),

    /// The response body did not match the internal schema. Shape mismatches
    /// fail loudly here instead of falling back field-by-field at call sites.
    #[error("unexpected response shape: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request URL could not be constructed.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Build the error for a non-success response, special-casing 401.
    pub(crate) fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            Self::Unauthorized
        } else {
            Self::Status {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Whether this failure should send the viewer to the login page.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
