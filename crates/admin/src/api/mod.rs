//! Clinic backend REST client.
//!
//! Provides typed access to the admin (`/api/admin/...`) and doctor
//! (`/api/doctor/...`) endpoints.
//!
//! # Wire conventions
//!
//! - Every response body carries a boolean `success` flag. `false` is an
//!   application-reported failure whose `message` is shown to the user,
//!   whatever the HTTP status code was.
//! - Role tokens travel in custom headers named after the role (`aToken`,
//!   `dToken`), not as bearer credentials.
//! - The client never retries; a failed request is terminal for that call.

pub mod admin;
pub mod client;
pub mod doctor;
pub mod types;

pub use client::BackendClient;
pub use types::{ImageUpload, LoginRequest, NewDoctor};

use thiserror::Error;

/// Errors that can occur when talking to the clinic backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, non-JSON body).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The success payload did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// An endpoint path could not be resolved against the base URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// A token or upload could not be encoded into the request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A local file (e.g. an image upload) could not be read.
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The two kinds of failure a call can end in.
///
/// Both are handled identically by the sync layer; the distinction is kept
/// for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, encoding or decoding failure.
    Transport,
    /// The backend reported the failure itself.
    Application,
}

impl ApiError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected(_) => ErrorKind::Application,
            _ => ErrorKind::Transport,
        }
    }

    /// Text shown to the user in an error notification.
    ///
    /// Rejections surface the backend's message verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
