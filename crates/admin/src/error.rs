//! Unified error handling for the admin library.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Errors surfaced to embedders that set the library up.
///
/// Sync actions never return these; they report failures as notifications.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A direct backend call failed (login, client construction).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Durable token storage failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_rejection_is_transparent() {
        let err = Error::from(ApiError::Rejected("Invalid credentials".to_string()));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_config_error_is_prefixed() {
        let err = Error::from(ConfigError::MissingEnvVar("CLINIC_BACKEND_URL".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: CLINIC_BACKEND_URL"
        );
    }
}
